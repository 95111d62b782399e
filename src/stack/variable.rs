//! Local variable access: loading and storing method arguments and locals.

use crate::code_attribute::{CodeSink, Instruction};
use crate::description::{MethodDescription, PrimitiveType, TypeDescription};
use crate::error::{Error, Result};

use super::StackManipulation;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LocalKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

fn local_kind(ty: &TypeDescription) -> LocalKind {
    match ty {
        TypeDescription::Primitive(PrimitiveType::Long) => LocalKind::Long,
        TypeDescription::Primitive(PrimitiveType::Float) => LocalKind::Float,
        TypeDescription::Primitive(PrimitiveType::Double) => LocalKind::Double,
        TypeDescription::Primitive(_) => LocalKind::Int,
        _ => LocalKind::Reference,
    }
}

fn require_value(ty: &TypeDescription, what: &str) -> Result<()> {
    if ty.is_void() {
        return Err(Error::construction(what, "void cannot be held in a local variable"));
    }
    Ok(())
}

pub fn load(ty: &TypeDescription, offset: u16) -> Result<StackManipulation> {
    require_value(ty, "variable load")?;
    Ok(StackManipulation::VariableLoad {
        ty: ty.clone(),
        offset,
    })
}

pub fn store(ty: &TypeDescription, offset: u16) -> Result<StackManipulation> {
    require_value(ty, "variable store")?;
    Ok(StackManipulation::VariableStore {
        ty: ty.clone(),
        offset,
    })
}

/// Loads `this`. Static methods have no receiver.
pub fn load_receiver(method: &MethodDescription) -> Result<StackManipulation> {
    if method.is_static() {
        return Err(Error::construction(
            "receiver load",
            format!("{} is static", method),
        ));
    }
    load(&method.declaring_type, 0)
}

/// Loads the parameter at `index` from its slot.
pub fn load_argument(method: &MethodDescription, index: usize) -> Result<StackManipulation> {
    let ty = method.parameter_types.get(index).ok_or_else(|| {
        Error::construction(
            "argument load",
            format!("{} has no parameter {}", method, index),
        )
    })?;
    load(ty, method.parameter_offset(index))
}

/// Loads every parameter in declaration order.
pub fn load_all_arguments(method: &MethodDescription) -> Result<StackManipulation> {
    let loads = (0..method.parameter_types.len())
        .map(|index| load_argument(method, index))
        .collect::<Result<Vec<_>>>()?;
    Ok(StackManipulation::compound(loads))
}

pub(crate) fn emit_load(sink: &mut dyn CodeSink, ty: &TypeDescription, slot: u16) {
    let instruction = match local_kind(ty) {
        LocalKind::Reference => match slot {
            0 => Instruction::Aload0,
            1 => Instruction::Aload1,
            2 => Instruction::Aload2,
            3 => Instruction::Aload3,
            s if s <= 255 => Instruction::Aload(s as u8),
            s => Instruction::AloadWide(s),
        },
        LocalKind::Long => match slot {
            0 => Instruction::Lload0,
            1 => Instruction::Lload1,
            2 => Instruction::Lload2,
            3 => Instruction::Lload3,
            s if s <= 255 => Instruction::Lload(s as u8),
            s => Instruction::LloadWide(s),
        },
        LocalKind::Float => match slot {
            0 => Instruction::Fload0,
            1 => Instruction::Fload1,
            2 => Instruction::Fload2,
            3 => Instruction::Fload3,
            s if s <= 255 => Instruction::Fload(s as u8),
            s => Instruction::FloadWide(s),
        },
        LocalKind::Double => match slot {
            0 => Instruction::Dload0,
            1 => Instruction::Dload1,
            2 => Instruction::Dload2,
            3 => Instruction::Dload3,
            s if s <= 255 => Instruction::Dload(s as u8),
            s => Instruction::DloadWide(s),
        },
        // int and friends
        LocalKind::Int => match slot {
            0 => Instruction::Iload0,
            1 => Instruction::Iload1,
            2 => Instruction::Iload2,
            3 => Instruction::Iload3,
            s if s <= 255 => Instruction::Iload(s as u8),
            s => Instruction::IloadWide(s),
        },
    };
    sink.emit(instruction);
}

pub(crate) fn emit_store(sink: &mut dyn CodeSink, ty: &TypeDescription, slot: u16) {
    let instruction = match local_kind(ty) {
        LocalKind::Reference => match slot {
            0 => Instruction::Astore0,
            1 => Instruction::Astore1,
            2 => Instruction::Astore2,
            3 => Instruction::Astore3,
            s if s <= 255 => Instruction::Astore(s as u8),
            s => Instruction::AstoreWide(s),
        },
        LocalKind::Long => match slot {
            0 => Instruction::Lstore0,
            1 => Instruction::Lstore1,
            2 => Instruction::Lstore2,
            3 => Instruction::Lstore3,
            s if s <= 255 => Instruction::Lstore(s as u8),
            s => Instruction::LstoreWide(s),
        },
        LocalKind::Float => match slot {
            0 => Instruction::Fstore0,
            1 => Instruction::Fstore1,
            2 => Instruction::Fstore2,
            3 => Instruction::Fstore3,
            s if s <= 255 => Instruction::Fstore(s as u8),
            s => Instruction::FstoreWide(s),
        },
        LocalKind::Double => match slot {
            0 => Instruction::Dstore0,
            1 => Instruction::Dstore1,
            2 => Instruction::Dstore2,
            3 => Instruction::Dstore3,
            s if s <= 255 => Instruction::Dstore(s as u8),
            s => Instruction::DstoreWide(s),
        },
        LocalKind::Int => match slot {
            0 => Instruction::Istore0,
            1 => Instruction::Istore1,
            2 => Instruction::Istore2,
            3 => Instruction::Istore3,
            s if s <= 255 => Instruction::Istore(s as u8),
            s => Instruction::IstoreWide(s),
        },
    };
    sink.emit(instruction);
}
