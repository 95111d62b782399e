use crate::code_attribute::{CodeSink, Instruction, PoolEntry};
use crate::description::{PrimitiveType, TypeDescription};
use crate::error::{Error, Result};

use super::{StackManipulation, StackSize};

/// A value pushed from an immediate operand or the constant pool.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Null,
    Text(String),
    /// A `java.lang.Class` literal. Primitive and void classes are read from
    /// their wrapper's `TYPE` field since `ldc` cannot name them.
    Class(TypeDescription),
}

impl Constant {
    pub fn stack_size(&self) -> StackSize {
        match self {
            Constant::Long(_) | Constant::Double(_) => StackSize::Double,
            _ => StackSize::Single,
        }
    }

    pub(crate) fn emit(&self, sink: &mut dyn CodeSink) {
        match self {
            Constant::Integer(value) => emit_int_const(sink, *value),
            Constant::Long(value) => match value {
                0 => sink.emit(Instruction::Lconst0),
                1 => sink.emit(Instruction::Lconst1),
                _ => {
                    let index = sink.constant(PoolEntry::Long(*value));
                    sink.emit(Instruction::Ldc2W(index));
                }
            },
            Constant::Float(value) => {
                if *value == 0.0 && value.is_sign_positive() {
                    sink.emit(Instruction::Fconst0);
                } else if *value == 1.0 {
                    sink.emit(Instruction::Fconst1);
                } else if *value == 2.0 {
                    sink.emit(Instruction::Fconst2);
                } else {
                    let index = sink.constant(PoolEntry::Float(*value));
                    emit_ldc(sink, index);
                }
            }
            Constant::Double(value) => {
                if *value == 0.0 && value.is_sign_positive() {
                    sink.emit(Instruction::Dconst0);
                } else if *value == 1.0 {
                    sink.emit(Instruction::Dconst1);
                } else {
                    let index = sink.constant(PoolEntry::Double(*value));
                    sink.emit(Instruction::Ldc2W(index));
                }
            }
            Constant::Null => sink.emit(Instruction::Aconstnull),
            Constant::Text(text) => {
                let index = sink.constant(PoolEntry::String(text.clone()));
                emit_ldc(sink, index);
            }
            Constant::Class(TypeDescription::Primitive(primitive)) => {
                let index = sink.constant(PoolEntry::FieldRef {
                    owner: primitive.wrapper().to_string(),
                    name: "TYPE".to_string(),
                    descriptor: "Ljava/lang/Class;".to_string(),
                });
                sink.emit(Instruction::Getstatic(index));
            }
            Constant::Class(ty) => {
                let index = sink.constant(PoolEntry::Class(ty.internal_name()));
                emit_ldc(sink, index);
            }
        }
    }
}

fn emit_int_const(sink: &mut dyn CodeSink, value: i32) {
    match value {
        -1 => sink.emit(Instruction::Iconstm1),
        0 => sink.emit(Instruction::Iconst0),
        1 => sink.emit(Instruction::Iconst1),
        2 => sink.emit(Instruction::Iconst2),
        3 => sink.emit(Instruction::Iconst3),
        4 => sink.emit(Instruction::Iconst4),
        5 => sink.emit(Instruction::Iconst5),
        v if (-128..=127).contains(&v) => sink.emit(Instruction::Bipush(v as i8)),
        v if (-32768..=32767).contains(&v) => sink.emit(Instruction::Sipush(v as i16)),
        v => {
            let index = sink.constant(PoolEntry::Integer(v));
            emit_ldc(sink, index);
        }
    }
}

fn emit_ldc(sink: &mut dyn CodeSink, index: u16) {
    if index <= 255 {
        sink.emit(Instruction::Ldc(index as u8));
    } else {
        sink.emit(Instruction::LdcW(index));
    }
}

pub fn integer(value: i32) -> StackManipulation {
    StackManipulation::Constant(Constant::Integer(value))
}

pub fn text(value: impl Into<String>) -> StackManipulation {
    StackManipulation::Constant(Constant::Text(value.into()))
}

/// The zero value of `ty`: `0`, `0L`, `0.0f`, `0.0d`, `false` or `null`.
///
/// Void has no default value.
pub fn default_value(ty: &TypeDescription) -> Result<StackManipulation> {
    let constant = match ty {
        TypeDescription::Primitive(PrimitiveType::Void) => {
            return Err(Error::construction("default value", "void has no value"))
        }
        TypeDescription::Primitive(PrimitiveType::Long) => Constant::Long(0),
        TypeDescription::Primitive(PrimitiveType::Float) => Constant::Float(0.0),
        TypeDescription::Primitive(PrimitiveType::Double) => Constant::Double(0.0),
        TypeDescription::Primitive(_) => Constant::Integer(0),
        _ => Constant::Null,
    };
    Ok(StackManipulation::Constant(constant))
}
