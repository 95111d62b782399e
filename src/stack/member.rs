use crate::code_attribute::{CodeSink, Instruction, PoolEntry};
use crate::description::TypeDescription;
use crate::error::{Error, Result};

use super::{StackEffect, StackManipulation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOperation {
    Get,
    Put,
}

/// Reads or writes a field. Instance access consumes the owner reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldAccess {
    pub owner: TypeDescription,
    pub name: String,
    pub ty: TypeDescription,
    pub is_static: bool,
    pub operation: FieldOperation,
}

impl FieldAccess {
    pub fn effect(&self) -> StackEffect {
        let width = self.ty.stack_size().size();
        let receiver = if self.is_static { 0 } else { 1 };
        match self.operation {
            FieldOperation::Get => StackEffect::new(width - receiver, width - receiver),
            FieldOperation::Put => StackEffect::new(-(width + receiver), 0),
        }
    }

    pub(crate) fn emit(&self, sink: &mut dyn CodeSink) {
        let index = sink.constant(PoolEntry::FieldRef {
            owner: self.owner.internal_name(),
            name: self.name.clone(),
            descriptor: self.ty.descriptor(),
        });
        sink.emit(match (self.operation, self.is_static) {
            (FieldOperation::Get, true) => Instruction::Getstatic(index),
            (FieldOperation::Get, false) => Instruction::Getfield(index),
            (FieldOperation::Put, true) => Instruction::Putstatic(index),
            (FieldOperation::Put, false) => Instruction::Putfield(index),
        });
    }
}

pub fn field_access(
    owner: &TypeDescription,
    name: impl Into<String>,
    ty: &TypeDescription,
    is_static: bool,
    operation: FieldOperation,
) -> Result<StackManipulation> {
    let name = name.into();
    if ty.is_void() {
        return Err(Error::construction(
            "field access",
            format!("field {} cannot be of type void", name),
        ));
    }
    if owner.is_primitive() {
        return Err(Error::construction(
            "field access",
            format!("{} cannot declare field {}", owner, name),
        ));
    }
    Ok(StackManipulation::FieldAccess(FieldAccess {
        owner: owner.clone(),
        name,
        ty: ty.clone(),
        is_static,
        operation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_attribute::CodeBuffer;

    #[test]
    fn test_field_effects_match_emitted_code() {
        let owner = TypeDescription::reference("pkg/Foo");
        let cases = [
            (true, FieldOperation::Get, StackEffect::new(2, 2)),
            (false, FieldOperation::Get, StackEffect::new(1, 1)),
            (true, FieldOperation::Put, StackEffect::new(-2, 0)),
            (false, FieldOperation::Put, StackEffect::new(-3, 0)),
        ];
        for (is_static, operation, expected) in cases {
            let access = field_access(&owner, "count", &TypeDescription::LONG, is_static, operation).unwrap();
            assert_eq!(access.effect(), expected);
            let mut buffer = CodeBuffer::new();
            access.apply(&mut buffer).unwrap();
            assert_eq!(buffer.measured_effect(), expected);
        }
    }

    #[test]
    fn test_reject_void_field() {
        let owner = TypeDescription::reference("pkg/Foo");
        assert!(field_access(&owner, "x", &TypeDescription::VOID, true, FieldOperation::Get).is_err());
        assert!(field_access(&TypeDescription::INT, "x", &TypeDescription::INT, true, FieldOperation::Get).is_err());
    }
}
