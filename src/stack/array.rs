use crate::code_attribute::{CodeSink, Instruction, PoolEntry};
use crate::description::{PrimitiveType, TypeDescription};
use crate::error::{Error, Result};

use super::constant::integer;
use super::{StackEffect, StackManipulation, StackSize};

/// A single array instruction over arrays of `component`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayOperation {
    /// Pops an array reference and an index, pushes the element.
    Load(TypeDescription),
    /// Pops an array reference, an index and an element.
    Store(TypeDescription),
    /// Pops a length, pushes a new array reference.
    Create(TypeDescription),
}

impl ArrayOperation {
    pub fn effect(&self) -> StackEffect {
        match self {
            ArrayOperation::Load(component) => StackEffect::new(component.stack_size().size() - 2, 0),
            ArrayOperation::Store(component) => StackEffect::new(-(component.stack_size().size() + 2), 0),
            ArrayOperation::Create(_) => StackEffect::ZERO,
        }
    }

    pub(crate) fn emit(&self, sink: &mut dyn CodeSink) {
        match self {
            ArrayOperation::Load(component) => sink.emit(match component.as_primitive() {
                Some(PrimitiveType::Int) => Instruction::Iaload,
                Some(PrimitiveType::Long) => Instruction::Laload,
                Some(PrimitiveType::Float) => Instruction::Faload,
                Some(PrimitiveType::Double) => Instruction::Daload,
                Some(PrimitiveType::Byte | PrimitiveType::Boolean) => Instruction::Baload,
                Some(PrimitiveType::Char) => Instruction::Caload,
                Some(PrimitiveType::Short) => Instruction::Saload,
                _ => Instruction::Aaload,
            }),
            ArrayOperation::Store(component) => sink.emit(match component.as_primitive() {
                Some(PrimitiveType::Int) => Instruction::Iastore,
                Some(PrimitiveType::Long) => Instruction::Lastore,
                Some(PrimitiveType::Float) => Instruction::Fastore,
                Some(PrimitiveType::Double) => Instruction::Dastore,
                Some(PrimitiveType::Byte | PrimitiveType::Boolean) => Instruction::Bastore,
                Some(PrimitiveType::Char) => Instruction::Castore,
                Some(PrimitiveType::Short) => Instruction::Sastore,
                _ => Instruction::Aastore,
            }),
            ArrayOperation::Create(component) => match component.as_primitive().and_then(PrimitiveType::array_type_code) {
                Some(code) => sink.emit(Instruction::Newarray(code)),
                None => {
                    let index = sink.constant(PoolEntry::Class(component.internal_name()));
                    sink.emit(Instruction::Anewarray(index));
                }
            },
        }
    }
}

fn require_component(component: &TypeDescription, what: &str) -> Result<()> {
    if component.is_void() {
        return Err(Error::construction(what, "void is not an array component type"));
    }
    Ok(())
}

pub fn load(component: &TypeDescription) -> Result<StackManipulation> {
    require_component(component, "array load")?;
    Ok(StackManipulation::Array(ArrayOperation::Load(component.clone())))
}

pub fn store(component: &TypeDescription) -> Result<StackManipulation> {
    require_component(component, "array store")?;
    Ok(StackManipulation::Array(ArrayOperation::Store(component.clone())))
}

/// Builds arrays of one component type from element-loading manipulations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayFactory {
    component: TypeDescription,
}

impl ArrayFactory {
    pub fn new(component: &TypeDescription) -> Result<Self> {
        require_component(component, "array factory")?;
        Ok(ArrayFactory {
            component: component.clone(),
        })
    }

    pub fn component(&self) -> &TypeDescription {
        &self.component
    }

    pub fn array_type(&self) -> TypeDescription {
        TypeDescription::array_of(self.component.clone())
    }

    /// Creates the array and stores each value at its index, leaving the array
    /// reference on the stack.
    ///
    /// Each value must push exactly one element of the component type.
    pub fn with_values(&self, values: Vec<StackManipulation>) -> StackManipulation {
        let length = values.len() as i32;
        let mut members = Vec::with_capacity(2 + values.len() * 4);
        members.push(integer(length));
        members.push(StackManipulation::Array(ArrayOperation::Create(self.component.clone())));
        for (index, value) in values.into_iter().enumerate() {
            members.push(StackManipulation::Duplicate(StackSize::Single));
            members.push(integer(index as i32));
            members.push(value);
            members.push(StackManipulation::Array(ArrayOperation::Store(self.component.clone())));
        }
        StackManipulation::compound(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_attribute::CodeBuffer;
    use crate::stack::constant::Constant;

    #[test]
    fn test_element_effects() {
        assert_eq!(load(&TypeDescription::LONG).unwrap().effect(), StackEffect::new(0, 0));
        assert_eq!(
            load(&TypeDescription::string()).unwrap().effect(),
            StackEffect::new(-1, 0)
        );
        assert_eq!(
            store(&TypeDescription::DOUBLE).unwrap().effect(),
            StackEffect::new(-4, 0)
        );
        assert!(load(&TypeDescription::VOID).is_err());
        assert!(ArrayFactory::new(&TypeDescription::VOID).is_err());
    }

    #[test]
    fn test_factory_leaves_array_reference() {
        let factory = ArrayFactory::new(&TypeDescription::LONG).unwrap();
        let array = factory.with_values(vec![
            StackManipulation::Constant(Constant::Long(0)),
            StackManipulation::Constant(Constant::Long(1)),
        ]);
        // length, newarray, then dup + index + long = 5 at the deepest point
        assert_eq!(array.effect(), StackEffect::new(1, 5));

        let mut buffer = CodeBuffer::new();
        array.apply(&mut buffer).unwrap();
        assert_eq!(
            buffer.instructions,
            vec![
                Instruction::Iconst2,
                Instruction::Newarray(11),
                Instruction::Dup,
                Instruction::Iconst0,
                Instruction::Lconst0,
                Instruction::Lastore,
                Instruction::Dup,
                Instruction::Iconst1,
                Instruction::Lconst1,
                Instruction::Lastore,
            ]
        );
        assert_eq!(buffer.measured_effect(), array.effect());
    }

    #[test]
    fn test_empty_reference_array() {
        let factory = ArrayFactory::new(&TypeDescription::object()).unwrap();
        let array = factory.with_values(vec![]);
        assert_eq!(array.effect(), StackEffect::new(1, 1));
        let mut buffer = CodeBuffer::new();
        array.apply(&mut buffer).unwrap();
        assert_eq!(buffer.instructions, vec![Instruction::Iconst0, Instruction::Anewarray(1)]);
        assert_eq!(factory.array_type().descriptor(), "[Ljava/lang/Object;");
    }
}
