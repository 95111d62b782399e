//! The stack manipulation algebra: composable emission units that declare how
//! they change the operand stack before anything is written.

pub mod array;
pub mod constant;
pub mod invocation;
pub mod member;
pub mod variable;

use std::fmt;

use crate::code_attribute::{CodeSink, Instruction, PoolEntry};
use crate::description::{PrimitiveType, TypeDescription};
use crate::error::{Error, Result};

pub use self::array::{ArrayFactory, ArrayOperation};
pub use self::constant::Constant;
pub use self::invocation::{InvocationKind, MethodInvocation};
pub use self::member::{FieldAccess, FieldOperation};

/// Operand stack slots taken by a single value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackSize {
    Zero,
    Single,
    Double,
}

impl StackSize {
    pub fn size(self) -> i32 {
        match self {
            StackSize::Zero => 0,
            StackSize::Single => 1,
            StackSize::Double => 2,
        }
    }

    /// Effect of pushing one value of this size.
    pub fn to_increasing_effect(self) -> StackEffect {
        StackEffect::new(self.size(), self.size())
    }

    /// Effect of popping one value of this size.
    pub fn to_decreasing_effect(self) -> StackEffect {
        StackEffect::new(-self.size(), 0)
    }
}

/// Net operand stack change of an operation and the deepest point it reaches,
/// both relative to the depth on entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackEffect {
    net_delta: i32,
    max_intermediate: i32,
}

impl StackEffect {
    pub const ZERO: StackEffect = StackEffect {
        net_delta: 0,
        max_intermediate: 0,
    };

    /// `max_intermediate` is raised to at least `max(0, net_delta)`.
    pub fn new(net_delta: i32, max_intermediate: i32) -> Self {
        StackEffect {
            net_delta,
            max_intermediate: max_intermediate.max(net_delta).max(0),
        }
    }

    pub fn net_delta(&self) -> i32 {
        self.net_delta
    }

    pub fn max_intermediate(&self) -> i32 {
        self.max_intermediate
    }

    /// The effect of running `self` and then `next`.
    pub fn aggregate(self, next: StackEffect) -> StackEffect {
        StackEffect::new(
            self.net_delta + next.net_delta,
            self.max_intermediate
                .max(self.net_delta + next.max_intermediate),
        )
    }
}

impl Default for StackEffect {
    fn default() -> Self {
        StackEffect::ZERO
    }
}

impl fmt::Display for StackEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net {:+}, max {}", self.net_delta, self.max_intermediate)
    }
}

/// A unit of emitted code with a statically known stack effect.
///
/// Values are built once for one method body, checked with [`is_valid`], applied
/// once and dropped. Constructors that can detect a structurally impossible
/// request (void where a value is needed, special invocation of a static method)
/// return [`Error::Construction`] instead of producing a manipulation.
///
/// [`is_valid`]: StackManipulation::is_valid
#[derive(Clone, Debug, PartialEq)]
pub enum StackManipulation {
    /// Marks a conversion or binding that cannot be expressed.
    Illegal,
    /// Emits nothing.
    Trivial,
    /// Members run in order; valid only if every member is.
    Compound(Vec<StackManipulation>),
    Constant(Constant),
    VariableLoad {
        ty: TypeDescription,
        offset: u16,
    },
    VariableStore {
        ty: TypeDescription,
        offset: u16,
    },
    Array(ArrayOperation),
    Duplicate(StackSize),
    Removal(StackSize),
    Invocation(MethodInvocation),
    FieldAccess(FieldAccess),
    /// `new` of an uninitialized instance.
    TypeCreation(TypeDescription),
    CheckCast(TypeDescription),
    PrimitiveWidening {
        from: PrimitiveType,
        to: PrimitiveType,
    },
    Throw,
    Return(TypeDescription),
}

impl StackManipulation {
    /// Flattens nested compounds and drops trivial members.
    pub fn compound<I>(members: I) -> StackManipulation
    where
        I: IntoIterator<Item = StackManipulation>,
    {
        let mut flat = Vec::new();
        for member in members {
            match member {
                StackManipulation::Trivial => {}
                StackManipulation::Compound(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => StackManipulation::Trivial,
            1 => flat.pop().unwrap_or(StackManipulation::Trivial),
            _ => StackManipulation::Compound(flat),
        }
    }

    /// Appends `next`, flattening both sides.
    pub fn then(self, next: StackManipulation) -> StackManipulation {
        StackManipulation::compound([self, next])
    }

    pub fn is_valid(&self) -> bool {
        match self {
            StackManipulation::Illegal => false,
            StackManipulation::Compound(members) => members.iter().all(StackManipulation::is_valid),
            _ => true,
        }
    }

    /// Declared effect. Invalid manipulations report the effect of their valid
    /// members only and must not be applied.
    pub fn effect(&self) -> StackEffect {
        match self {
            StackManipulation::Illegal | StackManipulation::Trivial => StackEffect::ZERO,
            StackManipulation::Compound(members) => members
                .iter()
                .fold(StackEffect::ZERO, |acc, m| acc.aggregate(m.effect())),
            StackManipulation::Constant(constant) => constant.stack_size().to_increasing_effect(),
            StackManipulation::VariableLoad { ty, .. } => ty.stack_size().to_increasing_effect(),
            StackManipulation::VariableStore { ty, .. } => ty.stack_size().to_decreasing_effect(),
            StackManipulation::Array(operation) => operation.effect(),
            StackManipulation::Duplicate(size) => size.to_increasing_effect(),
            StackManipulation::Removal(size) => size.to_decreasing_effect(),
            StackManipulation::Invocation(invocation) => invocation.effect(),
            StackManipulation::FieldAccess(access) => access.effect(),
            StackManipulation::TypeCreation(_) => StackSize::Single.to_increasing_effect(),
            StackManipulation::CheckCast(_) => StackEffect::ZERO,
            StackManipulation::PrimitiveWidening { from, to } => {
                let delta = to.stack_size().size() - from.stack_size().size();
                StackEffect::new(delta, delta)
            }
            StackManipulation::Throw => StackSize::Single.to_decreasing_effect(),
            StackManipulation::Return(ty) => ty.stack_size().to_decreasing_effect(),
        }
    }

    /// Emits the manipulation into `sink` and returns its effect.
    ///
    /// Fails with [`Error::InvalidApply`] before emitting anything if the
    /// manipulation is not valid.
    pub fn apply(&self, sink: &mut dyn CodeSink) -> Result<StackEffect> {
        if !self.is_valid() {
            return Err(Error::InvalidApply {
                manipulation: format!("{:?}", self),
            });
        }
        self.emit(sink);
        Ok(self.effect())
    }

    fn emit(&self, sink: &mut dyn CodeSink) {
        match self {
            StackManipulation::Illegal | StackManipulation::Trivial => {}
            StackManipulation::Compound(members) => {
                for member in members {
                    member.emit(sink);
                }
            }
            StackManipulation::Constant(constant) => constant.emit(sink),
            StackManipulation::VariableLoad { ty, offset } => variable::emit_load(sink, ty, *offset),
            StackManipulation::VariableStore { ty, offset } => variable::emit_store(sink, ty, *offset),
            StackManipulation::Array(operation) => operation.emit(sink),
            StackManipulation::Duplicate(size) => match size {
                StackSize::Zero => {}
                StackSize::Single => sink.emit(Instruction::Dup),
                StackSize::Double => sink.emit(Instruction::Dup2),
            },
            StackManipulation::Removal(size) => match size {
                StackSize::Zero => {}
                StackSize::Single => sink.emit(Instruction::Pop),
                StackSize::Double => sink.emit(Instruction::Pop2),
            },
            StackManipulation::Invocation(invocation) => invocation.emit(sink),
            StackManipulation::FieldAccess(access) => access.emit(sink),
            StackManipulation::TypeCreation(ty) => {
                let index = sink.constant(PoolEntry::Class(ty.internal_name()));
                sink.emit(Instruction::New(index));
            }
            StackManipulation::CheckCast(ty) => {
                let index = sink.constant(PoolEntry::Class(ty.internal_name()));
                sink.emit(Instruction::Checkcast(index));
            }
            StackManipulation::PrimitiveWidening { from, to } => {
                if let Some(instruction) = widening_instruction(*from, *to) {
                    sink.emit(instruction);
                }
            }
            StackManipulation::Throw => sink.emit(Instruction::Athrow),
            StackManipulation::Return(ty) => sink.emit(return_instruction(ty)),
        }
    }
}

/// Creates an instance of `ty` without running a constructor.
pub fn type_creation(ty: &TypeDescription) -> Result<StackManipulation> {
    match ty {
        TypeDescription::Reference(_) => Ok(StackManipulation::TypeCreation(ty.clone())),
        _ => Err(Error::construction(
            "type creation",
            format!("{} is not a class type", ty),
        )),
    }
}

pub fn check_cast(ty: &TypeDescription) -> Result<StackManipulation> {
    if ty.is_primitive() {
        return Err(Error::construction(
            "type check",
            format!("cannot cast to primitive {}", ty),
        ));
    }
    Ok(StackManipulation::CheckCast(ty.clone()))
}

/// Pops a value of `ty`. Removing void is trivial.
pub fn removal(ty: &TypeDescription) -> StackManipulation {
    match ty.stack_size() {
        StackSize::Zero => StackManipulation::Trivial,
        size => StackManipulation::Removal(size),
    }
}

pub fn duplication(ty: &TypeDescription) -> StackManipulation {
    match ty.stack_size() {
        StackSize::Zero => StackManipulation::Trivial,
        size => StackManipulation::Duplicate(size),
    }
}

/// Returns a value of `ty` from the current method, or nothing for void.
pub fn method_return(ty: &TypeDescription) -> StackManipulation {
    StackManipulation::Return(ty.clone())
}

fn return_instruction(ty: &TypeDescription) -> Instruction {
    match ty {
        TypeDescription::Primitive(PrimitiveType::Void) => Instruction::Return,
        TypeDescription::Primitive(PrimitiveType::Long) => Instruction::Lreturn,
        TypeDescription::Primitive(PrimitiveType::Float) => Instruction::Freturn,
        TypeDescription::Primitive(PrimitiveType::Double) => Instruction::Dreturn,
        TypeDescription::Primitive(_) => Instruction::Ireturn,
        _ => Instruction::Areturn,
    }
}

/// Position in the numeric promotion order once sub-int types live on the stack
/// as ints: int, long, float, double.
fn computational_rank(primitive: PrimitiveType) -> Option<u8> {
    match primitive {
        PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char | PrimitiveType::Int => Some(0),
        PrimitiveType::Long => Some(1),
        PrimitiveType::Float => Some(2),
        PrimitiveType::Double => Some(3),
        PrimitiveType::Boolean | PrimitiveType::Void => None,
    }
}

fn widening_instruction(from: PrimitiveType, to: PrimitiveType) -> Option<Instruction> {
    match (computational_rank(from)?, computational_rank(to)?) {
        (0, 1) => Some(Instruction::I2l), // int → long
        (0, 2) => Some(Instruction::I2f), // int → float
        (0, 3) => Some(Instruction::I2d), // int → double
        (1, 2) => Some(Instruction::L2f), // long → float
        (1, 3) => Some(Instruction::L2d), // long → double
        (2, 3) => Some(Instruction::F2d), // float → double
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_attribute::CodeBuffer;

    #[test]
    fn test_aggregate_tracks_intermediate_peak() {
        let push_long = StackEffect::new(2, 2);
        let pop_long = StackEffect::new(-2, 0);
        let combined = push_long.aggregate(push_long).aggregate(pop_long);
        assert_eq!(combined, StackEffect::new(2, 4));
        assert_eq!(pop_long.aggregate(push_long), StackEffect::new(0, 0));
    }

    #[test]
    fn test_new_never_under_reports() {
        let effect = StackEffect::new(3, 1);
        assert_eq!(effect.max_intermediate(), 3);
        assert_eq!(StackEffect::new(-3, -1).max_intermediate(), 0);
    }

    #[test]
    fn test_compound_validity_is_all_or_nothing() {
        let valid = StackManipulation::compound([
            StackManipulation::Constant(Constant::Integer(1)),
            StackManipulation::Removal(StackSize::Single),
        ]);
        assert!(valid.is_valid());
        assert_eq!(valid.effect(), StackEffect::new(0, 1));

        let invalid = StackManipulation::Compound(vec![
            StackManipulation::Constant(Constant::Integer(1)),
            StackManipulation::Illegal,
        ]);
        assert!(!invalid.is_valid());
    }

    #[test]
    fn test_apply_refuses_invalid_without_emitting() {
        let mut buffer = CodeBuffer::new();
        let invalid = StackManipulation::Compound(vec![
            StackManipulation::Constant(Constant::Integer(1)),
            StackManipulation::Illegal,
        ]);
        assert!(matches!(invalid.apply(&mut buffer), Err(Error::InvalidApply { .. })));
        assert!(buffer.instructions.is_empty());
    }

    #[test]
    fn test_compound_flattens_and_drops_trivial() {
        let inner = StackManipulation::compound([
            StackManipulation::Duplicate(StackSize::Single),
            StackManipulation::Trivial,
        ]);
        assert_eq!(inner, StackManipulation::Duplicate(StackSize::Single));
        let outer = inner.clone().then(StackManipulation::Compound(vec![
            StackManipulation::Throw,
            StackManipulation::Throw,
        ]));
        assert_eq!(
            outer,
            StackManipulation::Compound(vec![
                StackManipulation::Duplicate(StackSize::Single),
                StackManipulation::Throw,
                StackManipulation::Throw,
            ])
        );
        assert_eq!(
            StackManipulation::compound(std::iter::empty()),
            StackManipulation::Trivial
        );
    }

    #[test]
    fn test_widening_emission() {
        let mut buffer = CodeBuffer::new();
        let widen = StackManipulation::PrimitiveWidening {
            from: PrimitiveType::Byte,
            to: PrimitiveType::Long,
        };
        assert_eq!(widen.apply(&mut buffer), Ok(StackEffect::new(1, 1)));
        let identity = StackManipulation::PrimitiveWidening {
            from: PrimitiveType::Char,
            to: PrimitiveType::Int,
        };
        assert_eq!(identity.apply(&mut buffer), Ok(StackEffect::ZERO));
        assert_eq!(buffer.instructions, vec![Instruction::I2l]);
    }

    #[test]
    fn test_returns_and_removals() {
        let mut buffer = CodeBuffer::new();
        let code = StackManipulation::compound([
            removal(&TypeDescription::DOUBLE),
            removal(&TypeDescription::VOID),
            method_return(&TypeDescription::VOID),
        ]);
        assert_eq!(code.apply(&mut buffer), Ok(StackEffect::new(-2, 0)));
        assert_eq!(buffer.instructions, vec![Instruction::Pop2, Instruction::Return]);
        assert_eq!(
            method_return(&TypeDescription::LONG).effect(),
            StackEffect::new(-2, 0)
        );
    }

    #[test]
    fn test_type_creation_rejects_primitives() {
        assert!(type_creation(&TypeDescription::INT).is_err());
        assert!(check_cast(&TypeDescription::LONG).is_err());
        assert_eq!(
            type_creation(&TypeDescription::string()).map(|m| m.effect()),
            Ok(StackEffect::new(1, 1))
        );
    }
}
