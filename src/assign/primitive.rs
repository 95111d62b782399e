use crate::description::{MethodDescription, MethodModifiers, PrimitiveType, TypeDescription, TypeHierarchy};
use crate::stack::invocation::invoke;
use crate::stack::{check_cast, StackManipulation};

use super::{reference, Typing};

/// Widening rank: a value may move to any type reachable from it.
fn widens_to(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => matches!(to, Double),
        Boolean | Double | Void => false,
    }
}

/// Identity or widening primitive conversion. Narrowing is illegal.
pub fn widening(from: PrimitiveType, to: PrimitiveType) -> StackManipulation {
    if from == to {
        StackManipulation::Trivial
    } else if widens_to(from, to) {
        StackManipulation::PrimitiveWidening { from, to }
    } else {
        StackManipulation::Illegal
    }
}

/// `Wrapper.valueOf(primitive)`.
pub fn boxing(primitive: PrimitiveType) -> StackManipulation {
    if primitive == PrimitiveType::Void {
        return StackManipulation::Illegal;
    }
    let wrapper = TypeDescription::reference(primitive.wrapper());
    let value_of = MethodDescription::new(wrapper.clone(), "valueOf", vec![primitive.into()], wrapper)
        .with_modifiers(MethodModifiers::PUBLIC | MethodModifiers::STATIC);
    invoke(&value_of).unwrap_or(StackManipulation::Illegal)
}

/// `wrapper.xxxValue()` on a reference already known to be the wrapper of `primitive`.
pub fn unboxing(primitive: PrimitiveType) -> StackManipulation {
    let Some(accessor) = primitive.unboxing_method() else {
        return StackManipulation::Illegal;
    };
    let xxx_value = MethodDescription::new(
        TypeDescription::reference(primitive.wrapper()),
        accessor,
        vec![],
        primitive.into(),
    );
    invoke(&xxx_value).unwrap_or(StackManipulation::Illegal)
}

pub(super) fn box_then_assign(
    hierarchy: &dyn TypeHierarchy,
    from: PrimitiveType,
    target: &TypeDescription,
    typing: Typing,
) -> StackManipulation {
    let wrapper = TypeDescription::reference(from.wrapper());
    boxing(from).then(reference::assign(hierarchy, &wrapper, target, typing))
}

/// Wrappers unbox to their own primitive and widen from there. Any other
/// reference is cast to the wrapper of `to` first, which needs dynamic typing.
pub(super) fn unbox_then_widen(source: &TypeDescription, to: PrimitiveType, typing: Typing) -> StackManipulation {
    match source.unboxed() {
        Some(unboxed) => unboxing(unboxed).then(widening(unboxed, to)),
        None if typing.is_dynamic() && to != PrimitiveType::Void => {
            match check_cast(&TypeDescription::reference(to.wrapper())) {
                Ok(cast) => cast.then(unboxing(to)),
                Err(_) => StackManipulation::Illegal,
            }
        }
        None => StackManipulation::Illegal,
    }
}
