use crate::description::{TypeDescription, TypeHierarchy};
use crate::stack::{check_cast, StackManipulation};

use super::Typing;

/// Upcasts are free; anything else needs a runtime cast under dynamic typing.
pub(super) fn assign(
    hierarchy: &dyn TypeHierarchy,
    source: &TypeDescription,
    target: &TypeDescription,
    typing: Typing,
) -> StackManipulation {
    if source.is_primitive() || target.is_primitive() {
        StackManipulation::Illegal
    } else if hierarchy.is_assignable(source, target) {
        StackManipulation::Trivial
    } else if typing.is_dynamic() {
        check_cast(target).unwrap_or(StackManipulation::Illegal)
    } else {
        StackManipulation::Illegal
    }
}
