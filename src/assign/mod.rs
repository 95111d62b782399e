//! Type conversion between a value on the stack and the type a consumer expects.
//!
//! [`DefaultAssigner`] tries its rules in a fixed order and the first rule that
//! recognizes the pair of types decides the outcome, including the outcome that
//! the conversion is illegal. Nothing is compared between rules.

mod primitive;
mod reference;

use crate::description::{TypeDescription, TypeHierarchy};
use crate::stack::constant::default_value;
use crate::stack::{removal, StackManipulation};

pub use self::primitive::{boxing, unboxing, widening};

/// Whether a conversion may rely on a runtime type check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Typing {
    /// Only conversions the compiler could prove are allowed.
    #[default]
    Static,
    /// Casts and unboxing of unknown references are allowed.
    Dynamic,
}

impl Typing {
    pub fn is_dynamic(self) -> bool {
        self == Typing::Dynamic
    }
}

/// What to do when a value is required but the source produces none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VoidPolicy {
    #[default]
    Reject,
    /// Push the target type's zero or `null` value.
    DefaultValue,
}

pub trait Assigner {
    /// Converts a value of `source` on top of the stack into `target`, or
    /// returns [`StackManipulation::Illegal`].
    fn assign(&self, source: &TypeDescription, target: &TypeDescription, typing: Typing) -> StackManipulation;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    VoidAware,
    PrimitiveWidening,
    Boxing,
    Reference,
}

const RULES: [Rule; 4] = [Rule::VoidAware, Rule::PrimitiveWidening, Rule::Boxing, Rule::Reference];

/// The standard conversion chain over a class hierarchy.
#[derive(Clone, Copy)]
pub struct DefaultAssigner<'a> {
    hierarchy: &'a dyn TypeHierarchy,
    void_policy: VoidPolicy,
}

impl<'a> DefaultAssigner<'a> {
    pub fn new(hierarchy: &'a dyn TypeHierarchy) -> Self {
        DefaultAssigner {
            hierarchy,
            void_policy: VoidPolicy::Reject,
        }
    }

    pub fn with_void_policy(mut self, void_policy: VoidPolicy) -> Self {
        self.void_policy = void_policy;
        self
    }

    pub fn hierarchy(&self) -> &'a dyn TypeHierarchy {
        self.hierarchy
    }

    /// `None` when the rule does not handle this pair of types.
    fn try_rule(
        &self,
        rule: Rule,
        source: &TypeDescription,
        target: &TypeDescription,
        typing: Typing,
    ) -> Option<StackManipulation> {
        match rule {
            Rule::VoidAware => self.void_aware(source, target),
            Rule::PrimitiveWidening => match (source, target) {
                (TypeDescription::Primitive(from), TypeDescription::Primitive(to)) => Some(widening(*from, *to)),
                _ => None,
            },
            Rule::Boxing => match (source, target) {
                (TypeDescription::Primitive(from), _) if !target.is_primitive() => {
                    Some(primitive::box_then_assign(self.hierarchy, *from, target, typing))
                }
                (_, TypeDescription::Primitive(to)) if !source.is_primitive() => {
                    Some(primitive::unbox_then_widen(source, *to, typing))
                }
                _ => None,
            },
            Rule::Reference => Some(reference::assign(self.hierarchy, source, target, typing)),
        }
    }

    fn void_aware(&self, source: &TypeDescription, target: &TypeDescription) -> Option<StackManipulation> {
        match (source.is_void(), target.is_void()) {
            (true, true) => Some(StackManipulation::Trivial),
            (false, true) => Some(removal(source)),
            (true, false) => Some(match self.void_policy {
                VoidPolicy::Reject => StackManipulation::Illegal,
                VoidPolicy::DefaultValue => default_value(target).unwrap_or(StackManipulation::Illegal),
            }),
            (false, false) => None,
        }
    }
}

impl Assigner for DefaultAssigner<'_> {
    fn assign(&self, source: &TypeDescription, target: &TypeDescription, typing: Typing) -> StackManipulation {
        RULES
            .iter()
            .find_map(|rule| self.try_rule(*rule, source, target, typing))
            .unwrap_or(StackManipulation::Illegal)
    }
}
