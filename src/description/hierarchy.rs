use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::types::TypeDescription;

/// Assignability between types, supplied by whoever knows the class graph.
pub trait TypeHierarchy {
    /// True if a value of `from` can be stored where `to` is expected without
    /// any conversion or runtime check (identity or upcast).
    fn is_assignable(&self, from: &TypeDescription, to: &TypeDescription) -> bool;
}

/// An in-memory class graph keyed by internal names.
///
/// Every reference type is implicitly a subtype of `java/lang/Object`; arrays are
/// additionally `Cloneable` and `Serializable` and covariant in their reference
/// component type.
#[derive(Clone, Debug, Default)]
pub struct ClassHierarchy {
    supertypes: BTreeMap<String, Vec<String>>,
}

const CLONEABLE: &str = "java/lang/Cloneable";
const SERIALIZABLE: &str = "java/io/Serializable";
const COMPARABLE: &str = "java/lang/Comparable";

impl ClassHierarchy {
    pub fn new() -> Self {
        ClassHierarchy::default()
    }

    /// A hierarchy pre-populated with `java.lang` wrapper types and `String`.
    pub fn with_jdk_defaults() -> Self {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.declare("java/lang/Number", [SERIALIZABLE]);
        for number in [
            "java/lang/Byte",
            "java/lang/Short",
            "java/lang/Integer",
            "java/lang/Long",
            "java/lang/Float",
            "java/lang/Double",
        ] {
            hierarchy.declare(number, ["java/lang/Number", COMPARABLE]);
        }
        hierarchy.declare("java/lang/Boolean", [SERIALIZABLE, COMPARABLE]);
        hierarchy.declare("java/lang/Character", [SERIALIZABLE, COMPARABLE]);
        hierarchy.declare(
            "java/lang/String",
            [SERIALIZABLE, COMPARABLE, "java/lang/CharSequence"],
        );
        hierarchy
    }

    /// Records the direct supertypes (superclass and interfaces) of a type.
    pub fn declare<I, S>(&mut self, name: impl Into<String>, supertypes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertypes
            .entry(name.into())
            .or_default()
            .extend(supertypes.into_iter().map(Into::into));
        self
    }

    pub fn with<I, S>(mut self, name: impl Into<String>, supertypes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(name, supertypes);
        self
    }

    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == "java/lang/Object" {
            return true;
        }
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([sub]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for parent in self.supertypes.get(current).into_iter().flatten() {
                if parent == sup {
                    return true;
                }
                queue.push_back(parent.as_str());
            }
        }
        false
    }
}

impl TypeHierarchy for ClassHierarchy {
    fn is_assignable(&self, from: &TypeDescription, to: &TypeDescription) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (TypeDescription::Primitive(_), _) | (_, TypeDescription::Primitive(_)) => false,
            (TypeDescription::Reference(sub), TypeDescription::Reference(sup)) => {
                self.is_subtype(sub, sup)
            }
            (TypeDescription::Array(_), TypeDescription::Reference(sup)) => {
                sup == "java/lang/Object" || sup == CLONEABLE || sup == SERIALIZABLE
            }
            (TypeDescription::Array(from_component), TypeDescription::Array(to_component)) => {
                !from_component.is_primitive()
                    && !to_component.is_primitive()
                    && self.is_assignable(from_component, to_component)
            }
            (TypeDescription::Reference(_), TypeDescription::Array(_)) => false,
        }
    }
}
