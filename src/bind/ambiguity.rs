//! Picking one of several valid binding attempts.

use tracing::trace;

use crate::description::{MethodDescription, PrimitiveType, TypeDescription, TypeHierarchy};
use crate::error::{Error, Result};

use super::{no_binding, BindingAttempt};

/// The verdict of comparing two attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The resolver has no opinion.
    Unknown,
    Left,
    Right,
    /// The resolver looked and found the two attempts tied.
    Ambiguous,
}

impl Resolution {
    pub fn is_unresolved(self) -> bool {
        matches!(self, Resolution::Unknown | Resolution::Ambiguous)
    }

    /// Combines two verdicts about the same pair. Opposing verdicts are ambiguous.
    pub fn merge(self, other: Resolution) -> Resolution {
        match (self, other) {
            (Resolution::Unknown, other) => other,
            (Resolution::Ambiguous, _) => Resolution::Ambiguous,
            (this, Resolution::Unknown) => this,
            (this, other) if this == other => this,
            _ => Resolution::Ambiguous,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// A pairwise tie-break rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AmbiguityResolver {
    /// Prefers the handler named like the intercepted method.
    NameEquality,
    /// Prefers the handler whose parameters bound to the same intercepted
    /// arguments are more specific.
    MostSpecificType,
    /// Prefers the higher declared priority.
    BindingPriority,
    /// Prefers the handler with more parameters.
    ParameterLength,
    /// Always picks one side.
    Directional(Direction),
}

impl AmbiguityResolver {
    pub fn resolve(
        &self,
        source: &MethodDescription,
        left: &BindingAttempt,
        right: &BindingAttempt,
        hierarchy: &dyn TypeHierarchy,
    ) -> Resolution {
        match self {
            AmbiguityResolver::NameEquality => {
                let left_matches = left.target.name == source.name;
                let right_matches = right.target.name == source.name;
                match (left_matches, right_matches) {
                    (true, false) => Resolution::Left,
                    (false, true) => Resolution::Right,
                    _ => Resolution::Unknown,
                }
            }
            AmbiguityResolver::MostSpecificType => most_specific_type(source, left, right, hierarchy),
            AmbiguityResolver::BindingPriority => by_order(left.priority.cmp(&right.priority)),
            AmbiguityResolver::ParameterLength => {
                by_order(left.target.parameter_types.len().cmp(&right.target.parameter_types.len()))
            }
            AmbiguityResolver::Directional(Direction::Left) => Resolution::Left,
            AmbiguityResolver::Directional(Direction::Right) => Resolution::Right,
        }
    }
}

/// Greater wins.
fn by_order(ordering: std::cmp::Ordering) -> Resolution {
    match ordering {
        std::cmp::Ordering::Greater => Resolution::Left,
        std::cmp::Ordering::Less => Resolution::Right,
        std::cmp::Ordering::Equal => Resolution::Ambiguous,
    }
}

/// Lower precedence is the more specific primitive.
fn primitive_precedence(primitive: PrimitiveType) -> u8 {
    match primitive {
        PrimitiveType::Boolean => 0,
        PrimitiveType::Byte => 1,
        PrimitiveType::Short => 2,
        PrimitiveType::Int => 3,
        PrimitiveType::Char => 4,
        PrimitiveType::Long => 5,
        PrimitiveType::Float => 6,
        PrimitiveType::Double => 7,
        PrimitiveType::Void => 8,
    }
}

fn resolve_rival_binding(
    argument_type: &TypeDescription,
    left_type: &TypeDescription,
    right_type: &TypeDescription,
    hierarchy: &dyn TypeHierarchy,
) -> Resolution {
    if left_type == right_type {
        return Resolution::Unknown;
    }
    match (left_type.as_primitive(), right_type.as_primitive()) {
        (Some(left), Some(right)) => {
            let (left, right) = (primitive_precedence(left), primitive_precedence(right));
            if left < right {
                Resolution::Left
            } else if left > right {
                Resolution::Right
            } else {
                Resolution::Unknown
            }
        }
        (Some(_), None) if argument_type.is_primitive() => Resolution::Left,
        (Some(_), None) => Resolution::Right,
        (None, Some(_)) if argument_type.is_primitive() => Resolution::Right,
        (None, Some(_)) => Resolution::Left,
        (None, None) => {
            if hierarchy.is_assignable(right_type, left_type) {
                Resolution::Right
            } else if hierarchy.is_assignable(left_type, right_type) {
                Resolution::Left
            } else {
                Resolution::Ambiguous
            }
        }
    }
}

fn most_specific_type(
    source: &MethodDescription,
    left: &BindingAttempt,
    right: &BindingAttempt,
    hierarchy: &dyn TypeHierarchy,
) -> Resolution {
    let mut resolution = Resolution::Unknown;
    let mut left_extra = 0i32;
    let mut right_extra = 0i32;
    for (argument, argument_type) in source.parameter_types.iter().enumerate() {
        match (left.parameter_for_argument(argument), right.parameter_for_argument(argument)) {
            (Some(left_index), Some(right_index)) => {
                let rival = match (
                    left.target.parameter_types.get(left_index),
                    right.target.parameter_types.get(right_index),
                ) {
                    (Some(left_type), Some(right_type)) => {
                        resolve_rival_binding(argument_type, left_type, right_type, hierarchy)
                    }
                    _ => Resolution::Unknown,
                };
                resolution = resolution.merge(rival);
            }
            (Some(_), None) => left_extra += 1,
            (None, Some(_)) => right_extra += 1,
            (None, None) => {}
        }
    }
    if resolution == Resolution::Unknown {
        by_order(left_extra.cmp(&right_extra))
    } else {
        resolution
    }
}

/// Resolvers tried in order until one reaches a verdict.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AmbiguityChain {
    resolvers: Vec<AmbiguityResolver>,
}

impl AmbiguityChain {
    pub fn new(resolvers: Vec<AmbiguityResolver>) -> Self {
        AmbiguityChain { resolvers }
    }

    pub fn resolvers(&self) -> &[AmbiguityResolver] {
        &self.resolvers
    }

    pub fn then(mut self, resolver: AmbiguityResolver) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn resolve(
        &self,
        source: &MethodDescription,
        left: &BindingAttempt,
        right: &BindingAttempt,
        hierarchy: &dyn TypeHierarchy,
    ) -> Resolution {
        let mut resolution = Resolution::Unknown;
        for resolver in &self.resolvers {
            if !resolution.is_unresolved() {
                break;
            }
            resolution = resolver.resolve(source, left, right, hierarchy);
        }
        trace!(
            left = %left.target,
            right = %right.target,
            ?resolution,
            "ambiguity verdict"
        );
        resolution
    }
}

impl Default for AmbiguityChain {
    fn default() -> Self {
        AmbiguityChain::new(vec![AmbiguityResolver::NameEquality, AmbiguityResolver::MostSpecificType])
    }
}

/// Reduces the valid attempts of one intercepted method to exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BindingResolver {
    /// Pairwise reduction through the ambiguity chain.
    #[default]
    Default,
    /// More than one valid attempt is an error.
    Unique,
}

impl BindingResolver {
    pub fn resolve(
        &self,
        chain: &AmbiguityChain,
        source: &MethodDescription,
        attempts: Vec<BindingAttempt>,
        hierarchy: &dyn TypeHierarchy,
    ) -> Result<BindingAttempt> {
        match self {
            BindingResolver::Default => reduce(chain, source, attempts, hierarchy).map_err(|tied| {
                if tied.is_empty() {
                    no_binding(source, &[])
                } else {
                    ambiguous(source, &tied.iter().collect::<Vec<_>>())
                }
            }),
            BindingResolver::Unique => {
                if attempts.len() > 1 {
                    return Err(ambiguous(source, &attempts.iter().collect::<Vec<_>>()));
                }
                attempts
                    .into_iter()
                    .next()
                    .ok_or_else(|| no_binding(source, &[]))
            }
        }
    }
}

fn ambiguous(source: &MethodDescription, tied: &[&BindingAttempt]) -> Error {
    Error::Ambiguous {
        source_method: source.to_string(),
        candidates: tied.iter().map(|attempt| attempt.target.to_string()).collect(),
    }
}

/// Folds the attempts pairwise from the front. On failure the error holds every
/// attempt left tied, which is empty only when there were no attempts.
fn reduce(
    chain: &AmbiguityChain,
    source: &MethodDescription,
    mut attempts: Vec<BindingAttempt>,
    hierarchy: &dyn TypeHierarchy,
) -> std::result::Result<BindingAttempt, Vec<BindingAttempt>> {
    if attempts.len() <= 1 {
        return match attempts.pop() {
            Some(only) => Ok(only),
            None => Err(Vec::new()),
        };
    }
    let right = attempts.remove(1);
    let left = attempts.remove(0);
    match chain.resolve(source, &left, &right, hierarchy) {
        Resolution::Left if attempts.is_empty() => Ok(left),
        Resolution::Right if attempts.is_empty() => Ok(right),
        Resolution::Left => {
            attempts.insert(0, left);
            reduce(chain, source, attempts, hierarchy)
        }
        Resolution::Right => {
            attempts.insert(0, right);
            reduce(chain, source, attempts, hierarchy)
        }
        Resolution::Unknown | Resolution::Ambiguous if attempts.is_empty() => Err(vec![left, right]),
        Resolution::Unknown | Resolution::Ambiguous => {
            // the rest must beat both tied attempts
            let mut tied = match reduce(chain, source, attempts, hierarchy) {
                Ok(rest) => {
                    let verdict = chain
                        .resolve(source, &left, &rest, hierarchy)
                        .merge(chain.resolve(source, &right, &rest, hierarchy));
                    if verdict == Resolution::Right {
                        return Ok(rest);
                    }
                    vec![rest]
                }
                Err(tied) => tied,
            };
            // anything either tied attempt beats is out of the running
            tied.retain(|other| {
                chain.resolve(source, &left, other, hierarchy) != Resolution::Left
                    && chain.resolve(source, &right, other, hierarchy) != Resolution::Left
            });
            tied.insert(0, right);
            tied.insert(0, left);
            Err(tied)
        }
    }
}
