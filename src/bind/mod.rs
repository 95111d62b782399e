//! Delegation binding: deciding which handler method receives an intercepted call
//! and where each of its arguments comes from.

pub mod ambiguity;
mod binder;
mod processor;

use std::fmt;

use crate::assign::{Assigner, Typing};
use crate::description::{MethodDescription, TypeDescription};
use crate::error::{Error, Result};
use crate::stack::invocation::{invoke, invoke_virtual_on};
use crate::stack::{method_return, removal, StackManipulation};

pub use self::ambiguity::{AmbiguityChain, AmbiguityResolver, BindingResolver, Direction, Resolution};
pub use self::binder::{bind, BindingContext};
pub use self::processor::{Delegation, Processor};

/// A value derived from the intercepted method itself rather than its arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    /// The method name as a `String`.
    MethodName,
    /// The JVM descriptor as a `String`.
    Descriptor,
    /// Binary name of the declaring type as a `String`.
    DeclaringTypeName,
    /// Number of declared parameters as an `int`.
    ParameterCount,
}

/// Where a handler parameter's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgumentSource {
    /// The intercepted argument at this index.
    FixedArgument(usize),
    /// Every intercepted argument, in an array of the parameter's component type.
    AllArguments,
    /// The intercepted instance.
    Receiver,
    /// Every intercepted argument boxed into an `Object[]`.
    AllArgumentsArray,
    NamedConstant(ConstantKind),
}

impl fmt::Display for ArgumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentSource::FixedArgument(index) => write!(f, "argument {}", index),
            ArgumentSource::AllArguments => f.write_str("all arguments"),
            ArgumentSource::Receiver => f.write_str("receiver"),
            ArgumentSource::AllArgumentsArray => f.write_str("argument array"),
            ArgumentSource::NamedConstant(kind) => write!(f, "constant {:?}", kind),
        }
    }
}

/// A handler method together with how each of its parameters wants to be bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub method: MethodDescription,
    /// One entry per parameter; `None` binds the next unclaimed argument.
    pub sources: Vec<Option<ArgumentSource>>,
    /// Overrides the processor's default typing.
    pub typing: Option<Typing>,
    /// Used by [`AmbiguityResolver::BindingPriority`].
    pub priority: i32,
    /// Never bind this method.
    pub ignored: bool,
    /// Declared parameter indices the method does not have. Binding rejects
    /// the candidate while any are present.
    pub misplaced: Vec<usize>,
}

impl Candidate {
    pub fn new(method: MethodDescription) -> Self {
        let sources = vec![None; method.parameter_types.len()];
        Candidate {
            method,
            sources,
            typing: None,
            priority: 0,
            ignored: false,
            misplaced: Vec::new(),
        }
    }

    /// Declares the source of the parameter at `index`. An index past the last
    /// parameter is kept in `misplaced` and fails the binding.
    pub fn with_source(mut self, index: usize, source: ArgumentSource) -> Self {
        match self.sources.get_mut(index) {
            Some(slot) => *slot = Some(source),
            None => self.misplaced.push(index),
        }
        self
    }

    pub fn with_typing(mut self, typing: Typing) -> Self {
        self.typing = Some(typing);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

impl From<MethodDescription> for Candidate {
    fn from(method: MethodDescription) -> Self {
        Candidate::new(method)
    }
}

/// How one handler parameter is filled.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterBinding {
    pub source: ArgumentSource,
    /// The source was not declared and was picked by default.
    pub implicit: bool,
    /// Intercepted argument index this binding claims, if it claims one.
    pub argument: Option<usize>,
    /// Loads the value and converts it to the parameter type.
    pub manipulation: StackManipulation,
}

/// Why a candidate could not be bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    Ignored,
    NotVisible,
    /// A source was declared for a parameter the handler does not have.
    UnknownParameter {
        index: usize,
    },
    VoidParameter {
        index: usize,
    },
    ReturnType {
        found: TypeDescription,
        expected: TypeDescription,
    },
    NoReceiver,
    Parameter {
        index: usize,
        source: Option<ArgumentSource>,
        parameter_type: TypeDescription,
    },
    DuplicateArgument {
        index: usize,
        argument: usize,
    },
    Invocation(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Ignored => f.write_str("ignored for binding"),
            Rejection::NotVisible => f.write_str("not visible from the intercepted type"),
            Rejection::UnknownParameter { index } => {
                write!(f, "source declared for parameter {} which does not exist", index)
            }
            Rejection::VoidParameter { index } => write!(f, "parameter {} is declared void", index),
            Rejection::ReturnType { found, expected } => {
                write!(f, "return type {} cannot be assigned to {}", found, expected)
            }
            Rejection::NoReceiver => f.write_str("instance method needs a receiver, intercepted method is static"),
            Rejection::Parameter {
                index,
                source: Some(source),
                parameter_type,
            } => write!(f, "parameter {} ({}) cannot be bound from {}", index, parameter_type, source),
            Rejection::Parameter {
                index,
                source: None,
                parameter_type,
            } => write!(f, "parameter {} ({}) has no unclaimed compatible argument", index, parameter_type),
            Rejection::DuplicateArgument { index, argument } => {
                write!(f, "parameter {} binds argument {} more than once", index, argument)
            }
            Rejection::Invocation(message) => f.write_str(message),
        }
    }
}

/// The outcome of binding one candidate. Either valid, with a complete argument
/// plan, or rejected with the first reason found.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingAttempt {
    pub target: MethodDescription,
    pub plan: Vec<ParameterBinding>,
    pub priority: i32,
    /// Loads the handler's receiver; trivial for static handlers.
    pub receiver: StackManipulation,
    pub invocation: StackManipulation,
    pub termination: StackManipulation,
    pub rejection: Option<Rejection>,
}

impl BindingAttempt {
    pub(crate) fn rejected(target: &MethodDescription, priority: i32, rejection: Rejection) -> Self {
        BindingAttempt {
            target: target.clone(),
            plan: Vec::new(),
            priority,
            receiver: StackManipulation::Illegal,
            invocation: StackManipulation::Illegal,
            termination: StackManipulation::Illegal,
            rejection: Some(rejection),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
            && self.receiver.is_valid()
            && self.invocation.is_valid()
            && self.termination.is_valid()
            && self.plan.iter().all(|binding| binding.manipulation.is_valid())
    }

    /// The handler parameter that received intercepted argument `argument`.
    pub fn parameter_for_argument(&self, argument: usize) -> Option<usize> {
        self.plan.iter().position(|binding| binding.argument == Some(argument))
    }

    /// Receiver, arguments in parameter order, invocation, then termination.
    pub fn to_manipulation(&self) -> StackManipulation {
        let mut members = Vec::with_capacity(self.plan.len() + 3);
        members.push(self.receiver.clone());
        members.extend(self.plan.iter().map(|binding| binding.manipulation.clone()));
        members.push(self.invocation.clone());
        members.push(self.termination.clone());
        StackManipulation::compound(members)
    }
}

/// What happens to the handler's return value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TerminationHandler {
    /// Convert it to the intercepted return type and return it.
    #[default]
    Returning,
    /// Pop it and continue.
    Dropping,
}

impl TerminationHandler {
    pub fn resolve(
        &self,
        assigner: &dyn Assigner,
        typing: Typing,
        source: &MethodDescription,
        target: &MethodDescription,
    ) -> StackManipulation {
        match self {
            TerminationHandler::Returning => assigner
                .assign(&target.return_type, &source.return_type, typing)
                .then(method_return(&source.return_type)),
            TerminationHandler::Dropping => removal(&target.return_type),
        }
    }
}

/// How the chosen handler is called.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MethodInvoker {
    /// Dispatch as the handler's declaration implies.
    #[default]
    Simple,
    /// Dispatch virtually on the given receiver type.
    Virtual(TypeDescription),
}

impl MethodInvoker {
    pub fn invoke(&self, method: &MethodDescription) -> Result<StackManipulation> {
        match self {
            MethodInvoker::Simple => invoke(method),
            MethodInvoker::Virtual(receiver) => invoke_virtual_on(method, receiver),
        }
    }

    /// The type the handler's receiver must have.
    pub fn receiver_type<'a>(&'a self, method: &'a MethodDescription) -> &'a TypeDescription {
        match self {
            MethodInvoker::Simple => &method.declaring_type,
            MethodInvoker::Virtual(receiver) => receiver,
        }
    }
}

pub(crate) fn no_binding(source: &MethodDescription, attempts: &[BindingAttempt]) -> Error {
    Error::NoBinding {
        source_method: source.to_string(),
        rejections: attempts
            .iter()
            .map(|attempt| match &attempt.rejection {
                Some(rejection) => format!("{}: {}", attempt.target, rejection),
                None => format!("{}: produces illegal code", attempt.target),
            })
            .collect(),
    }
}
