use std::collections::HashSet;

use tracing::trace;

use crate::assign::{Assigner, Typing};
use crate::description::{MethodDescription, TypeDescription};
use crate::stack::array::ArrayFactory;
use crate::stack::constant::{integer, text};
use crate::stack::invocation::pack_arguments;
use crate::stack::variable::{load_argument, load_receiver};
use crate::stack::StackManipulation;

use super::{
    ArgumentSource, BindingAttempt, Candidate, ConstantKind, MethodInvoker, ParameterBinding, Rejection,
    TerminationHandler,
};

/// Everything a single binding attempt needs besides the two methods.
#[derive(Clone, Copy)]
pub struct BindingContext<'a> {
    pub assigner: &'a dyn Assigner,
    /// Used when the candidate declares no typing of its own.
    pub typing: Typing,
    pub termination: TerminationHandler,
    pub invoker: &'a MethodInvoker,
}

/// Binds `candidate` against the intercepted `source` method.
///
/// The return value is checked first, then each handler parameter in declared
/// order. Declared sources bind exactly what they name. Undeclared parameters
/// claim the first intercepted argument that is neither claimed already nor
/// named by any `FixedArgument` source of this candidate, and whose type
/// converts to the parameter. The first failure rejects the whole attempt.
pub fn bind(source: &MethodDescription, candidate: &Candidate, context: &BindingContext<'_>) -> BindingAttempt {
    match try_bind(source, candidate, context) {
        Ok(attempt) => attempt,
        Err(rejection) => {
            trace!(source = %source, target = %candidate.method, %rejection, "candidate rejected");
            BindingAttempt::rejected(&candidate.method, candidate.priority, rejection)
        }
    }
}

fn try_bind(
    source: &MethodDescription,
    candidate: &Candidate,
    context: &BindingContext<'_>,
) -> Result<BindingAttempt, Rejection> {
    let target = &candidate.method;
    if candidate.ignored {
        return Err(Rejection::Ignored);
    }
    if !target.is_visible_to(&source.declaring_type) {
        return Err(Rejection::NotVisible);
    }
    if let Some(&index) = candidate.misplaced.first() {
        return Err(Rejection::UnknownParameter { index });
    }
    if let Some(index) = target.parameter_types.iter().position(TypeDescription::is_void) {
        return Err(Rejection::VoidParameter { index });
    }
    let typing = candidate.typing.unwrap_or(context.typing);
    let assigner = context.assigner;

    let termination = context.termination.resolve(assigner, typing, source, target);
    if !termination.is_valid() {
        return Err(Rejection::ReturnType {
            found: target.return_type.clone(),
            expected: source.return_type.clone(),
        });
    }

    let receiver = if target.is_static() {
        StackManipulation::Trivial
    } else {
        let load = load_receiver(source).map_err(|_| Rejection::NoReceiver)?;
        let receiver = load.then(assigner.assign(
            &source.declaring_type,
            context.invoker.receiver_type(target),
            typing,
        ));
        if !receiver.is_valid() {
            return Err(Rejection::NoReceiver);
        }
        receiver
    };

    let mut reserved = HashSet::new();
    for (index, declared) in candidate.sources.iter().enumerate() {
        if let Some(ArgumentSource::FixedArgument(argument)) = declared {
            if !reserved.insert(*argument) {
                return Err(Rejection::DuplicateArgument {
                    index,
                    argument: *argument,
                });
            }
        }
    }

    let mut claimed = HashSet::new();
    let mut plan = Vec::with_capacity(target.parameter_types.len());
    for (index, parameter_type) in target.parameter_types.iter().enumerate() {
        let declared = candidate.sources.get(index).copied().flatten();
        let rejection = || Rejection::Parameter {
            index,
            source: declared,
            parameter_type: parameter_type.clone(),
        };
        let binding = match declared {
            Some(declared) => bind_declared(source, declared, parameter_type, assigner, typing),
            None => bind_next_unclaimed(source, parameter_type, assigner, typing, &reserved, &claimed),
        }
        .filter(|binding| binding.manipulation.is_valid())
        .ok_or_else(rejection)?;
        if let Some(argument) = binding.argument {
            claimed.insert(argument);
        }
        plan.push(binding);
    }

    let invocation = context
        .invoker
        .invoke(target)
        .map_err(|e| Rejection::Invocation(e.to_string()))?;

    Ok(BindingAttempt {
        target: target.clone(),
        plan,
        priority: candidate.priority,
        receiver,
        invocation,
        termination,
        rejection: None,
    })
}

fn bind_declared(
    source: &MethodDescription,
    declared: ArgumentSource,
    parameter_type: &TypeDescription,
    assigner: &dyn Assigner,
    typing: Typing,
) -> Option<ParameterBinding> {
    let (manipulation, argument) = match declared {
        ArgumentSource::FixedArgument(argument) => {
            let argument_type = source.parameter_types.get(argument)?;
            let load = load_argument(source, argument).ok()?;
            (load.then(assigner.assign(argument_type, parameter_type, typing)), Some(argument))
        }
        ArgumentSource::Receiver => {
            let load = load_receiver(source).ok()?;
            (
                load.then(assigner.assign(&source.declaring_type, parameter_type, typing)),
                None,
            )
        }
        ArgumentSource::AllArguments => {
            let component = parameter_type.component_type()?;
            let factory = ArrayFactory::new(component).ok()?;
            let values = source
                .parameter_types
                .iter()
                .enumerate()
                .map(|(index, argument_type)| {
                    load_argument(source, index)
                        .map(|load| load.then(assigner.assign(argument_type, component, typing)))
                })
                .collect::<crate::error::Result<Vec<_>>>()
                .ok()?;
            (factory.with_values(values), None)
        }
        ArgumentSource::AllArgumentsArray => {
            let packed = pack_arguments(source, assigner, typing).ok()?;
            let objects = TypeDescription::array_of(TypeDescription::object());
            (packed.then(assigner.assign(&objects, parameter_type, typing)), None)
        }
        ArgumentSource::NamedConstant(kind) => {
            let (value, value_type) = match kind {
                ConstantKind::MethodName => (text(source.name.clone()), TypeDescription::string()),
                ConstantKind::Descriptor => (text(source.descriptor()), TypeDescription::string()),
                ConstantKind::DeclaringTypeName => {
                    (text(source.declaring_type.binary_name()), TypeDescription::string())
                }
                ConstantKind::ParameterCount => {
                    (integer(source.parameter_types.len() as i32), TypeDescription::INT)
                }
            };
            (value.then(assigner.assign(&value_type, parameter_type, typing)), None)
        }
    };
    Some(ParameterBinding {
        source: declared,
        implicit: false,
        argument,
        manipulation,
    })
}

fn bind_next_unclaimed(
    source: &MethodDescription,
    parameter_type: &TypeDescription,
    assigner: &dyn Assigner,
    typing: Typing,
    reserved: &HashSet<usize>,
    claimed: &HashSet<usize>,
) -> Option<ParameterBinding> {
    source
        .parameter_types
        .iter()
        .enumerate()
        .filter(|(argument, _)| !reserved.contains(argument) && !claimed.contains(argument))
        .find_map(|(argument, argument_type)| {
            let conversion = assigner.assign(argument_type, parameter_type, typing);
            if !conversion.is_valid() {
                return None;
            }
            let load = load_argument(source, argument).ok()?;
            Some(ParameterBinding {
                source: ArgumentSource::FixedArgument(argument),
                implicit: true,
                argument: Some(argument),
                manipulation: load.then(conversion),
            })
        })
}
