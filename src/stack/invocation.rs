//! Method invocation and argument loading.

use crate::assign::{Assigner, Typing};
use crate::code_attribute::{CodeSink, Instruction, PoolEntry};
use crate::description::{MethodDescription, TypeDescription};
use crate::error::{Error, Result};

use super::array::ArrayFactory;
use super::variable::load_argument;
use super::{StackEffect, StackManipulation};

/// How the call is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvocationKind {
    Static,
    Virtual,
    Interface,
    /// Non-virtual: constructors, private methods and super calls.
    Special,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInvocation {
    pub method: MethodDescription,
    pub kind: InvocationKind,
    /// The type named in the method reference, usually the declaring type.
    pub owner: TypeDescription,
}

impl MethodInvocation {
    /// Pops the receiver (if any) and the arguments, pushes the return value.
    pub fn effect(&self) -> StackEffect {
        let delta = self.method.return_type.stack_size().size() - self.method.stack_size();
        StackEffect::new(delta, delta.max(0))
    }

    pub(crate) fn emit(&self, sink: &mut dyn CodeSink) {
        let index = sink.constant(PoolEntry::MethodRef {
            owner: self.owner.internal_name(),
            name: self.method.name.clone(),
            descriptor: self.method.descriptor(),
            interface: self.kind == InvocationKind::Interface || self.method.interface,
        });
        sink.emit(match self.kind {
            InvocationKind::Static => Instruction::Invokestatic(index),
            InvocationKind::Virtual => Instruction::Invokevirtual(index),
            InvocationKind::Special => Instruction::Invokespecial(index),
            InvocationKind::Interface => Instruction::Invokeinterface {
                index,
                count: self.method.stack_size() as u8,
                reserved: 0,
            },
        });
    }
}

fn require_value_parameters(method: &MethodDescription, what: &'static str) -> Result<()> {
    match method.parameter_types.iter().position(TypeDescription::is_void) {
        Some(index) => Err(Error::construction(
            what,
            format!("parameter {} of {} is void", index, method),
        )),
        None => Ok(()),
    }
}

/// Invokes `method` with the dispatch its declaration implies.
pub fn invoke(method: &MethodDescription) -> Result<StackManipulation> {
    require_value_parameters(method, "invocation")?;
    let kind = if method.is_static() {
        InvocationKind::Static
    } else if method.is_constructor() || method.is_private() {
        InvocationKind::Special
    } else if method.interface {
        InvocationKind::Interface
    } else {
        InvocationKind::Virtual
    };
    Ok(StackManipulation::Invocation(MethodInvocation {
        method: method.clone(),
        kind,
        owner: method.declaring_type.clone(),
    }))
}

/// Invokes `method` without virtual dispatch.
pub fn invoke_special(method: &MethodDescription) -> Result<StackManipulation> {
    require_value_parameters(method, "special invocation")?;
    if method.is_static() {
        return Err(Error::construction(
            "special invocation",
            format!("{} is static", method),
        ));
    }
    if method.is_default_method() {
        return Err(Error::construction(
            "special invocation",
            format!("{} is an interface default method", method),
        ));
    }
    Ok(StackManipulation::Invocation(MethodInvocation {
        method: method.clone(),
        kind: InvocationKind::Special,
        owner: method.declaring_type.clone(),
    }))
}

/// Invokes `method` virtually against an explicit receiver type, e.g. a subtype
/// that is known to override it.
pub fn invoke_virtual_on(method: &MethodDescription, receiver: &TypeDescription) -> Result<StackManipulation> {
    require_value_parameters(method, "virtual invocation")?;
    if method.is_static() || method.is_private() || method.is_constructor() {
        return Err(Error::construction(
            "virtual invocation",
            format!("{} cannot be dispatched virtually", method),
        ));
    }
    if !matches!(receiver, TypeDescription::Reference(_)) {
        return Err(Error::construction(
            "virtual invocation",
            format!("{} is not a class type", receiver),
        ));
    }
    Ok(StackManipulation::Invocation(MethodInvocation {
        method: method.clone(),
        kind: if method.interface {
            InvocationKind::Interface
        } else {
            InvocationKind::Virtual
        },
        owner: receiver.clone(),
    }))
}

/// Loads every parameter of `method` into a fresh `Object[]`, boxing primitives.
pub fn pack_arguments(
    method: &MethodDescription,
    assigner: &dyn Assigner,
    typing: Typing,
) -> Result<StackManipulation> {
    let object = TypeDescription::object();
    let factory = ArrayFactory::new(&object)?;
    let mut values = Vec::with_capacity(method.parameter_types.len());
    for (index, parameter) in method.parameter_types.iter().enumerate() {
        let load = load_argument(method, index)?;
        values.push(load.then(assigner.assign(parameter, &object, typing)));
    }
    Ok(factory.with_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::DefaultAssigner;
    use crate::code_attribute::CodeBuffer;
    use crate::description::{ClassHierarchy, MethodModifiers};

    fn method(descriptor: &str, modifiers: MethodModifiers) -> MethodDescription {
        MethodDescription::from_descriptor("pkg/Foo", "bar", descriptor, modifiers).unwrap()
    }

    #[test]
    fn test_invocation_effect() {
        let static_method = method("(JI)D", MethodModifiers::PUBLIC | MethodModifiers::STATIC);
        let invocation = invoke(&static_method).unwrap();
        assert_eq!(invocation.effect(), StackEffect::new(-1, 0));

        let getter = method("()J", MethodModifiers::PUBLIC);
        assert_eq!(invoke(&getter).unwrap().effect(), StackEffect::new(1, 1));
    }

    #[test]
    fn test_dispatch_kinds() {
        let kind_of = |manipulation: StackManipulation| match manipulation {
            StackManipulation::Invocation(invocation) => invocation.kind,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(
            kind_of(invoke(&method("()V", MethodModifiers::STATIC)).unwrap()),
            InvocationKind::Static
        );
        assert_eq!(
            kind_of(invoke(&method("()V", MethodModifiers::PRIVATE)).unwrap()),
            InvocationKind::Special
        );
        assert_eq!(
            kind_of(invoke(&method("()V", MethodModifiers::PUBLIC).in_interface()).unwrap()),
            InvocationKind::Interface
        );
        assert_eq!(
            kind_of(invoke(&method("()V", MethodModifiers::PUBLIC)).unwrap()),
            InvocationKind::Virtual
        );
    }

    #[test]
    fn test_special_invocation_rejects_static_and_default() {
        assert!(matches!(
            invoke_special(&method("()V", MethodModifiers::STATIC)),
            Err(Error::Construction { .. })
        ));
        assert!(invoke_special(&method("()V", MethodModifiers::PUBLIC).in_interface()).is_err());
        assert!(invoke_special(&method("()V", MethodModifiers::PUBLIC)).is_ok());
    }

    #[test]
    fn test_void_parameter_is_rejected() {
        let owner = TypeDescription::reference("pkg/Foo");
        let broken = MethodDescription::new(owner.clone(), "bar", vec![TypeDescription::INT, TypeDescription::VOID], TypeDescription::VOID);
        assert!(matches!(
            invoke(&broken.clone().with_modifiers(MethodModifiers::PUBLIC | MethodModifiers::STATIC)),
            Err(Error::Construction { .. })
        ));
        assert!(matches!(invoke_special(&broken), Err(Error::Construction { .. })));
        assert!(matches!(
            invoke_virtual_on(&broken, &owner),
            Err(Error::Construction { .. })
        ));
        let message = invoke(&broken).unwrap_err().to_string();
        assert!(message.contains("parameter 1"), "{}", message);
    }

    #[test]
    fn test_interface_invocation_encodes_count() {
        let mut buffer = CodeBuffer::new();
        let target = method("(JI)V", MethodModifiers::PUBLIC | MethodModifiers::ABSTRACT).in_interface();
        invoke(&target).unwrap().apply(&mut buffer).unwrap();
        assert_eq!(
            buffer.instructions,
            vec![Instruction::Invokeinterface {
                index: 1,
                count: 4,
                reserved: 0
            }]
        );
        assert_eq!(buffer.measured_effect(), StackEffect::new(-4, 0));
    }

    #[test]
    fn test_virtual_on_explicit_receiver() {
        let target = method("()Ljava/lang/String;", MethodModifiers::PUBLIC);
        let sub = TypeDescription::reference("pkg/SubFoo");
        let mut buffer = CodeBuffer::new();
        invoke_virtual_on(&target, &sub).unwrap().apply(&mut buffer).unwrap();
        assert_eq!(
            buffer.pool.get(1),
            Some(&PoolEntry::MethodRef {
                owner: "pkg/SubFoo".into(),
                name: "bar".into(),
                descriptor: "()Ljava/lang/String;".into(),
                interface: false,
            })
        );
        assert!(invoke_virtual_on(&target, &TypeDescription::INT).is_err());
        assert!(invoke_virtual_on(&method("()V", MethodModifiers::STATIC), &sub).is_err());
    }

    #[test]
    fn test_pack_arguments_boxes_primitives() {
        let hierarchy = ClassHierarchy::with_jdk_defaults();
        let assigner = DefaultAssigner::new(&hierarchy);
        let source = method("(ILjava/lang/String;)V", MethodModifiers::PUBLIC);
        let packed = pack_arguments(&source, &assigner, Typing::Static).unwrap();
        assert!(packed.is_valid());
        assert_eq!(packed.effect().net_delta(), 1);

        let mut buffer = CodeBuffer::new();
        let declared = packed.apply(&mut buffer).unwrap();
        assert_eq!(buffer.measured_effect(), declared);
        assert_eq!(
            buffer.instructions[..6],
            [
                Instruction::Iconst2,
                Instruction::Anewarray(1),
                Instruction::Dup,
                Instruction::Iconst0,
                Instruction::Iload1,
                Instruction::Invokestatic(2),
            ]
        );
    }
}
