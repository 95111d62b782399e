extern crate bytecode_bind;

use pretty_assertions::assert_eq;

use bytecode_bind::assign::{DefaultAssigner, Typing};
use bytecode_bind::bind::{ArgumentSource, Candidate, Processor};
use bytecode_bind::code_attribute::{decode, measure, CodeBuffer, Instruction};
use bytecode_bind::description::{ClassHierarchy, MethodDescription, MethodModifiers, TypeDescription};
use bytecode_bind::stack::invocation::pack_arguments;
use bytecode_bind::stack::member::field_access;
use bytecode_bind::stack::{constant, method_return, ArrayFactory, FieldOperation, StackEffect, StackManipulation};
use bytecode_bind::DelegationOptions;

fn method(descriptor: &str) -> MethodDescription {
    MethodDescription::from_descriptor("pkg/Foo", "bar", descriptor, MethodModifiers::PUBLIC).unwrap()
}

#[test]
fn test_delegation_body_round_trips() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = method("(DLjava/lang/String;)D");
    let handler = MethodDescription::from_descriptor(
        "pkg/Handler",
        "h",
        "(Ljava/lang/String;D)D",
        MethodModifiers::PUBLIC | MethodModifiers::STATIC,
    )
    .unwrap();
    let candidate = Candidate::new(handler).with_source(0, ArgumentSource::FixedArgument(1));
    let delegation = processor.process(&source, &[candidate]).unwrap();

    let mut code = CodeBuffer::new();
    delegation.apply(&mut code).unwrap();
    assert_eq!(
        code.instructions,
        vec![
            Instruction::Aload3,
            Instruction::Dload1,
            Instruction::Invokestatic(1),
            Instruction::Dreturn,
        ]
    );

    let bytes = code.encode().unwrap();
    assert_eq!(bytes, vec![0x2d, 0x27, 0xb8, 0x00, 0x01, 0xaf]);
    assert_eq!(decode(&bytes).unwrap(), code.instructions);
    assert_eq!(measure(&decode(&bytes).unwrap(), &code.pool), delegation.effect);
    assert_eq!(delegation.effect, StackEffect::new(0, 3));
    assert_eq!(delegation.max_locals, 4);
}

#[test]
fn test_packed_arguments_measure_as_declared() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let assigner = DefaultAssigner::new(&hierarchy);
    let source = method("(JZLjava/lang/String;D)V");
    let packed = pack_arguments(&source, &assigner, Typing::Static).unwrap();

    let mut code = CodeBuffer::new();
    let declared = packed.apply(&mut code).unwrap();
    assert_eq!(code.measured_effect(), declared);
    assert_eq!(declared, StackEffect::new(1, 5));
    assert_eq!(decode(&code.encode().unwrap()).unwrap(), code.instructions);
}

#[test]
fn test_wide_pool_indices() {
    let factory = ArrayFactory::new(&TypeDescription::string()).unwrap();
    let values = (0..300)
        .map(|i| constant::text(format!("s{}", i)))
        .collect::<Vec<_>>();
    let array = factory
        .with_values(values)
        .then(method_return(&TypeDescription::array_of(TypeDescription::string())));

    let mut code = CodeBuffer::new();
    let declared = array.apply(&mut code).unwrap();
    assert_eq!(code.measured_effect(), declared);
    assert!(code.instructions.contains(&Instruction::LdcW(300)));
    assert_eq!(decode(&code.encode().unwrap()).unwrap(), code.instructions);
}

#[test]
fn test_field_widths_follow_descriptor() {
    let owner = TypeDescription::reference("pkg/Foo");
    let read = field_access(&owner, "total", &TypeDescription::LONG, true, FieldOperation::Get).unwrap();
    let write = field_access(&owner, "total", &TypeDescription::LONG, false, FieldOperation::Put).unwrap();
    let body = StackManipulation::compound([
        bytecode_bind::stack::variable::load(&owner, 0).unwrap(),
        read,
        write,
    ]);
    assert_eq!(body.effect(), StackEffect::new(0, 3));

    let mut code = CodeBuffer::new();
    body.apply(&mut code).unwrap();
    assert_eq!(
        code.instructions,
        vec![Instruction::Aload0, Instruction::Getstatic(1), Instruction::Putfield(1)]
    );
    assert_eq!(code.measured_effect(), body.effect());
}
