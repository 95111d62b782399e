extern crate bytecode_bind;

use pretty_assertions::assert_eq;

use bytecode_bind::assign::{Typing, VoidPolicy};
use bytecode_bind::bind::{
    ArgumentSource, BindingResolver, Candidate, ConstantKind, Delegation, Processor, TerminationHandler,
};
use bytecode_bind::code_attribute::{CodeBuffer, Instruction, PoolEntry};
use bytecode_bind::description::{ClassHierarchy, MethodDescription, MethodModifiers, TypeDescription};
use bytecode_bind::stack::StackEffect;
use bytecode_bind::{DelegationOptions, Error};

// --- Test helpers ---

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn intercepted(descriptor: &str) -> MethodDescription {
    MethodDescription::from_descriptor("pkg/Foo", "bar", descriptor, MethodModifiers::PUBLIC).unwrap()
}

fn handler(name: &str, descriptor: &str) -> MethodDescription {
    MethodDescription::from_descriptor(
        "pkg/Handler",
        name,
        descriptor,
        MethodModifiers::PUBLIC | MethodModifiers::STATIC,
    )
    .unwrap()
}

fn emit(delegation: &Delegation) -> CodeBuffer {
    let mut code = CodeBuffer::new();
    let effect = delegation.apply(&mut code).unwrap();
    assert_eq!(effect, delegation.effect);
    assert_eq!(code.measured_effect(), delegation.effect);
    code
}

// --- Tests ---

#[test]
fn test_dynamic_unboxing_of_handler_result() {
    init_tracing();
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let options = DelegationOptions::default().typing(Typing::Dynamic);
    let processor = Processor::new(&hierarchy, options);

    let source = intercepted("(I)I");
    let candidate = Candidate::new(handler("h", "(I)Ljava/lang/Object;")).with_source(0, ArgumentSource::FixedArgument(0));
    let delegation = processor.process(&source, &[candidate]).unwrap();

    let code = emit(&delegation);
    assert_eq!(
        code.instructions,
        vec![
            Instruction::Iload1,
            Instruction::Invokestatic(1),
            Instruction::Checkcast(2),
            Instruction::Invokevirtual(3),
            Instruction::Ireturn,
        ]
    );
    assert_eq!(code.pool.get(2), Some(&PoolEntry::Class("java/lang/Integer".into())));
    assert_eq!(
        code.pool.get(3),
        Some(&PoolEntry::MethodRef {
            owner: "java/lang/Integer".into(),
            name: "intValue".into(),
            descriptor: "()I".into(),
            interface: false,
        })
    );
    assert_eq!(delegation.effect, StackEffect::new(0, 1));
    assert_eq!(delegation.max_stack, 1);
    assert_eq!(delegation.max_locals, 2);
}

#[test]
fn test_static_typing_refuses_downcast() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(I)I");
    let candidate = Candidate::new(handler("h", "(I)Ljava/lang/Object;"));
    let err = processor.process(&source, &[candidate]).unwrap_err();
    assert!(matches!(err, Error::NoBinding { .. }));
    assert!(err.to_string().contains("return type java.lang.Object"));
}

#[test]
fn test_undeclared_parameters_claim_arguments_in_order() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(Ljava/lang/String;Ljava/lang/String;)V");

    let candidate = Candidate::new(handler("h", "(Ljava/lang/String;Ljava/lang/String;)V"));
    let delegation = processor.process(&source, &[candidate]).unwrap();
    let arguments: Vec<Option<usize>> = delegation.plan.iter().map(|binding| binding.argument).collect();
    assert_eq!(arguments, vec![Some(0), Some(1)]);
    assert!(delegation.plan.iter().all(|binding| binding.implicit));

    let code = emit(&delegation);
    assert_eq!(
        code.instructions,
        vec![
            Instruction::Aload1,
            Instruction::Aload2,
            Instruction::Invokestatic(1),
            Instruction::Return,
        ]
    );
}

#[test]
fn test_explicit_argument_is_reserved() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(Ljava/lang/String;Ljava/lang/String;)V");

    let candidate = Candidate::new(handler("h", "(Ljava/lang/String;Ljava/lang/String;)V"))
        .with_source(1, ArgumentSource::FixedArgument(0));
    let delegation = processor.process(&source, &[candidate]).unwrap();
    let code = emit(&delegation);
    assert_eq!(&code.instructions[..2], &[Instruction::Aload2, Instruction::Aload1]);
}

#[test]
fn test_most_specific_handler_wins() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(Ljava/lang/String;)V");

    let candidates = vec![
        Candidate::new(handler("general", "(Ljava/lang/Object;)V")),
        Candidate::new(handler("specific", "(Ljava/lang/String;)V")),
    ];
    let delegation = processor.process(&source, &candidates).unwrap();
    assert_eq!(delegation.target.name, "specific");
}

#[test]
fn test_unrelated_interfaces_are_ambiguous() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(Ljava/lang/String;)V");

    let candidates = vec![
        Candidate::new(handler("serializable", "(Ljava/io/Serializable;)V")),
        Candidate::new(handler("comparable", "(Ljava/lang/Comparable;)V")),
    ];
    let err = processor.process(&source, &candidates).unwrap_err();
    assert!(err.is_user_facing());
    match err {
        Error::Ambiguous { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates[0].contains("serializable"));
            assert!(candidates[1].contains("comparable"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_ambiguity_names_every_tied_handler() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(Ljava/lang/String;)V");

    let candidates = vec![
        Candidate::new(handler("serializable", "(Ljava/io/Serializable;)V")),
        Candidate::new(handler("comparable", "(Ljava/lang/Comparable;)V")),
        Candidate::new(handler("chars", "(Ljava/lang/CharSequence;)V")),
        Candidate::new(handler("general", "(Ljava/lang/Object;)V")),
    ];
    match processor.process(&source, &candidates).unwrap_err() {
        Error::Ambiguous { candidates, .. } => {
            assert_eq!(candidates.len(), 3);
            assert!(candidates[0].contains("serializable"));
            assert!(candidates[1].contains("comparable"));
            assert!(candidates[2].contains("chars"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unique_resolver_rejects_second_valid_binding() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let options = DelegationOptions::default().binding_resolver(BindingResolver::Unique);
    let processor = Processor::new(&hierarchy, options);
    let source = intercepted("(Ljava/lang/String;)V");

    let candidates = vec![
        Candidate::new(handler("general", "(Ljava/lang/Object;)V")),
        Candidate::new(handler("specific", "(Ljava/lang/String;)V")),
    ];
    assert!(matches!(
        processor.process(&source, &candidates),
        Err(Error::Ambiguous { .. })
    ));
    assert!(processor.process(&source, &candidates[1..]).is_ok());
}

#[test]
fn test_processing_is_deterministic() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default().typing(Typing::Dynamic));
    let source = intercepted("(JLjava/lang/Object;)J");
    let candidates = vec![
        Candidate::new(handler("a", "(JLjava/lang/String;)J")),
        Candidate::new(handler("b", "(Ljava/lang/Object;J)Ljava/lang/Long;"))
            .with_source(0, ArgumentSource::FixedArgument(1))
            .with_source(1, ArgumentSource::FixedArgument(0)),
    ];

    let first = processor.process(&source, &candidates).unwrap();
    let second = processor.process(&source, &candidates).unwrap();
    assert_eq!(first, second);
    assert_eq!(emit(&first).instructions, emit(&second).instructions);
}

#[test]
fn test_dropping_termination_discards_result() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let options = DelegationOptions::default().termination(TerminationHandler::Dropping);
    let processor = Processor::new(&hierarchy, options);
    let source = intercepted("(I)V");

    let delegation = processor
        .process(&source, &[Candidate::new(handler("h", "(I)J"))])
        .unwrap();
    let code = emit(&delegation);
    assert_eq!(
        code.instructions,
        vec![Instruction::Iload1, Instruction::Invokestatic(1), Instruction::Pop2]
    );
    assert_eq!(delegation.effect, StackEffect::new(0, 2));
}

#[test]
fn test_void_handler_needs_default_value_policy() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let source = intercepted("()I");
    let candidates = [Candidate::new(handler("h", "()V"))];

    let strict = Processor::new(&hierarchy, DelegationOptions::default());
    assert!(matches!(
        strict.process(&source, &candidates),
        Err(Error::NoBinding { .. })
    ));

    let lenient = Processor::new(
        &hierarchy,
        DelegationOptions::default().void_policy(VoidPolicy::DefaultValue),
    );
    let delegation = lenient.process(&source, &candidates).unwrap();
    let code = emit(&delegation);
    assert_eq!(
        code.instructions,
        vec![Instruction::Invokestatic(1), Instruction::Iconst0, Instruction::Ireturn]
    );
}

#[test]
fn test_void_parameter_handler_is_never_bound() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default().typing(Typing::Dynamic));
    let source = intercepted("(I)V");
    let broken = MethodDescription::new(
        TypeDescription::reference("pkg/Handler"),
        "h",
        vec![TypeDescription::VOID],
        TypeDescription::VOID,
    )
    .with_modifiers(MethodModifiers::PUBLIC | MethodModifiers::STATIC);

    let err = processor.process(&source, &[Candidate::new(broken)]).unwrap_err();
    match err {
        Error::NoBinding { rejections, .. } => {
            assert_eq!(rejections.len(), 1);
            assert!(rejections[0].contains("parameter 0 is declared void"), "{}", rejections[0]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_argument_array_and_constants() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let source = intercepted("(IJ)V");

    let candidate = Candidate::new(handler("h", "(Ljava/lang/String;[Ljava/lang/Object;)V"))
        .with_source(
            0,
            ArgumentSource::NamedConstant(ConstantKind::MethodName),
        )
        .with_source(1, ArgumentSource::AllArgumentsArray);
    let delegation = processor.process(&source, &[candidate]).unwrap();
    let code = emit(&delegation);
    assert_eq!(code.instructions[0], Instruction::Ldc(1));
    assert_eq!(code.pool.get(1), Some(&PoolEntry::String("bar".into())));
    // name, array, dup, index, then a long before boxing
    assert_eq!(delegation.max_stack, 6);
}

#[test]
fn test_bridge_candidate_is_routed_to_target() {
    let hierarchy = ClassHierarchy::with_jdk_defaults();
    let source =
        MethodDescription::from_descriptor("pkg/Box", "get", "()Ljava/lang/Object;", MethodModifiers::PUBLIC).unwrap();
    let bridge = MethodDescription::from_descriptor(
        "pkg/Box",
        "get",
        "()Ljava/lang/Object;",
        MethodModifiers::PUBLIC | MethodModifiers::BRIDGE | MethodModifiers::SYNTHETIC,
    )
    .unwrap();
    let concrete =
        MethodDescription::from_descriptor("pkg/Box", "get", "()Ljava/lang/String;", MethodModifiers::PUBLIC).unwrap();

    let processor = Processor::new(&hierarchy, DelegationOptions::default());
    let bridges = processor.index_bridges(&[bridge.clone(), concrete.clone()]).unwrap();
    let processor = processor.with_bridges(bridges);

    let delegation = processor.process(&source, &[Candidate::new(bridge)]).unwrap();
    assert_eq!(delegation.target, concrete);
    let code = emit(&delegation);
    assert_eq!(
        code.instructions,
        vec![Instruction::Aload0, Instruction::Invokevirtual(1), Instruction::Areturn]
    );
    assert_eq!(
        code.pool.get(1),
        Some(&PoolEntry::MethodRef {
            owner: "pkg/Box".into(),
            name: "get".into(),
            descriptor: "()Ljava/lang/String;".into(),
            interface: false,
        })
    );
}
