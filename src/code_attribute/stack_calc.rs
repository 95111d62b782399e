use crate::description::{parse_method_descriptor, parse_type_descriptor};
use crate::stack::StackEffect;

use super::{ConstantPool, Instruction, PoolEntry};

/// Walks straight-line instructions and tracks stack depth, starting from an
/// empty stack. Unlike a method-level max_stack computation this does not
/// clamp negative depths: a fragment may consume values its caller pushed.
pub fn measure(instructions: &[Instruction], pool: &ConstantPool) -> StackEffect {
    let mut depth: i32 = 0;
    let mut max_depth: i32 = 0;

    for instr in instructions {
        depth += stack_delta(instr, pool);
        if depth > max_depth {
            max_depth = depth;
        }
    }

    StackEffect::new(depth, max_depth)
}

fn field_width(pool: &ConstantPool, index: u16) -> i32 {
    match pool.get(index) {
        Some(PoolEntry::FieldRef { descriptor, .. }) => parse_type_descriptor(descriptor)
            .map(|ty| ty.stack_size().size())
            .unwrap_or(1),
        _ => 1,
    }
}

/// (argument slots, return slots) of an invoked method.
fn invocation_widths(pool: &ConstantPool, index: u16) -> (i32, i32) {
    match pool.get(index) {
        Some(PoolEntry::MethodRef { descriptor, .. }) => match parse_method_descriptor(descriptor) {
            Ok((params, ret)) => (
                params.iter().map(|p| p.stack_size().size()).sum(),
                ret.stack_size().size(),
            ),
            Err(_) => (0, 0),
        },
        _ => (0, 0),
    }
}

/// Returns the net stack depth change for an instruction.
fn stack_delta(instr: &Instruction, pool: &ConstantPool) -> i32 {
    match instr {
        // Constants: push 1
        Instruction::Aconstnull
        | Instruction::Iconstm1
        | Instruction::Iconst0
        | Instruction::Iconst1
        | Instruction::Iconst2
        | Instruction::Iconst3
        | Instruction::Iconst4
        | Instruction::Iconst5
        | Instruction::Fconst0
        | Instruction::Fconst1
        | Instruction::Fconst2
        | Instruction::Bipush(_)
        | Instruction::Sipush(_)
        | Instruction::Ldc(_)
        | Instruction::LdcW(_) => 1,

        // Long/Double constants use 2 stack slots
        Instruction::Lconst0 | Instruction::Lconst1 | Instruction::Dconst0 | Instruction::Dconst1 => 2,
        Instruction::Ldc2W(_) => 2,

        // Loads: push 1 (or 2 for long/double)
        Instruction::Iload(_)
        | Instruction::Iload0
        | Instruction::Iload1
        | Instruction::Iload2
        | Instruction::Iload3
        | Instruction::Fload(_)
        | Instruction::Fload0
        | Instruction::Fload1
        | Instruction::Fload2
        | Instruction::Fload3
        | Instruction::Aload(_)
        | Instruction::Aload0
        | Instruction::Aload1
        | Instruction::Aload2
        | Instruction::Aload3
        | Instruction::IloadWide(_)
        | Instruction::FloadWide(_)
        | Instruction::AloadWide(_) => 1,

        Instruction::Lload(_)
        | Instruction::Lload0
        | Instruction::Lload1
        | Instruction::Lload2
        | Instruction::Lload3
        | Instruction::Dload(_)
        | Instruction::Dload0
        | Instruction::Dload1
        | Instruction::Dload2
        | Instruction::Dload3
        | Instruction::LloadWide(_)
        | Instruction::DloadWide(_) => 2,

        // Array loads: pop 2 (arrayref + index), push 1 (or 2)
        Instruction::Iaload
        | Instruction::Faload
        | Instruction::Aaload
        | Instruction::Baload
        | Instruction::Caload
        | Instruction::Saload => -1,

        Instruction::Laload | Instruction::Daload => 0,

        // Stores: pop 1 (or 2 for long/double)
        Instruction::Istore(_)
        | Instruction::Istore0
        | Instruction::Istore1
        | Instruction::Istore2
        | Instruction::Istore3
        | Instruction::Fstore(_)
        | Instruction::Fstore0
        | Instruction::Fstore1
        | Instruction::Fstore2
        | Instruction::Fstore3
        | Instruction::Astore(_)
        | Instruction::Astore0
        | Instruction::Astore1
        | Instruction::Astore2
        | Instruction::Astore3
        | Instruction::IstoreWide(_)
        | Instruction::FstoreWide(_)
        | Instruction::AstoreWide(_) => -1,

        Instruction::Lstore(_)
        | Instruction::Lstore0
        | Instruction::Lstore1
        | Instruction::Lstore2
        | Instruction::Lstore3
        | Instruction::Dstore(_)
        | Instruction::Dstore0
        | Instruction::Dstore1
        | Instruction::Dstore2
        | Instruction::Dstore3
        | Instruction::LstoreWide(_)
        | Instruction::DstoreWide(_) => -2,

        // Array stores: pop arrayref + index + value
        Instruction::Iastore
        | Instruction::Fastore
        | Instruction::Aastore
        | Instruction::Bastore
        | Instruction::Castore
        | Instruction::Sastore => -3,

        Instruction::Lastore | Instruction::Dastore => -4,

        Instruction::Pop => -1,
        Instruction::Pop2 => -2,
        Instruction::Dup => 1,
        Instruction::Dup2 => 2,

        // Widening conversions
        Instruction::I2l | Instruction::I2d | Instruction::F2d => 1,
        Instruction::L2f => -1,
        Instruction::I2f | Instruction::L2d => 0,

        Instruction::Return => 0,
        Instruction::Ireturn | Instruction::Freturn | Instruction::Areturn => -1,
        Instruction::Lreturn | Instruction::Dreturn => -2,

        Instruction::Getstatic(index) => field_width(pool, *index),
        Instruction::Putstatic(index) => -field_width(pool, *index),
        Instruction::Getfield(index) => field_width(pool, *index) - 1,
        Instruction::Putfield(index) => -field_width(pool, *index) - 1,

        Instruction::Invokestatic(index) => {
            let (args, ret) = invocation_widths(pool, *index);
            ret - args
        }
        Instruction::Invokevirtual(index) | Instruction::Invokespecial(index) => {
            let (args, ret) = invocation_widths(pool, *index);
            ret - args - 1
        }
        Instruction::Invokeinterface { index, .. } => {
            let (args, ret) = invocation_widths(pool, *index);
            ret - args - 1
        }

        Instruction::New(_) => 1,
        Instruction::Newarray(_) | Instruction::Anewarray(_) => 0, // pop count, push arrayref
        Instruction::Athrow => -1,
        Instruction::Checkcast(_) => 0,
    }
}
