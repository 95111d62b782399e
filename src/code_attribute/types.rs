use binrw::binrw;

/// JVM opcodes emitted by stack manipulations, grouped by family. Branches and
/// switches are absent since delegation bodies are straight-line code.
#[derive(Clone, Debug, Eq, PartialEq)]
#[binrw]
#[br(return_unexpected_error)]
#[brw(big)]
pub enum Instruction {
    // Constants
    #[brw(magic = 0x01u8)]
    Aconstnull,
    #[brw(magic = 0x02u8)]
    Iconstm1,
    #[brw(magic = 0x03u8)]
    Iconst0,
    #[brw(magic = 0x04u8)]
    Iconst1,
    #[brw(magic = 0x05u8)]
    Iconst2,
    #[brw(magic = 0x06u8)]
    Iconst3,
    #[brw(magic = 0x07u8)]
    Iconst4,
    #[brw(magic = 0x08u8)]
    Iconst5,
    #[brw(magic = 0x09u8)]
    Lconst0,
    #[brw(magic = 0x0au8)]
    Lconst1,
    #[brw(magic = 0x0bu8)]
    Fconst0,
    #[brw(magic = 0x0cu8)]
    Fconst1,
    #[brw(magic = 0x0du8)]
    Fconst2,
    #[brw(magic = 0x0eu8)]
    Dconst0,
    #[brw(magic = 0x0fu8)]
    Dconst1,
    #[brw(magic = 0x10u8)]
    Bipush(i8),
    #[brw(magic = 0x11u8)]
    Sipush(i16),
    #[brw(magic = 0x12u8)]
    Ldc(u8),
    #[brw(magic = 0x13u8)]
    LdcW(u16),
    #[brw(magic = 0x14u8)]
    Ldc2W(u16),

    // Local variable loads
    #[brw(magic = 0x15u8)]
    Iload(u8),
    #[brw(magic = 0x16u8)]
    Lload(u8),
    #[brw(magic = 0x17u8)]
    Fload(u8),
    #[brw(magic = 0x18u8)]
    Dload(u8),
    #[brw(magic = 0x19u8)]
    Aload(u8),
    #[brw(magic = 0x1au8)]
    Iload0,
    #[brw(magic = 0x1bu8)]
    Iload1,
    #[brw(magic = 0x1cu8)]
    Iload2,
    #[brw(magic = 0x1du8)]
    Iload3,
    #[brw(magic = 0x1eu8)]
    Lload0,
    #[brw(magic = 0x1fu8)]
    Lload1,
    #[brw(magic = 0x20u8)]
    Lload2,
    #[brw(magic = 0x21u8)]
    Lload3,
    #[brw(magic = 0x22u8)]
    Fload0,
    #[brw(magic = 0x23u8)]
    Fload1,
    #[brw(magic = 0x24u8)]
    Fload2,
    #[brw(magic = 0x25u8)]
    Fload3,
    #[brw(magic = 0x26u8)]
    Dload0,
    #[brw(magic = 0x27u8)]
    Dload1,
    #[brw(magic = 0x28u8)]
    Dload2,
    #[brw(magic = 0x29u8)]
    Dload3,
    #[brw(magic = 0x2au8)]
    Aload0,
    #[brw(magic = 0x2bu8)]
    Aload1,
    #[brw(magic = 0x2cu8)]
    Aload2,
    #[brw(magic = 0x2du8)]
    Aload3,

    // Local variable stores
    #[brw(magic = 0x36u8)]
    Istore(u8),
    #[brw(magic = 0x37u8)]
    Lstore(u8),
    #[brw(magic = 0x38u8)]
    Fstore(u8),
    #[brw(magic = 0x39u8)]
    Dstore(u8),
    #[brw(magic = 0x3au8)]
    Astore(u8),
    #[brw(magic = 0x3bu8)]
    Istore0,
    #[brw(magic = 0x3cu8)]
    Istore1,
    #[brw(magic = 0x3du8)]
    Istore2,
    #[brw(magic = 0x3eu8)]
    Istore3,
    #[brw(magic = 0x3fu8)]
    Lstore0,
    #[brw(magic = 0x40u8)]
    Lstore1,
    #[brw(magic = 0x41u8)]
    Lstore2,
    #[brw(magic = 0x42u8)]
    Lstore3,
    #[brw(magic = 0x43u8)]
    Fstore0,
    #[brw(magic = 0x44u8)]
    Fstore1,
    #[brw(magic = 0x45u8)]
    Fstore2,
    #[brw(magic = 0x46u8)]
    Fstore3,
    #[brw(magic = 0x47u8)]
    Dstore0,
    #[brw(magic = 0x48u8)]
    Dstore1,
    #[brw(magic = 0x49u8)]
    Dstore2,
    #[brw(magic = 0x4au8)]
    Dstore3,
    #[brw(magic = 0x4bu8)]
    Astore0,
    #[brw(magic = 0x4cu8)]
    Astore1,
    #[brw(magic = 0x4du8)]
    Astore2,
    #[brw(magic = 0x4eu8)]
    Astore3,

    // Array elements
    #[brw(magic = 0x2eu8)]
    Iaload,
    #[brw(magic = 0x2fu8)]
    Laload,
    #[brw(magic = 0x30u8)]
    Faload,
    #[brw(magic = 0x31u8)]
    Daload,
    #[brw(magic = 0x32u8)]
    Aaload,
    #[brw(magic = 0x33u8)]
    Baload,
    #[brw(magic = 0x34u8)]
    Caload,
    #[brw(magic = 0x35u8)]
    Saload,
    #[brw(magic = 0x4fu8)]
    Iastore,
    #[brw(magic = 0x50u8)]
    Lastore,
    #[brw(magic = 0x51u8)]
    Fastore,
    #[brw(magic = 0x52u8)]
    Dastore,
    #[brw(magic = 0x53u8)]
    Aastore,
    #[brw(magic = 0x54u8)]
    Bastore,
    #[brw(magic = 0x55u8)]
    Castore,
    #[brw(magic = 0x56u8)]
    Sastore,

    // Operand stack
    #[brw(magic = 0x57u8)]
    Pop,
    #[brw(magic = 0x58u8)]
    Pop2,
    #[brw(magic = 0x59u8)]
    Dup,
    #[brw(magic = 0x5cu8)]
    Dup2,

    // Widening conversions
    #[brw(magic = 0x85u8)]
    I2l,
    #[brw(magic = 0x86u8)]
    I2f,
    #[brw(magic = 0x87u8)]
    I2d,
    #[brw(magic = 0x89u8)]
    L2f,
    #[brw(magic = 0x8au8)]
    L2d,
    #[brw(magic = 0x8du8)]
    F2d,

    // Returns
    #[brw(magic = 0xacu8)]
    Ireturn,
    #[brw(magic = 0xadu8)]
    Lreturn,
    #[brw(magic = 0xaeu8)]
    Freturn,
    #[brw(magic = 0xafu8)]
    Dreturn,
    #[brw(magic = 0xb0u8)]
    Areturn,
    #[brw(magic = 0xb1u8)]
    Return,

    // Fields and invocations
    #[brw(magic = 0xb2u8)]
    Getstatic(u16),
    #[brw(magic = 0xb3u8)]
    Putstatic(u16),
    #[brw(magic = 0xb4u8)]
    Getfield(u16),
    #[brw(magic = 0xb5u8)]
    Putfield(u16),
    #[brw(magic = 0xb6u8)]
    Invokevirtual(u16),
    #[brw(magic = 0xb7u8)]
    Invokespecial(u16),
    #[brw(magic = 0xb8u8)]
    Invokestatic(u16),
    #[brw(magic = 0xb9u8)]
    Invokeinterface { index: u16, count: u8, reserved: u8 },

    // Objects
    #[brw(magic = 0xbbu8)]
    New(u16),
    #[brw(magic = 0xbcu8)]
    Newarray(u8),
    #[brw(magic = 0xbdu8)]
    Anewarray(u16),
    #[brw(magic = 0xbfu8)]
    Athrow,
    #[brw(magic = 0xc0u8)]
    Checkcast(u16),

    // Local variable access through the `wide` prefix
    #[brw(magic = b"\xc4\x15")]
    IloadWide(u16),
    #[brw(magic = b"\xc4\x16")]
    LloadWide(u16),
    #[brw(magic = b"\xc4\x17")]
    FloadWide(u16),
    #[brw(magic = b"\xc4\x18")]
    DloadWide(u16),
    #[brw(magic = b"\xc4\x19")]
    AloadWide(u16),
    #[brw(magic = b"\xc4\x36")]
    IstoreWide(u16),
    #[brw(magic = b"\xc4\x37")]
    LstoreWide(u16),
    #[brw(magic = b"\xc4\x38")]
    FstoreWide(u16),
    #[brw(magic = b"\xc4\x39")]
    DstoreWide(u16),
    #[brw(magic = b"\xc4\x3a")]
    AstoreWide(u16),
}
