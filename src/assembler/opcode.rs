//! The opcode table for the SL stack machine.
//!
//! Every mnemonic maps to a single byte, except `CALL`, whose byte
//! depends on what kind of symbol the call lands on.

/// How an opcode is turned into its leading byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Encoding {
    Byte(u8),
    /// Calls into bytecode and calls to host routines are distinct
    /// operations that share a mnemonic.
    Call { section: u8, native: u8 },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OpcodeDefinition {
    pub mnemonic: &'static str,
    pub encoding: Encoding,
    pub takes_argument: bool,
    /// Conditional and unconditional jumps may only target sections.
    pub jump: bool,
}

pub const CALL_SECTION: u8 = 0x60;
pub const CALL_NATIVE: u8 = 0x62;

const fn op(mnemonic: &'static str, byte: u8, takes_argument: bool) -> OpcodeDefinition {
    OpcodeDefinition { mnemonic, encoding: Encoding::Byte(byte), takes_argument, jump: false }
}

const fn jump(mnemonic: &'static str, byte: u8) -> OpcodeDefinition {
    OpcodeDefinition { mnemonic, encoding: Encoding::Byte(byte), takes_argument: true, jump: true }
}

static OPCODES: [OpcodeDefinition; 31] = [
    op("NOOP",   0x00, false),
    op("HALT",   0x01, false),
    op("LOADI",  0x10, true),
    op("LOADR",  0x11, true),
    op("LOADM",  0x12, true),
    op("DROP",   0x13, false),
    op("STORER", 0x14, true),
    op("STOREM", 0x15, false),
    op("DUP",    0x20, false),
    op("SWAP",   0x21, false),
    op("ROT",    0x22, false),
    op("ADD",    0x30, false),
    op("SUB",    0x31, false),
    op("MUL",    0x32, false),
    op("DIV",    0x33, false),
    op("MOD",    0x34, false),
    op("ADDF",   0x35, false),
    op("SUBF",   0x36, false),
    op("MULF",   0x37, false),
    op("DIVF",   0x38, false),
    op("MODF",   0x39, false),
    op("ALLOC",  0x40, true),
    op("FREE",   0x41, false),
    jump("JMP",  0x50),
    jump("JNE",  0x51),
    jump("JEQ",  0x52),
    op("RET",    0x53, false),
    OpcodeDefinition {
        mnemonic: "CALL",
        encoding: Encoding::Call { section: CALL_SECTION, native: CALL_NATIVE },
        takes_argument: true,
        jump: false,
    },
    op("FTOI",   0x70, false),
    op("ITOF",   0x71, false),
    op("ITOC",   0x72, false),
];

/// Looks up a mnemonic. Mnemonics are case-insensitive.
pub fn lookup(mnemonic: &str) -> Option<&'static OpcodeDefinition> {
    OPCODES.iter().find(|def| def.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// Reverse lookup used by listings: the mnemonic that emits `byte`.
/// The two call bytes are reported as `CALL` and `CALLN`.
pub fn mnemonic_of(byte: u8) -> Option<&'static str> {
    match byte {
        CALL_SECTION => Some("CALL"),
        CALL_NATIVE => Some("CALLN"),
        _ => OPCODES.iter().find_map(|def| match def.encoding {
            Encoding::Byte(b) if b == byte => Some(def.mnemonic),
            _ => None,
        }),
    }
}
