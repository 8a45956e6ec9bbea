//! Final pass: emit one fixed-width record per instruction.
//!
//! A record is the opcode byte followed by an 8 byte big-endian operand.
//! Opcodes without an argument still carry a zero operand so that every
//! record is exactly `INSTRUCTION_WIDTH` bytes.
use super::ast::{Argument, Program};
use super::error::Error;
use super::opcode::{self, Encoding};
use super::resolver::{Resolutions, Target};
use super::symbol::INSTRUCTION_WIDTH;

/// Append-only big-endian byte sink.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { bytes: Vec::with_capacity(capacity) }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn write_number(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn generate(program: &Program, resolutions: &Resolutions) -> Result<Vec<u8>, Error> {
    let count = program.instructions().count();
    let mut writer = ByteWriter::with_capacity(count * INSTRUCTION_WIDTH as usize);

    for (position, ins) in program.instructions() {
        let def = opcode::lookup(&ins.mnemonic)
            .ok_or_else(|| Error::UnknownMnemonic { mnemonic: ins.mnemonic.clone(), line: ins.line })?;

        let (operand, target) = match (&ins.argument, def.takes_argument) {
            (None, false) => (0, None),
            (Some(Argument::Symbol(sym)), true) => {
                let resolved = resolutions
                    .get(position)
                    .ok_or_else(|| Error::Unresolved { name: sym.name.clone(), line: ins.line })?;
                (resolved.value, Some(resolved.target))
            }
            (Some(Argument::Literal(lit)), true) => {
                let bits = lit.to_bits().map_err(|source| Error::Literal { line: ins.line, source })?;
                (bits, None)
            }
            (None, true) => {
                return Err(Error::MissingArgument { mnemonic: ins.mnemonic.clone(), line: ins.line });
            }
            (Some(_), false) => {
                return Err(Error::UnexpectedArgument { mnemonic: ins.mnemonic.clone(), line: ins.line });
            }
        };

        let byte = match def.encoding {
            Encoding::Byte(byte) => byte,
            Encoding::Call { native, .. } if target == Some(Target::Native) => native,
            // A literal call target is a raw bytecode address.
            Encoding::Call { section, .. } => section,
        };

        debug!("0x{:08X}: {} => {:02X} {:016X}", writer.len(), ins, byte, operand);
        writer.write_byte(byte);
        writer.write_number(operand);
    }

    Ok(writer.into_bytes())
}
