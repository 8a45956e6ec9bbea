//! This AST describes a parsed SLAP file.
//!
//! A program is a flat list of declarations. Sections hold the
//! instructions, natives bind a name to a host routine identifier.
//! Comments are prefixed with semicolons (;) and are single-line only.
//! Instructions are delimited by newlines.
//!
//! Example source file:
//!
//! ```nasm
//! native std.putch 0x0001   ; host routine #1
//!
//! section main
//!     LOADI 0x2A            ; Inputs may be in decimal, hex or binary
//!     LOADI 0f3.5           ; or a float, stored as IEEE-754 bits
//!     DROP
//!     CALL std.putch
//!     JMP done              ; Sections may be referenced before they are declared
//!
//! section done
//!     HALT
//! ```
use std::fmt;
use std::num::IntErrorKind;

use super::error::LiteralError;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Program {
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Program { declarations }
    }

    /// Every instruction in emission order, paired with its position.
    pub fn instructions(&self) -> impl Iterator<Item = (Position, &Instruction)> {
        self.declarations
            .iter()
            .enumerate()
            .filter_map(|(declaration, decl)| match decl {
                Declaration::Section(section) => Some((declaration, section)),
                Declaration::Native(_) => None,
            })
            .flat_map(|(declaration, section)| {
                section.instructions.iter().enumerate().map(move |(instruction, ins)| {
                    (Position { declaration, instruction }, ins)
                })
            })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Declaration {
    Section(Section),
    Native(Native),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Section(section) => &section.name,
            Declaration::Native(native) => &native.name,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Section {
    pub name: String,
    pub instructions: Vec<Instruction>,
    pub line: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Native {
    pub name: String,
    pub identifier: u32,
    pub line: usize,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Instruction {
    pub mnemonic: String,
    pub argument: Option<Argument>,
    pub line: usize,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.argument {
            Some(arg) => write!(f, "{} {}", self.mnemonic, arg),
            None => write!(f, "{}", self.mnemonic),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Argument {
    Symbol(SymbolRef),
    Literal(Literal),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Argument::Symbol(sym) => write!(f, "{}", sym.name),
            Argument::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

/// A use of a label as an instruction argument.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolRef {
    pub name: String,
}

impl SymbolRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        SymbolRef { name: name.into() }
    }
}

/// A numeric literal, kept as written (prefix included) until it is
/// encoded.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Literal {
    Decimal(String),
    Hex(String),
    Binary(String),
    Float(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Decimal(s) | Literal::Hex(s) | Literal::Binary(s) | Literal::Float(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl Literal {
    /// The 64-bit operand this literal encodes to.
    ///
    /// Integers are reinterpreted as unsigned (negative decimals become
    /// their two's complement). Floats are parsed as an IEEE-754 double
    /// and their bit pattern is returned.
    pub fn to_bits(&self) -> Result<u64, LiteralError> {
        match self {
            Literal::Decimal(s) => {
                let parsed = if s.starts_with('-') {
                    s.parse::<i64>().map(|v| v as u64)
                } else {
                    s.parse::<u64>()
                };
                parsed.map_err(|e| int_error(s, e.kind()))
            }
            Literal::Hex(s) => radix(s, 16),
            Literal::Binary(s) => radix(s, 2),
            Literal::Float(s) => match prefixed(s).parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value.to_bits()),
                Ok(_) => Err(LiteralError::OutOfRange(s.clone())),
                Err(_) => Err(LiteralError::Malformed(s.clone())),
            },
        }
    }
}

/// Strips a two character radix prefix (`0x`, `0b`, `0f`).
fn prefixed(s: &str) -> &str {
    s.get(2..).unwrap_or("")
}

fn radix(s: &str, radix: u32) -> Result<u64, LiteralError> {
    u64::from_str_radix(prefixed(s), radix).map_err(|e| int_error(s, e.kind()))
}

fn int_error(s: &str, kind: &IntErrorKind) -> LiteralError {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => LiteralError::OutOfRange(s.to_owned()),
        _ => LiteralError::Malformed(s.to_owned()),
    }
}

/// Identifies an instruction, and so its argument, within a program.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Position {
    pub declaration: usize,
    pub instruction: usize,
}
