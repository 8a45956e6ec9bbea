//! Errors produced while assembling a SLAP program.
use thiserror::Error;

/// A violated symbol invariant. These are collected by the validator
/// so that every problem in a program is reported in one run.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum SymbolError {
    #[error("no entry section: a section named `main` is required")]
    MissingEntry,

    #[error("duplicate symbol name `{0}`")]
    DuplicateName(String),

    #[error("line {line}: unknown symbol `{name}`")]
    UnknownSymbol { name: String, line: usize },

    #[error("line {line}: cannot jump to native symbol `{name}` with {mnemonic}")]
    JumpToNative { name: String, mnemonic: String, line: usize },
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum LiteralError {
    #[error("literal `{0}` does not fit in 64 bits")]
    OutOfRange(String),

    #[error("malformed literal `{0}`")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stopped assembly due to {count} syntax error(s)")]
    Syntax { count: usize },

    #[error("symbol validation failed with {} error(s)", .0.len())]
    Symbols(Vec<SymbolError>),

    #[error("line {line}: no opcode definition for mnemonic `{mnemonic}`")]
    UnknownMnemonic { mnemonic: String, line: usize },

    #[error("line {line}: {mnemonic} requires an argument")]
    MissingArgument { mnemonic: String, line: usize },

    #[error("line {line}: {mnemonic} takes no argument")]
    UnexpectedArgument { mnemonic: String, line: usize },

    #[error("line {line}: {source}")]
    Literal { line: usize, source: LiteralError },

    #[error("line {line}: reference to `{name}` was never resolved")]
    Unresolved { name: String, line: usize },
}
