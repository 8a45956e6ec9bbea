//! The Assembler module is in charge of taking a
//! SLAP file and producing a SLIM bytecode image.
//!
//! The lexer and parser turn source text into a Program. The
//! Program then goes through four passes, each of which must
//! succeed before the next one runs:
//!
//! 1. tabulate: collect section and native symbols
//! 2. validate: check the symbol invariants
//! 3. resolve:  lay sections out and resolve every reference
//! 4. generate: emit one 9 byte record per instruction

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod resolver;
pub mod symbol;
pub mod tabulator;
pub mod validator;

use std::io::Read;

pub use error::Error;

use ast::Program;
use symbol::{SymbolTable, INSTRUCTION_WIDTH};

/// A finished image together with the symbols it was laid out from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assembly {
    pub symbols: SymbolTable,
    pub bytes: Vec<u8>,
}

impl Assembly {
    /// The image split into `(address, record)` pairs.
    pub fn records(&self) -> impl Iterator<Item = (usize, &[u8])> {
        self.bytes
            .chunks(INSTRUCTION_WIDTH as usize)
            .enumerate()
            .map(|(idx, record)| (idx * INSTRUCTION_WIDTH as usize, record))
    }
}

/// Runs the four passes over an already parsed program.
pub fn assemble(program: &Program) -> Result<Assembly, Error> {
    info!("assembling {} declaration(s)", program.declarations.len());

    let mut symbols = tabulator::tabulate(program);

    if let Err(errors) = validator::validate(program, &symbols) {
        error!("symbol validation failed");
        return Err(Error::Symbols(errors));
    }

    let resolutions = resolver::resolve(program, &mut symbols)?;
    let bytes = codegen::generate(program, &resolutions)?;
    debug_assert_eq!(bytes.len() as u64, symbols.image_size());

    info!("assembled {} instruction(s) into {} byte(s)", bytes.len() / INSTRUCTION_WIDTH as usize, bytes.len());
    Ok(Assembly { symbols, bytes })
}

/// Lexes, parses and assembles SLAP source text.
pub fn assemble_source<R: Read>(reader: R) -> Result<Assembly, Error> {
    let tokens = lexer::tokenize(reader)?;
    let program = parser::Parser::new(tokens).run()?;
    assemble(&program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::error::SymbolError;
    use super::opcode::{CALL_NATIVE, CALL_SECTION};

    fn build(src: &str) -> Result<Assembly, Error> {
        assemble_source(src.as_bytes())
    }

    fn operand(bytes: &[u8], record: usize) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[record * 9 + 1..record * 9 + 9]);
        u64::from_be_bytes(raw)
    }

    fn symbol_errors(result: Result<Assembly, Error>) -> Vec<SymbolError> {
        match result {
            Err(Error::Symbols(errors)) => errors,
            other => panic!("expected symbol errors, got {:?}", other),
        }
    }

    #[test]
    fn test_native_call_scenario() {
        let assembly = build(
            "
            native std.putch 0x0001
            section main
                CALL std.putch
                HALT
            ",
        )
        .unwrap();

        let mut expected = vec![CALL_NATIVE, 0, 0, 0, 0, 0, 0, 0, 0x01];
        expected.extend_from_slice(&[0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(assembly.bytes, expected);
    }

    #[test]
    fn test_forward_jump_scenario() {
        let assembly = build(
            "
            section main
                JMP second
            section second
                HALT
            ",
        )
        .unwrap();

        assert_eq!(assembly.symbols.section("second").map(|s| s.byte_address), Some(9));
        assert_eq!(assembly.bytes.len(), 18);
        assert_eq!(assembly.bytes[0], 0x50);
        assert_eq!(&assembly.bytes[1..9], &[0, 0, 0, 0, 0, 0, 0, 0x09]);
        assert_eq!(assembly.bytes[9], 0x01);
    }

    #[test]
    fn test_missing_entry() {
        assert_eq!(symbol_errors(build("section start\n HALT")), vec![SymbolError::MissingEntry]);
    }

    #[test]
    fn test_duplicate_name() {
        let src = "
            native main 0x1
            section main
                HALT
        ";
        assert_eq!(symbol_errors(build(src)), vec![SymbolError::DuplicateName("main".to_owned())]);
    }

    #[test]
    fn test_jump_versus_call_on_native() {
        let jump = "
            native host 0x2
            section main
                JNE host
        ";
        assert_eq!(
            symbol_errors(build(jump)),
            vec![SymbolError::JumpToNative { name: "host".to_owned(), mnemonic: "JNE".to_owned(), line: 4 }]
        );

        let call = "
            native host 0x2
            section main
                CALL host
        ";
        let assembly = build(call).unwrap();
        assert_eq!(assembly.bytes[0], CALL_NATIVE);
        assert_eq!(operand(&assembly.bytes, 0), 2);
    }

    #[test]
    fn test_layout() {
        let src = "
            section helper
                LOADI 1
                RET
            section main
                CALL helper
                CALL tail
                LOADI 0f3.5
                LOADI 0x2A
                HALT
            section empty
            section tail
                NOOP
                RET
        ";
        let assembly = build(src).unwrap();
        let counts = [2, 5, 0, 2];

        assert_eq!(assembly.bytes.len(), 9 * counts.iter().sum::<usize>());
        let mut expected = 0;
        for (section, count) in assembly.symbols.section_symbols.iter().zip(counts.iter()) {
            assert_eq!(section.byte_address, expected);
            expected += 9 * *count as u64;
        }

        assert_eq!(assembly.bytes[18], CALL_SECTION);
        assert_eq!(operand(&assembly.bytes, 2), 0);
        assert_eq!(operand(&assembly.bytes, 3), 63);
        assert_eq!(f64::from_bits(operand(&assembly.bytes, 4)), 3.5);
        assert_eq!(operand(&assembly.bytes, 5), 42);

        let addresses: Vec<usize> = assembly.records().map(|(addr, _)| addr).collect();
        assert_eq!(addresses, vec![0, 9, 18, 27, 36, 45, 54, 63, 72]);
        assert!(assembly.records().all(|(_, record)| record.len() == 9));
    }

    #[test]
    fn test_idempotent() {
        let src = "
            native std.putch 0x0001
            section main
                LOADI 0b1000001
                CALL std.putch
                JEQ main
                HALT
        ";
        let tokens = lexer::tokenize(src.as_bytes()).unwrap();
        let program = parser::Parser::new(tokens).run().unwrap();
        let first = assemble(&program).unwrap();
        let second = assemble(&program).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_syntax_errors_stop_before_passes() {
        match build("section main\n LOADI") {
            Err(Error::Syntax { count }) => assert_eq!(count, 1),
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}
