//! Second pass: check the symbol invariants before anything is resolved.
//!
//! Structural checks look at the table alone; reference checks walk every
//! instruction argument that names a symbol. All checks run and every
//! failure is collected, so one run reports every problem in the program.
use std::collections::HashMap;

use super::ast::{Argument, Program};
use super::error::SymbolError;
use super::opcode;
use super::symbol::{Symbol, SymbolTable};

pub const ENTRY_SECTION: &str = "main";

pub fn validate(program: &Program, table: &SymbolTable) -> Result<(), Vec<SymbolError>> {
    let mut errors = structural(table);
    errors.extend(references(program, table));

    for e in errors.iter() {
        error!("{}", e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn structural(table: &SymbolTable) -> Vec<SymbolError> {
    let mut errors = Vec::new();

    if table.section(ENTRY_SECTION).is_none() {
        errors.push(SymbolError::MissingEntry);
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for name in table.names() {
        let count = occurrences.entry(name).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(name);
        }
    }
    errors.extend(order.into_iter().map(|name| SymbolError::DuplicateName(name.to_owned())));

    errors
}

fn references(program: &Program, table: &SymbolTable) -> Vec<SymbolError> {
    let mut errors = Vec::new();

    for (_, ins) in program.instructions() {
        let sym = match &ins.argument {
            Some(Argument::Symbol(sym)) => sym,
            _ => continue,
        };

        match table.lookup(&sym.name) {
            None => errors.push(SymbolError::UnknownSymbol { name: sym.name.clone(), line: ins.line }),
            Some(Symbol::Native(_)) if is_jump(&ins.mnemonic) => errors.push(SymbolError::JumpToNative {
                name: sym.name.clone(),
                mnemonic: ins.mnemonic.clone(),
                line: ins.line,
            }),
            Some(_) => {}
        }
    }

    errors
}

fn is_jump(mnemonic: &str) -> bool {
    opcode::lookup(mnemonic).map(|def| def.jump).unwrap_or(false)
}
