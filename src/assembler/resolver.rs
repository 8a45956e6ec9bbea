//! Third pass: give every section its address and every symbol reference
//! its value.
//!
//! Sections referenced by instructions resolve to their byte address in the
//! image. Natives are not part of the image, so they resolve to the
//! identifier the executor uses to find the host routine.
use std::collections::HashMap;

use super::ast::{Argument, Position, Program};
use super::error::Error;
use super::symbol::{Symbol, SymbolTable};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Target {
    Section,
    Native,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Resolved {
    pub value: u64,
    pub target: Target,
}

/// Resolved values keyed by the position of the referencing instruction.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Resolutions {
    values: HashMap<Position, Resolved>,
}

impl Resolutions {
    pub fn get(&self, position: Position) -> Option<Resolved> {
        self.values.get(&position).copied()
    }

    pub fn insert(&mut self, position: Position, resolved: Resolved) {
        self.values.insert(position, resolved);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn resolve(program: &Program, table: &mut SymbolTable) -> Result<Resolutions, Error> {
    table.calculate_addresses();
    let table: &SymbolTable = table;

    let mut resolutions = Resolutions::default();
    for (position, ins) in program.instructions() {
        let sym = match &ins.argument {
            Some(Argument::Symbol(sym)) => sym,
            _ => continue,
        };

        let symbol = table
            .lookup(&sym.name)
            .ok_or_else(|| Error::Unresolved { name: sym.name.clone(), line: ins.line })?;
        let target = match symbol {
            Symbol::Section(_) => Target::Section,
            Symbol::Native(_) => Target::Native,
        };
        let value = symbol.value();

        info!("resolved symbol '{}' to address 0x{:08X}", sym.name, value);
        resolutions.insert(position, Resolved { value, target });
    }

    Ok(resolutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ast::{Declaration, Instruction, Native, Section, SymbolRef};
    use super::super::tabulator::tabulate;

    fn ins(mnemonic: &str, target: Option<&str>) -> Instruction {
        Instruction {
            mnemonic: mnemonic.to_owned(),
            argument: target.map(|t| Argument::Symbol(SymbolRef::new(t))),
            line: 0,
        }
    }

    fn section(name: &str, instructions: Vec<Instruction>) -> Declaration {
        Declaration::Section(Section { name: name.to_owned(), instructions, line: 0 })
    }

    #[test]
    fn test_resolve() {
        let program = Program::new(vec![
            section("main", vec![ins("JMP", Some("second")), ins("CALL", Some("std.putch"))]),
            Declaration::Native(Native { name: "std.putch".to_owned(), identifier: 0x0001, line: 0 }),
            section("second", vec![ins("JEQ", Some("main")), ins("HALT", None), ins("NOOP", None)]),
            section("third", vec![ins("CALL", Some("third"))]),
        ]);
        let mut table = tabulate(&program);
        let resolutions = resolve(&program, &mut table).unwrap();

        let addresses: Vec<u64> = table.section_symbols.iter().map(|s| s.byte_address).collect();
        assert_eq!(addresses, vec![0, 18, 45]);

        let at = |declaration, instruction| resolutions.get(Position { declaration, instruction });
        assert_eq!(at(0, 0), Some(Resolved { value: 18, target: Target::Section }));
        assert_eq!(at(0, 1), Some(Resolved { value: 1, target: Target::Native }));
        assert_eq!(at(2, 0), Some(Resolved { value: 0, target: Target::Section }));
        assert_eq!(at(2, 1), None);
        assert_eq!(at(3, 0), Some(Resolved { value: 45, target: Target::Section }));
        assert_eq!(resolutions.len(), 4);
    }

    #[test]
    fn test_unresolved() {
        let program = Program::new(vec![section("main", vec![ins("CALL", Some("ghost"))])]);
        let mut table = tabulate(&program);
        match resolve(&program, &mut table) {
            Err(Error::Unresolved { name, .. }) => assert_eq!(name, "ghost"),
            other => panic!("expected an unresolved reference, got {:?}", other),
        }
    }
}
