//! First pass: collect every declared symbol.
use super::ast::{Declaration, Program};
use super::symbol::{NativeSymbol, SectionSymbol, SymbolTable};

/// Walks the declarations once, in order. Addresses are left at zero
/// because they depend on the size of every earlier section.
pub fn tabulate(program: &Program) -> SymbolTable {
    let mut table = SymbolTable::new();

    for decl in program.declarations.iter() {
        match decl {
            Declaration::Section(section) => {
                let symbol = SectionSymbol {
                    name: section.name.clone(),
                    declaration_index: table.section_symbols.len(),
                    instruction_count: section.instructions.len(),
                    byte_address: 0,
                };
                debug!("tabulated section `{}` ({} instruction(s))", symbol.name, symbol.instruction_count);
                table.section_symbols.push(symbol);
            }
            Declaration::Native(native) => {
                debug!("tabulated native `{}` = 0x{:08X}", native.name, native.identifier);
                table.native_symbols.push(NativeSymbol { name: native.name.clone(), identifier: native.identifier });
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ast::{Instruction, Native, Section};

    fn halt() -> Instruction {
        Instruction { mnemonic: "HALT".to_owned(), argument: None, line: 0 }
    }

    #[test]
    fn test_tabulate() {
        let program = Program::new(vec![
            Declaration::Section(Section { name: "main".to_owned(), instructions: vec![halt(), halt()], line: 1 }),
            Declaration::Native(Native { name: "std.putch".to_owned(), identifier: 1, line: 2 }),
            Declaration::Section(Section { name: "other".to_owned(), instructions: vec![halt()], line: 3 }),
        ]);

        let table = tabulate(&program);
        assert_eq!(
            table.section_symbols,
            vec![
                SectionSymbol { name: "main".to_owned(), declaration_index: 0, instruction_count: 2, byte_address: 0 },
                SectionSymbol { name: "other".to_owned(), declaration_index: 1, instruction_count: 1, byte_address: 0 },
            ]
        );
        assert_eq!(table.native_symbols, vec![NativeSymbol { name: "std.putch".to_owned(), identifier: 1 }]);
    }

    #[test]
    fn test_tabulate_keeps_duplicates() {
        let program = Program::new(vec![
            Declaration::Section(Section { name: "main".to_owned(), instructions: vec![], line: 1 }),
            Declaration::Native(Native { name: "main".to_owned(), identifier: 7, line: 2 }),
        ]);
        let table = tabulate(&program);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["main", "main"]);
    }
}
