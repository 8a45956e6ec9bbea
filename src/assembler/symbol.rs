//! The symbol table shared by every assembler pass.

/// Every instruction record is one opcode byte and eight operand bytes.
pub const INSTRUCTION_WIDTH: u64 = 9;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SectionSymbol {
    pub name: String,
    pub declaration_index: usize,
    pub instruction_count: usize,
    /// Zero until the resolver lays the sections out.
    pub byte_address: u64,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NativeSymbol {
    pub name: String,
    /// Passed to the executor as-is; this is not an address.
    pub identifier: u32,
}

/// What a name refers to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Symbol<'a> {
    Section(&'a SectionSymbol),
    Native(&'a NativeSymbol),
}

impl<'a> Symbol<'a> {
    /// The operand a reference to this symbol encodes to.
    pub fn value(&self) -> u64 {
        match self {
            Symbol::Section(s) => s.byte_address,
            Symbol::Native(n) => u64::from(n.identifier),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolTable {
    pub section_symbols: Vec<SectionSymbol>,
    pub native_symbols: Vec<NativeSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the symbol called `name`. Sections shadow natives, which
    /// only matters for tables that failed validation.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.section_symbols
            .iter()
            .find(|s| s.name == name)
            .map(Symbol::Section)
            .or_else(|| self.native_symbols.iter().find(|n| n.name == name).map(Symbol::Native))
    }

    pub fn section(&self, name: &str) -> Option<&SectionSymbol> {
        self.section_symbols.iter().find(|s| s.name == name)
    }

    /// All names in declaration order, sections first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.section_symbols
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.native_symbols.iter().map(|n| n.name.as_str()))
    }

    /// Lays sections out back to back in declaration order.
    pub fn calculate_addresses(&mut self) {
        let mut address = 0;
        for section in self.section_symbols.iter_mut() {
            section.byte_address = address;
            address += section.instruction_count as u64 * INSTRUCTION_WIDTH;
        }
    }

    /// Size in bytes of the image these sections assemble to.
    pub fn image_size(&self) -> u64 {
        self.section_symbols.iter().map(|s| s.instruction_count as u64).sum::<u64>() * INSTRUCTION_WIDTH
    }
}
