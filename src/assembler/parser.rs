//! The Parser module takes a token stream (VecDeque<Token>) from the Tokenizer
//! and converts it into a Program.
use std::collections::VecDeque;

use super::ast::*;
use super::error::Error;
use super::lexer::Token;
use super::opcode;

pub struct Parser {
    tokens: VecDeque<Token>,
    declarations: Vec<Declaration>,
    error_count: usize,
}

impl Parser {
    pub fn new(tokens: VecDeque<Token>) -> Self {
        Parser { tokens, declarations: Vec::new(), error_count: 0 }
    }

    /// Run the parser, consuming itself and returning the program.
    /// A line with an error is reported and skipped so that every
    /// problem in the file is seen before giving up.
    pub fn run(mut self) -> Result<Program, Error> {
        while let Some(tok) = self.consume() {
            let line = tok.line();
            let result = match tok {
                Token::Section(line) => self.section(line),
                Token::Native(line) => self.native(line),
                Token::Word(word, line) => self.instruction(word, line),
                Token::Number(lit, line) => Err(format!("unexpected numeric literal `{}` on line {}", lit, line)),
            };

            if let Err(e) = result {
                self.error_count += 1;
                error!("{}", e);
                self.skip_line(line);
            }
        }

        if self.error_count > 0 {
            error!("stopped assembly due to {} parsing error(s)", self.error_count);
            return Err(Error::Syntax { count: self.error_count });
        }

        Ok(Program::new(self.declarations))
    }

    /// `section LABEL`
    fn section(&mut self, line: usize) -> Result<(), String> {
        let name = self.label(line);
        // The section is opened even when its header is broken so that its
        // body is not reported a second time as stray instructions.
        self.declarations.push(Declaration::Section(Section {
            name: name.clone().unwrap_or_default(),
            instructions: Vec::new(),
            line,
        }));
        name?;
        self.end_of_line(line)
    }

    /// `native LABEL HEX`
    fn native(&mut self, line: usize) -> Result<(), String> {
        let name = self.label(line)?;
        let identifier = match self.consume_on(line) {
            Some(Token::Number(Literal::Hex(hex), _)) => u32::from_str_radix(&hex[2..], 16)
                .map_err(|_| format!("native identifier `{}` on line {} does not fit in 32 bits", hex, line))?,
            Some(_) => return Err(format!("native identifier on line {} must be a hex literal", line)),
            None => return Err(format!("expected a native identifier on line {}", line)),
        };
        self.end_of_line(line)?;

        self.declarations.push(Declaration::Native(Native { name, identifier, line }));
        Ok(())
    }

    /// `MNEMONIC [ARGUMENT]`
    fn instruction(&mut self, word: String, line: usize) -> Result<(), String> {
        let def = opcode::lookup(&word).ok_or_else(|| format!("unknown mnemonic `{}` on line {}", word, line))?;
        let argument = self.argument(line)?;
        self.end_of_line(line)?;

        match (&argument, def.takes_argument) {
            (None, true) => return Err(format!("{} on line {} requires an argument", def.mnemonic, line)),
            (Some(_), false) => return Err(format!("{} on line {} takes no argument", def.mnemonic, line)),
            _ => {}
        }
        if let Some(Argument::Literal(lit)) = &argument {
            lit.to_bits().map_err(|e| format!("{} on line {}", e, line))?;
        }

        let ins = Instruction { mnemonic: def.mnemonic.to_owned(), argument, line };
        match self.declarations.last_mut() {
            Some(Declaration::Section(section)) => {
                section.instructions.push(ins);
                Ok(())
            }
            _ => Err(format!("instruction `{}` on line {} is outside of a section", ins, line)),
        }
    }

    fn argument(&mut self, line: usize) -> Result<Option<Argument>, String> {
        match self.consume_on(line) {
            Some(Token::Word(name, _)) => Ok(Some(Argument::Symbol(SymbolRef::new(name)))),
            Some(Token::Number(lit, _)) => Ok(Some(Argument::Literal(lit))),
            Some(_) => Err(format!("unexpected keyword in argument position on line {}", line)),
            None => Ok(None),
        }
    }

    fn label(&mut self, line: usize) -> Result<String, String> {
        match self.consume_on(line) {
            Some(Token::Word(name, _)) => Ok(name),
            Some(Token::Number(lit, _)) => Err(format!("expected a label on line {}, got literal `{}`", line, lit)),
            Some(_) => Err(format!("expected a label on line {}, got a keyword", line)),
            None => Err(format!("expected a label on line {}", line)),
        }
    }

    fn end_of_line(&mut self, line: usize) -> Result<(), String> {
        match self.tokens.front() {
            Some(tok) if tok.line() == line => Err(format!("unexpected trailing token on line {}", line)),
            _ => Ok(()),
        }
    }

    fn skip_line(&mut self, line: usize) {
        while self.consume_on(line).is_some() {}
    }

    /// Pops the next token only if it sits on `line`.
    fn consume_on(&mut self, line: usize) -> Option<Token> {
        match self.tokens.front() {
            Some(tok) if tok.line() == line => self.consume(),
            _ => None,
        }
    }

    /// Pops a token off the input stream and returns it.
    /// Returns None if no tokens are left.
    #[inline]
    fn consume(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}
