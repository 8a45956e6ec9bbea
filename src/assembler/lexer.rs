//! This lexer tokenizes SLAP.
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};

use regex::Regex;

use super::ast::Literal;
use super::error::Error;

// Tokens carry the (1-based) line they appear on.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Token {
    Section(usize),
    Native(usize),
    /// A mnemonic or a label. Which one is decided by position.
    Word(String, usize),
    Number(Literal, usize),
}

impl Token {
    pub fn line(&self) -> usize {
        match self {
            Token::Section(line) | Token::Native(line) | Token::Word(_, line) | Token::Number(_, line) => *line,
        }
    }
}

/// The token classes of SLAP, compiled once per tokenizer run.
struct Lexicon {
    word: Regex,
    hex: Regex,
    bin: Regex,
    float: Regex,
    dec: Regex,
}

impl Lexicon {
    fn new() -> Self {
        Lexicon {
            word: Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("word pattern"),
            hex: Regex::new(r"^0[xX][0-9A-Fa-f]+$").expect("hex pattern"),
            bin: Regex::new(r"^0[bB][01]+$").expect("binary pattern"),
            float: Regex::new(r"^0[fF][+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$").expect("float pattern"),
            dec: Regex::new(r"^-?[0-9]+$").expect("decimal pattern"),
        }
    }

    fn classify(&self, word: &str, line: usize) -> Option<Token> {
        match word {
            "section" => return Some(Token::Section(line)),
            "native" => return Some(Token::Native(line)),
            _ => {}
        }

        let literal = if self.hex.is_match(word) {
            Literal::Hex(word.to_owned())
        } else if self.bin.is_match(word) {
            Literal::Binary(word.to_owned())
        } else if self.float.is_match(word) {
            Literal::Float(word.to_owned())
        } else if self.dec.is_match(word) {
            Literal::Decimal(word.to_owned())
        } else if self.word.is_match(word) {
            return Some(Token::Word(word.to_owned(), line));
        } else {
            return None;
        };
        Some(Token::Number(literal, line))
    }
}

/// SLAP holds at most one declaration or instruction per line.
/// Every malformed token is logged; if any were found the whole
/// run fails with the error count.
pub fn tokenize<R: Read>(reader: R) -> Result<VecDeque<Token>, Error> {
    let lexicon = Lexicon::new();
    let mut tokens: VecDeque<Token> = VecDeque::with_capacity(256);
    let mut error_count: usize = 0;

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_num = index + 1;
        match tokenize_line(&lexicon, &line?, line_num) {
            Ok(mut toks) => tokens.append(&mut toks),
            Err(bad) => {
                error_count += 1;
                error!("invalid token `{}` on line {}", bad, line_num);
            }
        }
    }

    if error_count > 0 {
        error!("stopped assembly due to {} lexer error(s)", error_count);
        return Err(Error::Syntax { count: error_count });
    }
    debug!("lexed {} token(s)", tokens.len());
    Ok(tokens)
}

fn tokenize_line(lexicon: &Lexicon, line: &str, line_num: usize) -> Result<VecDeque<Token>, String> {
    let code = match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    };

    code.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .map(|word| lexicon.classify(word, line_num).ok_or_else(|| word.to_owned()))
        .collect()
}
