//! Longest-match-with-priority lexer (component C4): a byte-buffer tokenizer
//! that tries terminals in declaration order and takes the first match.
//!
//! Grounded on `parser.go`'s `pNext`/`pPeekNext`: the tab-stop column math,
//! the CR?LF row/column reset, and the "advance position from the bytes of
//! the token just consumed, then match the next one" sequencing all mirror
//! those functions. Declaration-order priority (not longest-match-wins) is
//! carried over unchanged — it is a grammar-authoring contract, not a bug.

use crate::condensed::CondensedGrammar;
use crate::error::Location;
use crate::symbol::Token;
use regex::bytes::Regex;

#[derive(Clone, Copy)]
struct Position {
    index: usize,
    row: usize,
    column: usize,
}

/// A streaming tokenizer over a byte buffer, bound to one grammar's terminals.
pub struct Lexer<'g> {
    grammar: &'g CondensedGrammar,
    content: Vec<u8>,
    file: String,
    pos: Position,
    newline: Regex,
}

impl<'g> Lexer<'g> {
    pub fn new(grammar: &'g CondensedGrammar, content: Vec<u8>, file: impl Into<String>) -> Self {
        Lexer {
            grammar,
            content,
            file: file.into(),
            pos: Position {
                index: 0,
                row: 1,
                column: 1,
            },
            newline: Regex::new(r"\r?\n").unwrap(),
        }
    }

    fn location_at(&self, pos: Position) -> Location {
        Location::new(self.file.clone(), pos.row, pos.column)
    }

    /// Advances `pos` past `bytes`, updating row/column per the tab-stop and
    /// newline rules.
    fn advance(&self, pos: Position, bytes: &[u8]) -> Position {
        let mut row = pos.row;
        let mut column = pos.column;
        let mut start = 0;
        if let Some(last) = self.newline.find_iter(bytes).last() {
            row += self.newline.find_iter(bytes).count();
            start = last.end();
            column = 1;
        }
        for &b in &bytes[start..] {
            if b == b'\t' {
                column += 4 - ((column - 1) % 4);
            } else {
                column += 1;
            }
        }
        Position {
            index: pos.index + bytes.len(),
            row,
            column,
        }
    }

    /// Matches the next token starting at `pos`, without mutating lexer state.
    fn scan_at(&self, pos: Position) -> Token {
        let location = self.location_at(pos);
        if pos.index >= self.content.len() {
            return Token {
                symbol: self.grammar.eof,
                bytes: Vec::new(),
                lexeme: String::new(),
                location,
            };
        }
        let remaining = &self.content[pos.index..];
        for id in 0..=self.grammar.undefined {
            let terminal = self
                .grammar
                .symbol(id)
                .as_terminal()
                .expect("symbols 0..=undefined are all terminals");
            if let Some(m) = terminal.regex.find(remaining) {
                let bytes = m.as_bytes().to_vec();
                let lexeme = String::from_utf8_lossy(&bytes).into_owned();
                return Token {
                    symbol: id,
                    bytes,
                    lexeme,
                    location,
                };
            }
        }
        unreachable!("undefined's catch-all regex matches any single byte")
    }

    /// Matches the next token and advances the cursor past it.
    pub fn next(&mut self) -> Token {
        let token = self.scan_at(self.pos);
        self.pos = self.advance(self.pos, &token.bytes);
        token
    }

    /// Matches the next token without advancing the cursor.
    pub fn peek(&self) -> Token {
        self.scan_at(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GrammarBuilder;

    fn grammar() -> CondensedGrammar {
        let mut g = GrammarBuilder::new();
        g.terminal("WS", r"[ \t\r\n]+").unwrap().ignore();
        g.terminal("NUM", r"[0-9]+").unwrap();
        g.terminal("PLUS", r"\+").unwrap();
        g.non_terminal("S").rhs().symbols("NUM PLUS NUM");
        g.build().unwrap()
    }

    #[test]
    fn tokenizes_in_declaration_order() {
        let grammar = grammar();
        let mut lexer = Lexer::new(&grammar, b"12+7".to_vec(), "t");
        let a = lexer.next();
        assert_eq!(a.lexeme, "12");
        let plus = lexer.next();
        assert_eq!(plus.lexeme, "+");
        let b = lexer.next();
        assert_eq!(b.lexeme, "7");
        let eof = lexer.next();
        assert_eq!(eof.symbol, grammar.eof);
    }

    #[test]
    fn unmatched_byte_falls_back_to_undefined() {
        let grammar = grammar();
        let mut lexer = Lexer::new(&grammar, b"@".to_vec(), "t");
        let tok = lexer.next();
        assert_eq!(tok.symbol, grammar.undefined);
        assert_eq!(tok.lexeme, "@");
    }

    #[test]
    fn tab_advances_to_next_stop_of_four() {
        let grammar = grammar();
        let mut lexer = Lexer::new(&grammar, b"\t5".to_vec(), "t");
        let ws = lexer.next();
        assert_eq!(ws.lexeme, "\t");
        let num = lexer.next();
        assert_eq!(num.location.column, 5);
    }

    #[test]
    fn newline_resets_column_and_increments_row() {
        let grammar = grammar();
        let mut lexer = Lexer::new(&grammar, b"1\n2".to_vec(), "t");
        let _ = lexer.next();
        let _ = lexer.next();
        let num = lexer.next();
        assert_eq!(num.location.row, 2);
        assert_eq!(num.location.column, 1);
    }

    #[test]
    fn peek_does_not_advance() {
        let grammar = grammar();
        let mut lexer = Lexer::new(&grammar, b"12+7".to_vec(), "t");
        let peeked = lexer.peek();
        let next = lexer.next();
        assert_eq!(peeked.lexeme, next.lexeme);
    }
}
