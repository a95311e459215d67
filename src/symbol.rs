//! Grammar symbols: terminals and non-terminals, identified by a stable,
//! dense integer ID once a grammar has been condensed (see [`crate::condensed`]).
//!
//! This generalizes the teacher's single-character `Symbol` enum (terminals
//! were `a`-`z`, non-terminals `A`-`Z`) to arbitrarily-named symbols, each
//! backed by a compiled regex when terminal, per `condensedGrammar.go`'s
//! `Symbol`/`Terminal`/`NonTerminal` split.

use crate::error::Location;
use crate::value::Value;
use regex::bytes::Regex;
use std::fmt;
use std::rc::Rc;

/// A dense, stable, non-negative symbol ID assigned at condensation time.
pub type SymbolId = u32;

/// A production ID, stable for the lifetime of a [`crate::condensed::CondensedGrammar`].
pub type ProductionId = u32;

/// A single lexed token.
#[derive(Debug, Clone)]
pub struct Token {
    pub symbol: SymbolId,
    pub bytes: Vec<u8>,
    pub lexeme: String,
    pub location: Location,
}

/// The result type returned by a user lexeme action.
pub type LexemeActionResult = std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>>;

/// A lexeme-to-value action, run once per matched token before it reaches the
/// parser.
pub type LexemeAction = dyn Fn(&Token) -> LexemeActionResult;

/// Per-terminal data: its compiled, start-anchored regex, whether it should
/// be dropped by the parse driver, and its optional lexeme action.
#[derive(Clone)]
pub struct TerminalData {
    pub regex: Rc<Regex>,
    pub ignore: bool,
    pub action: Option<Rc<LexemeAction>>,
}

impl fmt::Debug for TerminalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalData")
            .field("regex", &self.regex.as_str())
            .field("ignore", &self.ignore)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// Per-non-terminal data: nothing beyond its productions, which live in
/// `CondensedGrammar::productions_by_lhs` rather than here, since a
/// non-terminal's production list is only meaningful once the whole grammar
/// is frozen.
#[derive(Debug, Clone, Default)]
pub struct NonTerminalData;

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Terminal(TerminalData),
    NonTerminal(NonTerminalData),
}

/// A grammar symbol: a stable ID, a display name, and terminal/non-terminal
/// specific data.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::NonTerminal(_))
    }

    pub fn as_terminal(&self) -> Option<&TerminalData> {
        match &self.kind {
            SymbolKind::Terminal(t) => Some(t),
            SymbolKind::NonTerminal(_) => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
