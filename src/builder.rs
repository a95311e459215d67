//! Grammar Builder (component C1): a mutable, insert-ordered collector for
//! terminal and non-terminal declarations, frozen by [`crate::condensed`].
//!
//! Grounded on `c2gram/terminal.go` and `c2gram/nonTerminal.go`'s fluent
//! `NewTerminal`/`NewNonTerminal`/`RHS` builder API, with the RHS method
//! reshaped per SPEC_FULL §4.1: instead of Go's `RHS(symbolsAndActions
//! ...interface{})` runtime type-switch, `RhsBuilder` exposes two explicit,
//! statically typed methods (`symbols`, `action`).

use crate::ast::ProductionAction;
use crate::error::Result;
use crate::symbol::{LexemeAction, LexemeActionResult, Token};
use regex::bytes::Regex;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) struct TerminalDef {
    pub name: String,
    pub pattern: Rc<Regex>,
    pub ignore: bool,
    pub action: Option<Rc<LexemeAction>>,
}

#[derive(Default)]
pub(crate) struct ProductionDef {
    pub symbols: Vec<String>,
    pub actions: HashMap<usize, Rc<ProductionAction>>,
}

pub(crate) struct NonTerminalDef {
    pub name: String,
    pub productions: Vec<ProductionDef>,
}

/// Mutable collector for a grammar under construction.
///
/// Terminals and non-terminals are each insert-ordered; adding the same name
/// twice is undefined — the first declaration wins and the second is a no-op
/// (SPEC_FULL §4.1).
#[derive(Default)]
pub struct GrammarBuilder {
    pub(crate) terminals: Vec<TerminalDef>,
    terminal_names: HashMap<String, usize>,
    pub(crate) non_terminals: Vec<NonTerminalDef>,
    non_terminal_names: HashMap<String, usize>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a terminal matching `pattern` anchored at the start of the
    /// remaining input, mirroring `c2gram/terminal.go`'s
    /// `regexp.MustCompile(fmt.Sprintf("^(%s)", regex))`.
    pub fn terminal(&mut self, name: &str, pattern: &str) -> Result<TerminalBuilder<'_>> {
        let anchored = Regex::new(&format!("^(?:{pattern})"))?;
        if self.terminal_names.contains_key(name) {
            return Ok(TerminalBuilder::Inert);
        }
        self.terminals.push(TerminalDef {
            name: name.to_string(),
            pattern: Rc::new(anchored),
            ignore: false,
            action: None,
        });
        let index = self.terminals.len() - 1;
        self.terminal_names.insert(name.to_string(), index);
        Ok(TerminalBuilder::Live {
            builder: self,
            index,
        })
    }

    /// Declares a non-terminal. The first non-terminal ever declared becomes
    /// the grammar's start symbol.
    pub fn non_terminal(&mut self, name: &str) -> NonTerminalBuilder<'_> {
        if let Some(&index) = self.non_terminal_names.get(name) {
            return NonTerminalBuilder {
                builder: self,
                index,
                inert: true,
            };
        }
        self.non_terminals.push(NonTerminalDef {
            name: name.to_string(),
            productions: Vec::new(),
        });
        let index = self.non_terminals.len() - 1;
        self.non_terminal_names.insert(name.to_string(), index);
        NonTerminalBuilder {
            builder: self,
            index,
            inert: false,
        }
    }
}

/// Fluent handle returned by [`GrammarBuilder::terminal`].
pub enum TerminalBuilder<'g> {
    Live {
        builder: &'g mut GrammarBuilder,
        index: usize,
    },
    /// Returned for a duplicate name: the first declaration already won, so
    /// configuration calls on this handle are no-ops.
    Inert,
}

impl TerminalBuilder<'_> {
    /// Marks this terminal as dropped by the parse driver (whitespace,
    /// comments, ...).
    pub fn ignore(mut self) -> Self {
        if let TerminalBuilder::Live { builder, index } = &mut self {
            builder.terminals[*index].ignore = true;
        }
        self
    }

    /// Installs a lexeme-to-value action, run once per matched token.
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&Token) -> LexemeActionResult + 'static,
    {
        if let TerminalBuilder::Live { builder, index } = &mut self {
            builder.terminals[*index].action = Some(Rc::new(f));
        }
        self
    }
}

/// Fluent handle returned by [`GrammarBuilder::non_terminal`]. Held across
/// multiple `.rhs()` calls to declare alternative productions for the same
/// non-terminal.
pub struct NonTerminalBuilder<'g> {
    builder: &'g mut GrammarBuilder,
    index: usize,
    inert: bool,
}

impl<'g> NonTerminalBuilder<'g> {
    /// Starts a new RHS alternative for this non-terminal.
    pub fn rhs(&mut self) -> RhsBuilder<'_> {
        if self.inert {
            return RhsBuilder::Inert;
        }
        self.builder.non_terminals[self.index]
            .productions
            .push(ProductionDef::default());
        let prod_index = self.builder.non_terminals[self.index].productions.len() - 1;
        RhsBuilder::Live {
            builder: self.builder,
            nt_index: self.index,
            prod_index,
        }
    }
}

/// Builds a single RHS alternative: an ordered list of symbol names plus
/// actions keyed by "number of symbols appended so far" (SPEC_FULL §4.1).
pub enum RhsBuilder<'g> {
    Live {
        builder: &'g mut GrammarBuilder,
        nt_index: usize,
        prod_index: usize,
    },
    Inert,
}

impl RhsBuilder<'_> {
    fn production_mut(&mut self) -> Option<&mut ProductionDef> {
        match self {
            RhsBuilder::Live {
                builder,
                nt_index,
                prod_index,
            } => Some(&mut builder.non_terminals[*nt_index].productions[*prod_index]),
            RhsBuilder::Inert => None,
        }
    }

    /// Appends symbol names to this alternative's RHS. `names` may pack
    /// multiple symbols separated by whitespace, e.g. `"EXPR ADD/SUB TERM"`.
    pub fn symbols(mut self, names: &str) -> Self {
        if let Some(production) = self.production_mut() {
            production
                .symbols
                .extend(names.split_whitespace().map(String::from));
        }
        self
    }

    /// Registers an action at the current symbol count: fires just before
    /// traversal descends into the next not-yet-declared child, or, if no
    /// further symbols are appended, as the finalize/reduce action.
    pub fn action<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut crate::ast::Ast, crate::ast::NodeId) -> Result<()> + 'static,
    {
        if let Some(production) = self.production_mut() {
            let position = production.symbols.len();
            production.actions.insert(position, Rc::new(f));
        }
        self
    }
}
