//! Parse Driver (component C5): a shift-reduce interpreter over the lexer and
//! the LR(0) parse table, building an AST as it goes.
//!
//! Grounded on `parser.go::pParse`: the two lockstep stacks, the on-hold
//! lookahead swapped in across reduce/goto (the source's `goto ParseToken`
//! re-entry without consuming new input), and the error message's "expected"
//! list (scanned across the terminal range of the current state's row) all
//! mirror that loop.

use crate::ast::{Ast, NodeId};
use crate::condensed::CondensedGrammar;
use crate::error::{CfgError, Result};
use crate::lexer::Lexer;
use crate::lr0::{Op, ParseTable};
use crate::symbol::{SymbolId, Token};
use crate::value::Value;

/// Observes (but never mutates) parser state, for tracing.
pub type TokenHook<'h> = dyn FnMut(&Token) + 'h;
pub type ParseHook<'h> = dyn FnMut(SymbolId, Op) + 'h;

/// A shift-reduce parser bound to one grammar and its parse table.
pub struct Parser<'g, 'h> {
    grammar: &'g CondensedGrammar,
    table: &'g ParseTable,
    on_next_token: Option<Box<TokenHook<'h>>>,
    on_next_parse: Option<Box<ParseHook<'h>>>,
}

impl<'g, 'h> Parser<'g, 'h> {
    pub fn new(grammar: &'g CondensedGrammar, table: &'g ParseTable) -> Self {
        Parser {
            grammar,
            table,
            on_next_token: None,
            on_next_parse: None,
        }
    }

    pub fn on_next_token(mut self, hook: impl FnMut(&Token) + 'h) -> Self {
        self.on_next_token = Some(Box::new(hook));
        self
    }

    pub fn on_next_parse(mut self, hook: impl FnMut(SymbolId, Op) + 'h) -> Self {
        self.on_next_parse = Some(Box::new(hook));
        self
    }

    pub fn parse_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<Ast> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        self.parse(content, path.display().to_string())
    }

    pub fn parse_str(&mut self, text: &str, file: impl Into<String>) -> Result<Ast> {
        self.parse(text.as_bytes().to_vec(), file)
    }

    fn expected_terminals(&self, state: usize) -> Vec<String> {
        (0..self.grammar.augmented_start as usize)
            .filter(|&t| !matches!(self.table.entry(state, t as SymbolId).op, Op::Error))
            .map(|t| self.grammar.symbol(t as SymbolId).name.clone())
            .collect()
    }

    fn parse(&mut self, content: Vec<u8>, file: impl Into<String>) -> Result<Ast> {
        let file = file.into();
        let mut lexer = Lexer::new(self.grammar, content, file.clone());
        let mut ast = Ast::new();

        let mut state_stack: Vec<usize> = vec![0];
        let mut node_stack: Vec<NodeId> = Vec::new();
        // The lookahead a reduce put on hold, restored by the Goto that follows it.
        let mut held: Option<(SymbolId, NodeId, bool)> = None;

        loop {
            let token = lexer.next();
            if let Some(hook) = self.on_next_token.as_mut() {
                hook(&token);
            }
            if self
                .grammar
                .symbol(token.symbol)
                .as_terminal()
                .is_some_and(|t| t.ignore)
            {
                continue;
            }
            if token.symbol == self.grammar.undefined {
                return Err(CfgError::UnrecognizedInput {
                    location: token.location,
                    lexeme: token.lexeme,
                });
            }

            let data = self.run_lexeme_action(&token)?;
            let mut current_symbol = token.symbol;
            let mut is_eof = token.symbol == self.grammar.eof;
            let mut current_node = ast.push_leaf(current_symbol, token, data);

            'parse_token: loop {
                let state = *state_stack.last().unwrap();
                let entry = self.table.entry(state, current_symbol);
                if let Some(hook) = self.on_next_parse.as_mut() {
                    hook(current_symbol, entry.op);
                }

                match entry.op {
                    Op::Accept => {
                        let root = node_stack.pop().unwrap_or(current_node);
                        ast.set_root(root);
                        ast.traverse(self.grammar, root)?;
                        return Ok(ast);
                    }
                    Op::Shift => {
                        node_stack.push(current_node);
                        state_stack.push(entry.data as usize);
                        break 'parse_token;
                    }
                    Op::Reduce => {
                        let production = self.grammar.production(entry.data);
                        let rhs_len = production.rhs.len();
                        let split = node_stack.len() - rhs_len;
                        let children: Vec<NodeId> = node_stack.split_off(split);
                        state_stack.truncate(state_stack.len() - rhs_len);

                        let reduced = ast.push_reduction(production.lhs, entry.data, children);
                        let on_hold_symbol = current_symbol;
                        let on_hold_node = current_node;
                        let on_hold_eof = is_eof;
                        current_symbol = production.lhs;
                        current_node = reduced;
                        // Restore the held lookahead once the Goto below fires.
                        held = Some((on_hold_symbol, on_hold_node, on_hold_eof));
                        continue 'parse_token;
                    }
                    Op::Goto => {
                        node_stack.push(current_node);
                        state_stack.push(entry.data as usize);
                        let (symbol, node, eof) = held.take().expect("goto always follows a reduce");
                        current_symbol = symbol;
                        current_node = node;
                        is_eof = eof;
                        continue 'parse_token;
                    }
                    Op::Error => {
                        let found = self.grammar.symbol(current_symbol).name.clone();
                        let found_lexeme = (!is_eof).then(|| ast.node(current_node).token.as_ref().map(|t| t.lexeme.clone())).flatten();
                        return Err(CfgError::syntax_error(
                            ast.node(current_node).location.clone(),
                            found,
                            found_lexeme,
                            is_eof,
                            self.expected_terminals(state),
                        ));
                    }
                }
            }
        }
    }

    fn run_lexeme_action(&self, token: &Token) -> Result<Value> {
        let symbol = self.grammar.symbol(token.symbol);
        let Some(terminal) = symbol.as_terminal() else {
            return Ok(Value::Unit);
        };
        let Some(action) = &terminal.action else {
            return Ok(Value::Unit);
        };
        action(token).map_err(|source| CfgError::LexemeActionError {
            location: token.location.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GrammarBuilder;
    use crate::lr0::generate_parse_table;

    fn grammar() -> CondensedGrammar {
        let mut g = GrammarBuilder::new();
        g.terminal("WS", r"[ \t\r\n]+").unwrap().ignore();
        g.terminal("NUM", r"[0-9]+").unwrap();
        g.terminal("PLUS", r"\+").unwrap();
        g.non_terminal("S").rhs().symbols("NUM PLUS NUM");
        g.build().unwrap()
    }

    #[test]
    fn ignored_terminals_never_reach_the_parse_table() {
        let grammar = grammar();
        let table = generate_parse_table(&grammar, false).unwrap();
        let ast = Parser::new(&grammar, &table)
            .parse_str(" 12 + 7 ", "t")
            .unwrap();
        let root = ast.root().unwrap();
        assert_eq!(ast.node(root).children.len(), 3);
    }

    #[test]
    fn accepted_input_builds_a_three_child_root() {
        let grammar = grammar();
        let table = generate_parse_table(&grammar, false).unwrap();
        let ast = Parser::new(&grammar, &table).parse_str("12+7", "t").unwrap();
        let root = ast.root().unwrap();
        let children = &ast.node(root).children;
        assert_eq!(children.len(), 3);
        assert_eq!(ast.node(children[0]).token.as_ref().unwrap().lexeme, "12");
        assert_eq!(ast.node(children[2]).token.as_ref().unwrap().lexeme, "7");
    }

    #[test]
    fn unexpected_token_is_a_syntax_error() {
        let grammar = grammar();
        let table = generate_parse_table(&grammar, false).unwrap();
        let err = Parser::new(&grammar, &table)
            .parse_str("12 12", "t")
            .unwrap_err();
        match err {
            CfgError::SyntaxError { expected, .. } => assert!(!expected.is_empty()),
            other => panic!("expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_byte_is_reported() {
        let grammar = grammar();
        let table = generate_parse_table(&grammar, false).unwrap();
        let err = Parser::new(&grammar, &table)
            .parse_str("12 @ 7", "t")
            .unwrap_err();
        match err {
            CfgError::UnrecognizedInput { lexeme, .. } => assert_eq!(lexeme, "@"),
            other => panic!("expected UnrecognizedInput, got {other:?}"),
        }
    }
}
