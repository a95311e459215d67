//! The Condenser (component C2): freezes a [`GrammarBuilder`] into a
//! numbered, augmented, cross-referenced symbol and production table.
//!
//! Grounded line-for-line on `condensedGrammar.go::Build`: the ID layout
//! (terminals, then `Undefined`, then `EndOfFile`, then `AugmentedStart`,
//! then user non-terminals), the synthetic `S' -> S EOF` production, and the
//! undefined-symbol collection all mirror that function.

use crate::ast::ProductionAction;
use crate::builder::GrammarBuilder;
use crate::error::{CfgError, Result};
use crate::symbol::{NonTerminalData, ProductionId, Symbol, SymbolId, SymbolKind, TerminalData};
use regex::bytes::Regex;
use std::collections::HashMap;
use std::rc::Rc;

/// A production: `LHS -> RHS`, plus the actions to fire while traversing it.
#[derive(Debug)]
pub struct Production {
    pub id: ProductionId,
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
}

/// The frozen product of grammar construction (SPEC_FULL §3).
pub struct CondensedGrammar {
    pub symbols: Vec<Symbol>,
    pub undefined: SymbolId,
    pub eof: SymbolId,
    pub augmented_start: SymbolId,
    pub productions: Vec<Production>,
    pub productions_by_lhs: HashMap<SymbolId, Vec<ProductionId>>,
    actions: HashMap<(ProductionId, usize), Rc<ProductionAction>>,
}

impl std::fmt::Debug for CondensedGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CondensedGrammar")
            .field("symbols", &self.symbols)
            .field("undefined", &self.undefined)
            .field("eof", &self.eof)
            .field("augmented_start", &self.augmented_start)
            .field("productions", &self.productions)
            .field("productions_by_lhs", &self.productions_by_lhs)
            .finish_non_exhaustive()
    }
}

impl CondensedGrammar {
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id as usize]
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id as usize]
    }

    pub fn productions_for(&self, lhs: SymbolId) -> &[ProductionId] {
        self.productions_by_lhs
            .get(&lhs)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The action registered at `position` for `production`, if any.
    pub fn production_action(
        &self,
        production: ProductionId,
        position: usize,
    ) -> Option<&Rc<ProductionAction>> {
        self.actions.get(&(production, position))
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id < self.augmented_start
    }
}

impl GrammarBuilder {
    /// Freezes this builder into a [`CondensedGrammar`], per SPEC_FULL §4.2.
    pub fn build(self) -> Result<CondensedGrammar> {
        if self.non_terminals.is_empty() {
            return Err(CfgError::UndefinedSymbols(vec![
                "<grammar has no non-terminals>".to_string(),
            ]));
        }

        let user_terminal_count = self.terminals.len();
        let undefined_id = user_terminal_count as SymbolId;
        let eof_id = undefined_id + 1;
        let augmented_start_id = eof_id + 1;

        let mut name_to_id: HashMap<String, SymbolId> = HashMap::new();
        let mut symbols: Vec<Symbol> = Vec::with_capacity(user_terminal_count + self.non_terminals.len() + 3);

        for (i, t) in self.terminals.iter().enumerate() {
            name_to_id.insert(t.name.clone(), i as SymbolId);
            symbols.push(Symbol {
                id: i as SymbolId,
                name: t.name.clone(),
                kind: SymbolKind::Terminal(TerminalData {
                    regex: t.pattern.clone(),
                    ignore: t.ignore,
                    action: t.action.clone(),
                }),
            });
        }

        let undefined_name = "*Undefined".to_string();
        name_to_id.insert(undefined_name.clone(), undefined_id);
        symbols.push(Symbol {
            id: undefined_id,
            name: undefined_name,
            kind: SymbolKind::Terminal(TerminalData {
                regex: Rc::new(Regex::new(".").unwrap()),
                ignore: false,
                action: None,
            }),
        });

        let eof_name = "*EndOfFile".to_string();
        name_to_id.insert(eof_name.clone(), eof_id);
        symbols.push(Symbol {
            id: eof_id,
            name: eof_name,
            kind: SymbolKind::Terminal(TerminalData {
                regex: Rc::new(Regex::new("^$").unwrap()),
                ignore: false,
                action: None,
            }),
        });

        let augmented_start_name = "*AugmentedStart".to_string();
        name_to_id.insert(augmented_start_name.clone(), augmented_start_id);
        symbols.push(Symbol {
            id: augmented_start_id,
            name: augmented_start_name,
            kind: SymbolKind::NonTerminal(NonTerminalData),
        });

        for (i, nt) in self.non_terminals.iter().enumerate() {
            let id = augmented_start_id + 1 + i as SymbolId;
            name_to_id.insert(nt.name.clone(), id);
            symbols.push(Symbol {
                id,
                name: nt.name.clone(),
                kind: SymbolKind::NonTerminal(NonTerminalData),
            });
        }

        let user_start_id = augmented_start_id + 1;

        let mut productions = Vec::new();
        let mut productions_by_lhs: HashMap<SymbolId, Vec<ProductionId>> = HashMap::new();
        let mut actions = HashMap::new();
        let mut undefined_symbols = Vec::new();

        // The synthetic augmented-start production S' -> S EOF.
        let aug_id = 0 as ProductionId;
        productions.push(Production {
            id: aug_id,
            lhs: augmented_start_id,
            rhs: vec![user_start_id, eof_id],
        });
        productions_by_lhs.insert(augmented_start_id, vec![aug_id]);

        for nt in &self.non_terminals {
            let lhs_id = name_to_id[&nt.name];
            for prod in &nt.productions {
                let production_id = productions.len() as ProductionId;
                let mut rhs = Vec::with_capacity(prod.symbols.len());
                for name in &prod.symbols {
                    match name_to_id.get(name) {
                        Some(&id) => rhs.push(id),
                        None => undefined_symbols.push(name.clone()),
                    }
                }
                for (&position, action) in &prod.actions {
                    actions.insert((production_id, position), action.clone());
                }
                productions.push(Production {
                    id: production_id,
                    lhs: lhs_id,
                    rhs,
                });
                productions_by_lhs.entry(lhs_id).or_default().push(production_id);
            }
        }

        if !undefined_symbols.is_empty() {
            return Err(CfgError::UndefinedSymbols(undefined_symbols));
        }

        Ok(CondensedGrammar {
            symbols,
            undefined: undefined_id,
            eof: eof_id,
            augmented_start: augmented_start_id,
            productions,
            productions_by_lhs,
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_grammar() -> GrammarBuilder {
        let mut g = GrammarBuilder::new();
        g.terminal("a", "a").unwrap();
        g.terminal("b", "b").unwrap();
        let mut s = g.non_terminal("S");
        s.rhs().symbols("a S").action(|_, _| Ok(()));
        s.rhs().symbols("b");
        g
    }

    #[test]
    fn symbol_id_layout() {
        let g = tiny_grammar().build().unwrap();
        // P1: terminal IDs < augmented_start < non-terminal IDs.
        for s in &g.symbols {
            if s.is_terminal() {
                assert!(s.id < g.augmented_start);
            } else {
                assert!(s.id >= g.augmented_start);
            }
        }
        assert_eq!(g.undefined, g.augmented_start - 2);
        assert_eq!(g.eof, g.augmented_start - 1);
    }

    #[test]
    fn augmented_start_production_is_s_eof() {
        let g = tiny_grammar().build().unwrap();
        let augs = g.productions_for(g.augmented_start);
        assert_eq!(augs.len(), 1);
        let p = g.production(augs[0]);
        assert_eq!(p.rhs, vec![g.augmented_start + 1, g.eof]);
    }

    #[test]
    fn undefined_symbol_is_reported() {
        let mut g = GrammarBuilder::new();
        g.terminal("a", "a").unwrap();
        g.non_terminal("S").rhs().symbols("a MISSING");
        let err = g.build().unwrap_err();
        match err {
            CfgError::UndefinedSymbols(names) => assert_eq!(names, vec!["MISSING".to_string()]),
            other => panic!("expected UndefinedSymbols, got {other:?}"),
        }
    }

    #[test]
    fn production_integrity() {
        let g = tiny_grammar().build().unwrap();
        // P2: every RHS symbol ID is a valid index into symbols.
        for p in &g.productions {
            for &s in &p.rhs {
                assert!((s as usize) < g.symbols.len());
            }
        }
    }
}
