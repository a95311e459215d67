//! AST node model and post-order-interleaved traversal (component C6).
//!
//! The source represents a node as `up *ASTNode` / `down []*ASTNode`, i.e. a
//! cyclic pointer graph. SPEC_FULL §3 calls that out as something to avoid in
//! Rust; per the Design Notes this is instead an arena (`Ast::nodes`) with
//! parent/child links stored as plain indices, in the spirit of
//! `Ladle-ladle-core`'s `vec_arena.rs` (consulted as an example repo, not the
//! teacher, for this one pattern).

use crate::condensed::CondensedGrammar;
use crate::error::{CfgError, Location, Result};
use crate::symbol::{ProductionId, SymbolId, Token};
use crate::value::Value;

/// An index into an [`Ast`]'s node arena.
pub type NodeId = usize;

/// A signature for a production action: given the whole arena and the index
/// of the node currently being traversed, do work and optionally fail.
///
/// This mirrors the source's `func(s *c2.ASTNode) error`, generalized to take
/// the arena explicitly since Rust can't hand out a live `&mut Ast` alongside
/// borrowed children the way a GC'd pointer graph can.
pub type ProductionAction = dyn Fn(&mut Ast, NodeId) -> Result<()>;

/// One node of a parsed AST: a leaf (terminal, carries a token) or an
/// interior node (non-terminal, carries the production it was reduced by and
/// its children in RHS order).
#[derive(Debug)]
pub struct AstNode {
    pub symbol: SymbolId,
    pub production: Option<ProductionId>,
    pub token: Option<Token>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub location: Location,
    pub data: Value,
}

/// An arena of AST nodes produced by a single parse. Exclusively owned by the
/// parser until returned to the caller (§5); thereafter the caller owns it.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a terminal leaf node built from a lexed token, returning its index.
    pub fn push_leaf(&mut self, symbol: SymbolId, token: Token, data: Value) -> NodeId {
        let location = token.location.clone();
        let id = self.nodes.len();
        self.nodes.push(AstNode {
            symbol,
            production: None,
            token: Some(token),
            parent: None,
            children: Vec::new(),
            location,
            data,
        });
        id
    }

    /// Pushes a non-terminal node over `children` (already in RHS order),
    /// assigning each child's parent pointer to the new node. Location is
    /// inherited from the first child, per SPEC_FULL §3.
    pub fn push_reduction(
        &mut self,
        symbol: SymbolId,
        production: ProductionId,
        children: Vec<NodeId>,
    ) -> NodeId {
        let location = children
            .first()
            .map(|&c| self.nodes[c].location.clone())
            .unwrap_or_default();
        let id = self.nodes.len();
        for &child in &children {
            self.nodes[child].parent = Some(id);
        }
        self.nodes.push(AstNode {
            symbol,
            production: Some(production),
            token: None,
            parent: None,
            children,
            location,
            data: Value::Unit,
        });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds a located [`CfgError::ProductionActionError`] from `reason`,
    /// mirroring the source's `ASTNode.NewError` convenience.
    pub fn error(&self, id: NodeId, reason: impl std::fmt::Display) -> CfgError {
        CfgError::production_action_error(
            self.node(id).location.clone(),
            std::io::Error::other(reason.to_string()),
        )
    }

    /// Runs post-/pre-order-interleaved traversal starting at `root`,
    /// per SPEC_FULL §4.6: for each child index `i` ascending, the action at
    /// position `i` (if any) fires before recursion into child `i`; after all
    /// children return, the action at position `len(RHS)` (if any) fires.
    pub fn traverse(&mut self, grammar: &CondensedGrammar, root: NodeId) -> Result<()> {
        let Some(production_id) = self.node(root).production else {
            return Ok(());
        };
        let child_count = self.node(root).children.len();
        for i in 0..child_count {
            if let Some(action) = grammar.production_action(production_id, i) {
                action(self, root)?;
            }
            let child = self.node(root).children[i];
            self.traverse(grammar, child)?;
        }
        if let Some(action) = grammar.production_action(production_id, child_count) {
            action(self, root)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    fn leaf(ast: &mut Ast, symbol: SymbolId, lexeme: &str) -> NodeId {
        let token = Token {
            symbol,
            bytes: lexeme.as_bytes().to_vec(),
            lexeme: lexeme.to_string(),
            location: Location::new("t", 1, 1),
        };
        ast.push_leaf(symbol, token, Value::Unit)
    }

    #[test]
    fn reduction_sets_parent_links_and_location() {
        let mut ast = Ast::new();
        let a = leaf(&mut ast, 0, "a");
        let b = leaf(&mut ast, 1, "b");
        let parent = ast.push_reduction(10, 0, vec![a, b]);
        assert_eq!(ast.node(a).parent, Some(parent));
        assert_eq!(ast.node(b).parent, Some(parent));
        assert_eq!(ast.node(parent).children, vec![a, b]);
        assert_eq!(ast.node(parent).location, ast.node(a).location);
    }
}
