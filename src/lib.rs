//! A compiler-compiler: build a declarative grammar (regex terminals,
//! ordered-alternative non-terminals with positional semantic actions), then
//! generate an LR(0) parse table, a byte-stream lexer, and a shift-reduce
//! driver that builds an AST and fires the actions during traversal.

pub mod ast;
pub mod builder;
pub mod condensed;
pub mod demo;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod lr0;
pub mod symbol;
pub mod value;

pub use ast::{Ast, AstNode, NodeId};
pub use builder::GrammarBuilder;
pub use condensed::CondensedGrammar;
pub use driver::Parser;
pub use error::{CfgError, Result};
pub use lr0::{ParseTable, generate_parse_table};
pub use symbol::{Symbol, Token};
pub use value::Value;
