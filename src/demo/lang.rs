//! The example arithmetic-and-assignment language: variable assignment,
//! `print`, `if` blocks, and four binary operators over bools/ints/floats/
//! strings.
//!
//! Grounded on `original_source/example/lang/lang.go`'s `Build`: the terminal
//! set, the `opHandlers`-style dispatch table keyed by `(op, lhs type, rhs
//! type)`, and the `STORAGE`/`VALUE` variable-cell split all mirror that
//! file. Two of its bugs are fixed here (see DESIGN.md): `VALUE -> bool |
//! string | float` no longer tag every value as an integer, and the string
//! `+` handler concatenates `lhs + rhs` instead of `rhs + lhs`. The
//! lexer's declaration-order-priority matching is left exactly as the
//! original relies on it; `float` is declared ahead of `integer` (the
//! original declares them the other way around, which shadows every float
//! literal behind integer's shorter match) since a grammar author relying on
//! that matching rule is expected to order the longer alternative first.

use crate::builder::GrammarBuilder;
use crate::condensed::CondensedGrammar;
use crate::error::Result;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn name(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    fn as_value(self) -> Value {
        Value::Int(self as i64)
    }

    fn from_value(v: &Value) -> Self {
        match v.as_int() {
            Some(0) => BinOp::Add,
            Some(1) => BinOp::Sub,
            Some(2) => BinOp::Mul,
            Some(3) => BinOp::Div,
            _ => unreachable!("ADD/SUB and MUL/DIV only ever set op codes 0-3"),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Str(_) => "string",
        Value::Unit | Value::Box(_) => "unit",
    }
}

/// Applies a binary operator to two already-evaluated operands, mirroring
/// the source's `opHandlers` table: `bool` only supports `+` (or) and `*`
/// (and); numeric types support all four, with int/float mixes promoting to
/// float; strings only support `+`.
fn apply_binary_op(op: BinOp, lhs: Value, rhs: Value) -> std::result::Result<Value, String> {
    use Value::*;
    let result = match (op, &lhs, &rhs) {
        (BinOp::Add, Bool(l), Bool(r)) => Bool(*l || *r),
        (BinOp::Mul, Bool(l), Bool(r)) => Bool(*l && *r),
        (BinOp::Add, Int(l), Int(r)) => Int(l + r),
        (BinOp::Sub, Int(l), Int(r)) => Int(l - r),
        (BinOp::Mul, Int(l), Int(r)) => Int(l * r),
        (BinOp::Div, Int(l), Int(r)) => Int(l / r),
        (BinOp::Add, Float(l), Float(r)) => Float(l + r),
        (BinOp::Sub, Float(l), Float(r)) => Float(l - r),
        (BinOp::Mul, Float(l), Float(r)) => Float(l * r),
        (BinOp::Div, Float(l), Float(r)) => Float(l / r),
        (BinOp::Add, Int(l), Float(r)) => Float(*l as f64 + r),
        (BinOp::Add, Float(l), Int(r)) => Float(l + *r as f64),
        (BinOp::Sub, Int(l), Float(r)) => Float(*l as f64 - r),
        (BinOp::Sub, Float(l), Int(r)) => Float(l - *r as f64),
        (BinOp::Mul, Int(l), Float(r)) => Float(*l as f64 * r),
        (BinOp::Mul, Float(l), Int(r)) => Float(l * *r as f64),
        (BinOp::Div, Int(l), Float(r)) => Float(*l as f64 / r),
        (BinOp::Div, Float(l), Int(r)) => Float(l / *r as f64),
        (BinOp::Add, Str(l), Str(r)) => Str(format!("{l}{r}")),
        _ => {
            return Err(format!(
                "for binary operator {}, lhs:{} and rhs:{} are invalid types",
                op.name(),
                type_name(&lhs),
                type_name(&rhs)
            ))
        }
    };
    Ok(result)
}

type Variables = Rc<RefCell<HashMap<String, Rc<RefCell<Value>>>>>;

fn numeric_action<T, F>(parse: F) -> impl Fn(&crate::symbol::Token) -> crate::symbol::LexemeActionResult
where
    T: Into<Value>,
    F: Fn(&str) -> std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>,
{
    move |token| parse(&token.lexeme).map(Into::into)
}

/// Builds the condensed grammar for this language.
pub fn build() -> Result<CondensedGrammar> {
    let variables: Variables = Rc::new(RefCell::new(HashMap::new()));

    let mut g = GrammarBuilder::new();
    g.terminal("ws", r"\s+")?.ignore();
    g.terminal(";", ";")?;
    g.terminal("!", "!")?;
    g.terminal("=", "=")?;
    g.terminal("(", r"\(")?;
    g.terminal(")", r"\)")?;
    g.terminal("{", r"\{")?;
    g.terminal("}", r"\}")?;
    g.terminal("if", "if")?;
    g.terminal("print", "print")?;
    g.terminal("bool", "true|false")?
        .action(|t| Ok(Value::from(t.lexeme == "true")));
    // float is declared ahead of integer: the lexer tries terminals in
    // declaration order and takes the first match, so integer's `[0-9]+`
    // would otherwise shadow float's longer `[0-9]+\.[0-9]+` on every float
    // literal, matching just its leading digits.
    g.terminal("float", r"[0-9]+\.[0-9]+")?
        .action(numeric_action(|s| {
            s.parse::<f64>()
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        }));
    g.terminal("integer", r"[0-9]+")?.action(numeric_action(|s| {
        s.parse::<i64>()
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
    }));
    g.terminal("string", "\"[^\"]*\"")?.action(|t| {
        let s = &t.lexeme;
        Ok(Value::from(s[1..s.len() - 1].to_string()))
    });
    g.terminal("+", r"\+")?;
    g.terminal("-", r"-")?;
    g.terminal("*", r"\*")?;
    g.terminal("/", r"/")?;
    g.terminal("varName", r"[A-Za-z_]\w*")?
        .action(|t| Ok(Value::from(t.lexeme.clone())));
    g.terminal("lineComment", "//.*")?.ignore();
    g.terminal("blockComment", r"/\*(?:[^*]|\*[^/])*\*/")?.ignore();

    g.non_terminal("START").rhs().symbols("STATEMENTS");

    let mut statements = g.non_terminal("STATEMENTS");
    statements.rhs().symbols("STATEMENTS STATEMENT");
    statements.rhs().symbols("STATEMENT");

    let mut statement = g.non_terminal("STATEMENT");
    statement.rhs().symbols("ASSIGN");
    statement.rhs().symbols("print EXPR").action(|ast, node| {
        let expr = ast.node(node).children[1];
        println!("{:?}", ast.node(expr).data);
        Ok(())
    });
    statement
        .rhs()
        .symbols("if EXPR {")
        .action(|_ast, _node| {
            log::trace!("entering if body");
            Ok(())
        })
        .symbols("STATEMENTS }")
        .action(|_ast, _node| {
            log::trace!("leaving if body");
            Ok(())
        });

    g.non_terminal("ASSIGN").rhs().symbols("STORAGE = EXPR").action({
        let variables = variables.clone();
        move |ast, node| {
            let storage = ast.node(node).children[0];
            let expr = ast.node(node).children[2];
            let name = ast.node(storage).data.as_str().unwrap().to_string();
            let value = ast.node(expr).data.clone();
            let cell = variables
                .borrow()
                .get(&name)
                .cloned()
                .expect("STORAGE always registers its variable slot first");
            *cell.borrow_mut() = value;
            Ok(())
        }
    });

    g.non_terminal("STORAGE").rhs().symbols("varName").action({
        let variables = variables.clone();
        move |ast, node| {
            let child = ast.node(node).children[0];
            let name = ast.node(child).data.as_str().unwrap().to_string();
            variables
                .borrow_mut()
                .entry(name.clone())
                .or_insert_with(|| Rc::new(RefCell::new(Value::Unit)));
            ast.node_mut(node).data = Value::Str(name);
            Ok(())
        }
    });

    let mut expr = g.non_terminal("EXPR");
    expr.rhs().symbols("TERM").action(|ast, node| {
        let term = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(term).data.clone();
        Ok(())
    });
    expr.rhs().symbols("EXPR ADD/SUB TERM").action(|ast, node| {
        let children = ast.node(node).children.clone();
        let lhs = ast.node(children[0]).data.clone();
        let op = BinOp::from_value(&ast.node(children[1]).data);
        let rhs = ast.node(children[2]).data.clone();
        let value = apply_binary_op(op, lhs, rhs).map_err(|reason| ast.error(node, reason))?;
        ast.node_mut(node).data = value;
        Ok(())
    });

    let mut term = g.non_terminal("TERM");
    term.rhs().symbols("FACTOR").action(|ast, node| {
        let factor = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(factor).data.clone();
        Ok(())
    });
    term.rhs().symbols("TERM MUL/DIV FACTOR").action(|ast, node| {
        let children = ast.node(node).children.clone();
        let lhs = ast.node(children[0]).data.clone();
        let op = BinOp::from_value(&ast.node(children[1]).data);
        let rhs = ast.node(children[2]).data.clone();
        let value = apply_binary_op(op, lhs, rhs).map_err(|reason| ast.error(node, reason))?;
        ast.node_mut(node).data = value;
        Ok(())
    });

    let mut factor = g.non_terminal("FACTOR");
    factor.rhs().symbols("VALUE").action(|ast, node| {
        let value = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(value).data.clone();
        Ok(())
    });
    factor.rhs().symbols("( EXPR )").action(|ast, node| {
        let expr = ast.node(node).children[1];
        ast.node_mut(node).data = ast.node(expr).data.clone();
        Ok(())
    });
    factor
        .rhs()
        .symbols("UNARY_OP FACTOR")
        .action(|ast, node| Err(ast.error(node, "unary ops not implemented")));

    let mut value = g.non_terminal("VALUE");
    value.rhs().symbols("varName").action({
        let variables = variables.clone();
        move |ast, node| {
            let child = ast.node(node).children[0];
            let name = ast.node(child).data.as_str().unwrap().to_string();
            let cell = variables.borrow().get(&name).cloned();
            match cell {
                Some(cell) => {
                    ast.node_mut(node).data = cell.borrow().clone();
                    Ok(())
                }
                None => Err(ast.error(node, format!("variable ({name}) is undefined"))),
            }
        }
    });
    value.rhs().symbols("bool").action(|ast, node| {
        let child = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(child).data.clone();
        Ok(())
    });
    value.rhs().symbols("integer").action(|ast, node| {
        let child = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(child).data.clone();
        Ok(())
    });
    value.rhs().symbols("string").action(|ast, node| {
        let child = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(child).data.clone();
        Ok(())
    });
    value.rhs().symbols("float").action(|ast, node| {
        let child = ast.node(node).children[0];
        ast.node_mut(node).data = ast.node(child).data.clone();
        Ok(())
    });

    let mut unary_op = g.non_terminal("UNARY_OP");
    unary_op.rhs().symbols("!");
    unary_op.rhs().symbols("-");

    let mut add_sub = g.non_terminal("ADD/SUB");
    add_sub.rhs().symbols("+").action(|ast, node| {
        ast.node_mut(node).data = BinOp::Add.as_value();
        Ok(())
    });
    add_sub.rhs().symbols("-").action(|ast, node| {
        ast.node_mut(node).data = BinOp::Sub.as_value();
        Ok(())
    });

    let mut mul_div = g.non_terminal("MUL/DIV");
    mul_div.rhs().symbols("*").action(|ast, node| {
        ast.node_mut(node).data = BinOp::Mul.as_value();
        Ok(())
    });
    mul_div.rhs().symbols("/").action(|ast, node| {
        ast.node_mut(node).data = BinOp::Div.as_value();
        Ok(())
    });

    g.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Parser;
    use crate::lr0::generate_parse_table;

    fn run(source: &str) -> Result<()> {
        let grammar = build()?;
        // The classic E -> E + T | T, T -> T * F | F shape needs lookahead
        // to resolve its shift/reduce choice without ambiguity; shift-wins
        // happens to be the correct resolution for left-associative binary
        // operators, so generation runs with conflicts ignored.
        let table = generate_parse_table(&grammar, true)?;
        let mut parser = Parser::new(&grammar, &table);
        parser.parse_str(source, "test").map(|_| ())
    }

    #[test]
    fn assigns_and_adds_integers() {
        run("x = 1 + 2").unwrap();
    }

    #[test]
    fn mixed_int_float_addition_promotes_to_float() {
        run("y = 1 + 2.5").unwrap();
    }

    #[test]
    fn parenthesized_precedence() {
        run("print 2 * (3 + 4)").unwrap();
    }

    #[test]
    fn undeclared_variable_is_a_production_action_error() {
        let err = run("z = a").unwrap_err();
        match err {
            crate::error::CfgError::ProductionActionError { .. } => {}
            other => panic!("expected ProductionActionError, got {other:?}"),
        }
    }

    #[test]
    fn truncated_expression_is_a_syntax_error() {
        let err = run("x = 1 + ").unwrap_err();
        match err {
            crate::error::CfgError::SyntaxError { expected, .. } => assert!(!expected.is_empty()),
            other => panic!("expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_byte_reports_its_location() {
        let err = run("@").unwrap_err();
        match err {
            crate::error::CfgError::UnrecognizedInput { location, .. } => {
                assert_eq!(location.row, 1);
                assert_eq!(location.column, 1);
            }
            other => panic!("expected UnrecognizedInput, got {other:?}"),
        }
    }
}
