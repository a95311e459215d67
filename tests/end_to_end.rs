//! End-to-end scenarios over the example arithmetic/assignment language,
//! run through the public crate API rather than module internals.

use gramlr::demo::lang;
use gramlr::{CfgError, Parser, generate_parse_table};

fn parse(source: &str) -> gramlr::Result<()> {
    let grammar = lang::build()?;
    // This grammar's E -> E + T | T, T -> T * F | F shape is only SLR(1),
    // not LR(0) clean; shift-wins is the correct resolution for
    // left-associative operators, so conflicts are ignored here.
    let table = generate_parse_table(&grammar, true)?;
    Parser::new(&grammar, &table)
        .parse_str(source, "test.lang")
        .map(|_| ())
}

#[test]
fn integer_assignment_succeeds() {
    parse("x = 1 + 2").unwrap();
}

#[test]
fn mixed_type_assignment_promotes_to_float() {
    parse("y = 1 + 2.5").unwrap();
}

#[test]
fn precedence_through_parentheses_succeeds() {
    parse("print 2 * (3 + 4)").unwrap();
}

#[test]
fn undeclared_variable_fails_during_traversal() {
    let err = parse("z = a").unwrap_err();
    match err {
        CfgError::ProductionActionError { source, .. } => {
            assert!(source.to_string().contains("variable (a) is undefined"));
        }
        other => panic!("expected ProductionActionError, got {other:?}"),
    }
}

#[test]
fn truncated_input_fails_with_non_empty_expected_list() {
    let err = parse("x = 1 + ").unwrap_err();
    match err {
        CfgError::SyntaxError { expected, .. } => assert!(!expected.is_empty()),
        other => panic!("expected SyntaxError, got {other:?}"),
    }
}

#[test]
fn unrecognized_byte_is_located_at_row_one_column_one() {
    let err = parse("@").unwrap_err();
    match err {
        CfgError::UnrecognizedInput { location, lexeme } => {
            assert_eq!(location.row, 1);
            assert_eq!(location.column, 1);
            assert_eq!(lexeme, "@");
        }
        other => panic!("expected UnrecognizedInput, got {other:?}"),
    }
}
