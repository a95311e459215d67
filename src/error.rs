//! Error types for the grammar condenser, table generator, lexer, and parse driver.

use thiserror::Error;

/// A source location: which file, which row/column (both 1-based).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: String,
    pub row: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            row,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.column)
    }
}

/// Errors that can occur while building, condensing, generating tables for, or
/// running a grammar.
#[derive(Error, Debug)]
pub enum CfgError {
    /// Condensation found RHS names with no terminal/non-terminal definition.
    #[error("the following symbols are undefined in the grammar: {}", .0.join(", "))]
    UndefinedSymbols(Vec<String>),

    /// LR(0) table generation found shift/reduce or reduce/reduce conflicts.
    #[error("grammar conflicts:\n{0}")]
    GrammarConflicts(String),

    /// The lexer matched the `Undefined` fallback terminal.
    #[error("[Error] In {}: At {}:{} | unrecognized symbol: {lexeme}", .location.file, .location.row, .location.column)]
    UnrecognizedInput { location: Location, lexeme: String },

    /// No non-error parse table entry for the current state/symbol pair.
    #[error("[Error] In {}: At {}:{} | {message}", .location.file, .location.row, .location.column)]
    SyntaxError {
        location: Location,
        found: String,
        found_lexeme: Option<String>,
        expected: Vec<String>,
        message: String,
    },

    /// A user lexeme action returned an error.
    #[error("[Error] In {}: At {}:{} | lexeme action failed: {source}", .location.file, .location.row, .location.column)]
    LexemeActionError {
        location: Location,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A user production action returned an error during traversal.
    #[error("[Error] In {}: At {}:{} | {source}", .location.file, .location.row, .location.column)]
    ProductionActionError {
        location: Location,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `Parser::parse_file` failed to read its input.
    #[error("IO error: {0}")]
    ReadError(#[from] std::io::Error),

    /// A terminal's regex source failed to compile.
    #[error("invalid terminal regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

impl CfgError {
    /// Builds a syntax error, filling in the dedicated messages for EOF and for
    /// states with no expected terminals (a malformed-grammar hint).
    pub fn syntax_error(
        location: Location,
        found: String,
        found_lexeme: Option<String>,
        found_is_eof: bool,
        expected: Vec<String>,
    ) -> Self {
        let message = if found_is_eof {
            "premature EOF".to_string()
        } else if expected.is_empty() {
            format!(
                "found {found}, but no terminal is valid here (the grammar is likely malformed)"
            )
        } else {
            format!("found {found}, expected one of: {}", expected.join(", "))
        };
        CfgError::SyntaxError {
            location,
            found,
            found_lexeme,
            expected,
            message,
        }
    }

    /// Builds a production-action error located at `location`, boxing the cause.
    pub fn production_action_error(
        location: Location,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CfgError::ProductionActionError {
            location,
            source: Box::new(source),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CfgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premature_eof_message() {
        let e = CfgError::syntax_error(
            Location::new("text", 1, 5),
            "EndOfFile".to_string(),
            None,
            true,
            vec!["+".to_string()],
        );
        assert!(e.to_string().contains("premature EOF"));
    }

    #[test]
    fn malformed_grammar_hint() {
        let e = CfgError::syntax_error(
            Location::new("text", 2, 1),
            "x".to_string(),
            Some("x".to_string()),
            false,
            vec![],
        );
        assert!(e.to_string().contains("malformed"));
    }
}
