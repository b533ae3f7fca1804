//! Error types for Kaleido.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::syntax::Token;

/// The main error type for Kaleido operations.
#[derive(Debug, Error)]
pub enum KaleidoError {
    /// The parser rejected the token stream
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A source file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for Kaleido operations.
pub type Result<T> = std::result::Result<T, KaleidoError>;

/// Result type for the grammar procedures.
pub type ParseResult<T> = std::result::Result<T, SyntaxError>;

/// Grammar production that detected a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Program,
    Definition,
    Prototype,
    Extern,
    StatementList,
    VarDecl,
    ShapeSpecifier,
    Return,
    Assign,
    Call,
    Expression,
    Primary,
    Conditional,
    NumberLiteral,
    TensorLiteral,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Production::Program => "program",
            Production::Definition => "function definition",
            Production::Prototype => "prototype",
            Production::Extern => "extern declaration",
            Production::StatementList => "statement list",
            Production::VarDecl => "variable declaration",
            Production::ShapeSpecifier => "shape specifier",
            Production::Return => "return statement",
            Production::Assign => "assignment",
            Production::Call => "call",
            Production::Expression => "expression",
            Production::Primary => "primary expression",
            Production::Conditional => "conditional expression",
            Production::NumberLiteral => "number literal",
            Production::TensorLiteral => "tensor literal",
        };
        f.write_str(name)
    }
}

/// What went wrong at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// A different token was required here
    #[error("expected {0}")]
    Expected(&'static str),

    /// Sibling sub-literals of a tensor literal have different shapes
    #[error("tensor sub-literal shapes differ: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },

    /// A shape dimension does not fit in `usize`
    #[error("dimension `{0}` is too large")]
    DimensionOverflow(String),

    /// Tensor literal nested deeper than the parser allows
    #[error("tensor literal nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

/// A fatal parse error: the offending token and the production that rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error in {production} at line {}: {kind}, found {}", .token.line, .token.describe())]
pub struct SyntaxError {
    pub token: Token,
    pub production: Production,
    pub kind: SyntaxErrorKind,
}

impl SyntaxError {
    pub fn new(token: Token, production: Production, kind: SyntaxErrorKind) -> Self {
        Self {
            token,
            production,
            kind,
        }
    }

    pub fn expected(token: Token, production: Production, expected: &'static str) -> Self {
        Self::new(token, production, SyntaxErrorKind::Expected(expected))
    }

    /// True if the error was a tensor shape mismatch.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self.kind, SyntaxErrorKind::ShapeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TokenKind;

    #[test]
    fn test_syntax_error_message() {
        let token = Token::new(TokenKind::ArithOp, Some("+".to_string()), 4);
        let err = SyntaxError::expected(token, Production::Expression, "`;`");
        assert_eq!(
            err.to_string(),
            "syntax error in expression at line 4: expected `;`, found `+`"
        );
    }

    #[test]
    fn test_shape_mismatch_message() {
        let token = Token::new(TokenKind::CloseBracket, None, 1);
        let err = SyntaxError::new(
            token,
            Production::TensorLiteral,
            SyntaxErrorKind::ShapeMismatch {
                expected: vec![2],
                got: vec![1],
            },
        );
        assert!(err.is_shape_mismatch());
        assert!(err.to_string().contains("expected [2], got [1]"));
    }

    #[test]
    fn test_nesting_too_deep_message() {
        let token = Token::new(TokenKind::OpenBracket, None, 2);
        let err = SyntaxError::new(
            token,
            Production::TensorLiteral,
            SyntaxErrorKind::NestingTooDeep(256),
        );
        assert!(err.to_string().contains("nested deeper than 256 levels"));
        assert!(!err.is_shape_mismatch());
    }

    #[test]
    fn test_syntax_error_converts() {
        let token = Token::new(TokenKind::Eof, None, 1);
        let err: KaleidoError = SyntaxError::expected(token, Production::Program, "`def`").into();
        assert!(matches!(err, KaleidoError::Syntax(_)));
        assert!(err.to_string().contains("end of input"));
    }
}
