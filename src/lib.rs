//! Kaleido: a front end for a small tensor expression language
//!
//! Source text goes through two stages:
//!
//! 1. [`tokenize`] scans the text into [`Token`]s, ending with one
//!    end-of-input token. Unrecognized characters are dropped, never fatal.
//! 2. [`parse`] runs a recursive-descent [`Parser`] over the tokens and
//!    returns the program's [`FunctionDef`]s, or the first [`SyntaxError`].
//!
//! ```text
//! def g() { var t<2,2> = [[1,2],[3,4]] return t }
//! ```

pub mod error;
pub mod syntax;

pub use error::{KaleidoError, ParseResult, Production, Result, SyntaxError, SyntaxErrorKind};
pub use syntax::{
    lex, parse, parse_source, tokenize, Expr, FunctionDef, Parser, Prototype, Statement,
    TensorLiteral, Token, TokenKind,
};
