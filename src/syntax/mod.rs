//! Syntax module: tokenizer, parser, and AST.

pub mod ast;
mod parser;
mod tensor;
mod token;

pub use ast::{BinOp, Call, Expr, FunctionDef, Nested, Prototype, Statement, TensorLiteral};
pub use parser::{parse, parse_source, Parser};
pub use tensor::MAX_TENSOR_DEPTH;
pub use token::{lex, tokenize, Lexed, Skipped, Token, TokenKind};
