//! Tensor literal sub-grammar.
//!
//! ```text
//! TensorLiteral := '[' numeral (',' numeral)* ']'
//!                | '[' TensorLiteral (',' TensorLiteral)* ']'
//! ```
//!
//! Shapes are computed bottom-up. A flat literal of `n` numerals has shape
//! `[n]`; a nested literal of `n` sub-literals has shape `[n] ++ inner`,
//! where every sub-literal must have produced the same `inner` shape.

use super::ast::TensorLiteral;
use super::parser::Parser;
use super::token::TokenKind;
use crate::error::{ParseResult, Production, SyntaxErrorKind};

/// Deepest tensor literal nesting accepted.
pub const MAX_TENSOR_DEPTH: usize = 256;

impl<'t> Parser<'t> {
    /// Parse a rectangular tensor literal starting at `[`.
    pub fn parse_tensor_literal(&mut self) -> ParseResult<TensorLiteral> {
        let mut values = Vec::new();
        let shape = self.parse_tensor_level(&mut values)?;
        Ok(TensorLiteral::new(values, shape))
    }

    /// Parse one bracketed level, appending its numerals to `values` and
    /// returning its shape.
    fn parse_tensor_level(&mut self, values: &mut Vec<String>) -> ParseResult<Vec<usize>> {
        if self.depth >= MAX_TENSOR_DEPTH {
            return Err(self.error_kind(
                Production::TensorLiteral,
                SyntaxErrorKind::NestingTooDeep(MAX_TENSOR_DEPTH),
            ));
        }
        self.expect(TokenKind::OpenBracket, Production::TensorLiteral, "`[`")?;

        self.depth += 1;
        let shape = if self.at(TokenKind::OpenBracket) {
            self.parse_nested_elements(values)
        } else {
            self.parse_flat_elements(values)
        };
        self.depth -= 1;
        shape
    }

    fn parse_flat_elements(&mut self, values: &mut Vec<String>) -> ParseResult<Vec<usize>> {
        let mut count = 0;
        loop {
            let numeral = self.expect(TokenKind::Numeral, Production::TensorLiteral, "a numeral")?;
            values.push(numeral.text().to_string());
            count += 1;

            if !self.close_or_continue()? {
                return Ok(vec![count]);
            }
        }
    }

    fn parse_nested_elements(&mut self, values: &mut Vec<String>) -> ParseResult<Vec<usize>> {
        let mut count = 0;
        let mut inner: Option<Vec<usize>> = None;
        loop {
            let start = self.position();
            let shape = self.parse_tensor_level(values)?;
            match &inner {
                Some(expected) if *expected != shape => {
                    // Point at the opening bracket of the offending sub-literal.
                    let mut err = self.error_kind(
                        Production::TensorLiteral,
                        SyntaxErrorKind::ShapeMismatch {
                            expected: expected.clone(),
                            got: shape,
                        },
                    );
                    err.token = self.token_at(start).clone();
                    return Err(err);
                }
                Some(_) => {}
                None => inner = Some(shape),
            }
            count += 1;

            if !self.close_or_continue()? {
                let mut shape = vec![count];
                shape.extend(inner.unwrap_or_default());
                return Ok(shape);
            }
        }
    }

    /// After an element: consume `,` and return true, or consume `]` and
    /// return false.
    fn close_or_continue(&mut self) -> ParseResult<bool> {
        match self.current().kind {
            TokenKind::Comma => {
                self.advance();
                Ok(true)
            }
            TokenKind::CloseBracket => {
                self.advance();
                Ok(false)
            }
            _ => Err(self.error(Production::TensorLiteral, "`,` or `]`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxError;
    use crate::syntax::tokenize;

    fn literal(source: &str) -> ParseResult<TensorLiteral> {
        let tokens = tokenize(source);
        let mut parser = Parser::new(&tokens);
        let tensor = parser.parse_tensor_literal()?;
        assert!(parser.current().is(TokenKind::Eof), "trailing tokens in {}", source);
        Ok(tensor)
    }

    fn literal_err(source: &str) -> SyntaxError {
        let tokens = tokenize(source);
        Parser::new(&tokens).parse_tensor_literal().unwrap_err()
    }

    #[test]
    fn test_flat_literal() {
        let t = literal("[1, 2, 3]").unwrap();
        assert_eq!(t.values, vec!["1", "2", "3"]);
        assert_eq!(t.shape, vec![3]);
    }

    #[test]
    fn test_single_element() {
        let t = literal("[7]").unwrap();
        assert_eq!(t.shape, vec![1]);
    }

    #[test]
    fn test_matrix_literal() {
        let t = literal("[[1, 2, 3], [4, 5, 6]]").unwrap();
        assert_eq!(t.values, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(t.shape, vec![2, 3]);
    }

    #[test]
    fn test_rank_three_literal() {
        let t = literal("[[[1],[2]],[[3],[4]],[[5],[6]]]").unwrap();
        assert_eq!(t.shape, vec![3, 2, 1]);
        assert_eq!(t.values.len(), 6);
    }

    #[test]
    fn test_jagged_literal_rejected() {
        let err = literal_err("[[1,2],[3]]");
        assert!(err.is_shape_mismatch());
        assert_eq!(err.production, Production::TensorLiteral);
        assert_eq!(
            err.kind,
            SyntaxErrorKind::ShapeMismatch {
                expected: vec![2],
                got: vec![1],
            }
        );
        assert_eq!(err.token.kind, TokenKind::OpenBracket);
    }

    #[test]
    fn test_mismatched_depth_rejected() {
        let err = literal_err("[[[1]],[2]]");
        assert!(err.is_shape_mismatch());
    }

    #[test]
    fn test_mixed_levels_rejected() {
        let err = literal_err("[[1],2]");
        assert_eq!(err.token.kind, TokenKind::Numeral);
        assert_eq!(err.production, Production::TensorLiteral);

        let err = literal_err("[1,[2]]");
        assert_eq!(err.token.kind, TokenKind::OpenBracket);
    }

    #[test]
    fn test_empty_and_trailing_comma_rejected() {
        let err = literal_err("[]");
        assert_eq!(err.token.kind, TokenKind::CloseBracket);

        let err = literal_err("[1, 2,]");
        assert_eq!(err.token.kind, TokenKind::CloseBracket);

        let err = literal_err("[[1],]");
        assert_eq!(err.token.kind, TokenKind::CloseBracket);
    }

    #[test]
    fn test_identifiers_rejected_in_literal() {
        let err = literal_err("[a, 1]");
        assert_eq!(err.token.kind, TokenKind::Identifier);
    }

    #[test]
    fn test_unterminated_literal() {
        let err = literal_err("[1, 2");
        assert_eq!(err.token.kind, TokenKind::Eof);
    }

    #[test]
    fn test_deepest_allowed_nesting() {
        let depth = MAX_TENSOR_DEPTH;
        let source = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
        let t = literal(&source).unwrap();
        assert_eq!(t.shape, vec![1; depth]);
        assert_eq!(t.values, vec!["1"]);
    }

    #[test]
    fn test_excessive_nesting_rejected() {
        let err = literal_err(&format!("{}1", "[".repeat(MAX_TENSOR_DEPTH + 1)));
        assert_eq!(err.kind, SyntaxErrorKind::NestingTooDeep(MAX_TENSOR_DEPTH));
        assert_eq!(err.token.kind, TokenKind::OpenBracket);
    }

    #[test]
    fn test_very_deep_literal_is_an_error() {
        let depth = 10_000;
        let source = format!(
            "def f() {{ var t = {}1{} }}",
            "[".repeat(depth),
            "]".repeat(depth)
        );
        let err = crate::syntax::parse_source(&source).unwrap_err();
        assert_eq!(err.production, Production::TensorLiteral);
        assert_eq!(err.kind, SyntaxErrorKind::NestingTooDeep(MAX_TENSOR_DEPTH));
    }

    #[test]
    fn test_shape_rederivation_is_stable() {
        for source in [
            "[5]",
            "[1, 2, 3, 4]",
            "[[1, 2], [3, 4], [5, 6]]",
            "[[[1, 2, 3]], [[4, 5, 6]]]",
        ] {
            let first = literal(source).unwrap();
            let rendered = first.to_source();
            assert_eq!(rendered, source);

            let second = literal(&rendered).unwrap();
            assert_eq!(second, first);
        }
    }
}
