//! Recursive-descent parser for Kaleido.
//!
//! One method per grammar production. The cursor belongs to the [`Parser`]
//! value and only moves forward; the first malformed construct aborts the
//! parse with a [`SyntaxError`].
//!
//! Expressions apply at most one binary operator:
//!
//! ```text
//! Expression := Primary (ArithOp Primary)?
//! Primary    := TensorLiteral | identifier '(' Args ')' | identifier
//! ```

use tracing::{debug, trace};

use super::ast::{BinOp, Call, Expr, FunctionDef, Prototype, Statement};
use super::token::{tokenize, Token, TokenKind};
use crate::error::{ParseResult, Production, SyntaxError, SyntaxErrorKind};

/// Stands in for any read past the end of the token slice.
static EOF: Token = Token {
    kind: TokenKind::Eof,
    lexeme: None,
    line: 0,
};

/// Parser state for a single parse over a borrowed token slice.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Open `[` levels of the tensor literal being parsed.
    pub(super) depth: usize,
}

impl<'t> Parser<'t> {
    /// Create a parser positioned at the first token.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Index of the current token.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub(super) fn current(&self) -> &'t Token {
        self.peek(0)
    }

    /// Look `offset` tokens past the current one.
    pub(super) fn peek(&self, offset: usize) -> &'t Token {
        self.tokens.get(self.pos + offset).unwrap_or(&EOF)
    }

    pub(super) fn token_at(&self, index: usize) -> &'t Token {
        self.tokens.get(index).unwrap_or(&EOF)
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token and return it.
    pub(super) fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        trace!(pos = self.pos, next = %self.current(), "advance");
        token
    }

    pub(super) fn error(&self, production: Production, expected: &'static str) -> SyntaxError {
        SyntaxError::expected(self.current().clone(), production, expected)
    }

    pub(super) fn error_kind(&self, production: Production, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.current().clone(), production, kind)
    }

    /// Consume a token of `kind` or fail.
    pub(super) fn expect(
        &mut self,
        kind: TokenKind,
        production: Production,
        expected: &'static str,
    ) -> ParseResult<&'t Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(production, expected))
        }
    }

    fn expect_identifier(
        &mut self,
        production: Production,
        expected: &'static str,
    ) -> ParseResult<String> {
        let token = self.expect(TokenKind::Identifier, production, expected)?;
        Ok(token.text().to_string())
    }

    /// Parse a whole program: zero or more function definitions.
    pub fn parse_program(&mut self) -> ParseResult<Vec<FunctionDef>> {
        let mut defs = Vec::new();
        while !self.at(TokenKind::Eof) {
            if !self.at(TokenKind::Def) {
                return Err(self.error(Production::Program, "`def`"));
            }
            let def = self.parse_definition()?;
            debug!(name = %def.proto.name, statements = def.body.len(), "parsed definition");
            defs.push(def);
        }
        Ok(defs)
    }

    /// `'def' Prototype '{' StatementList '}'`
    pub fn parse_definition(&mut self) -> ParseResult<FunctionDef> {
        self.expect(TokenKind::Def, Production::Definition, "`def`")?;
        let proto = self.parse_prototype()?;
        self.expect(TokenKind::OpenBrace, Production::Definition, "`{`")?;
        let body = self.parse_statement_list()?;
        self.expect(TokenKind::CloseBrace, Production::Definition, "`}`")?;
        Ok(FunctionDef { proto, body })
    }

    /// `identifier '(' (identifier (',' identifier)*)? ')'`
    pub fn parse_prototype(&mut self) -> ParseResult<Prototype> {
        let name = self.expect_identifier(Production::Prototype, "function name")?;
        self.expect(TokenKind::OpenParen, Production::Prototype, "`(`")?;

        let mut params = Vec::new();
        if !self.at(TokenKind::CloseParen) {
            loop {
                params.push(self.expect_identifier(Production::Prototype, "parameter name")?);
                match self.current().kind {
                    TokenKind::Comma => {
                        self.advance();
                    }
                    TokenKind::CloseParen => break,
                    _ => return Err(self.error(Production::Prototype, "`,` or `)`")),
                }
            }
        }
        self.expect(TokenKind::CloseParen, Production::Prototype, "`)`")?;

        Ok(Prototype { name, params })
    }

    /// `'extern' Prototype`
    ///
    /// Not reachable from [`Parser::parse_program`], which only accepts `def`.
    pub fn parse_extern(&mut self) -> ParseResult<Prototype> {
        self.expect(TokenKind::Extern, Production::Extern, "`extern`")?;
        self.parse_prototype()
    }

    /// Statements up to, but not including, the closing `}`.
    fn parse_statement_list(&mut self) -> ParseResult<Vec<Statement>> {
        let mut stmts = Vec::new();
        loop {
            while self.at(TokenKind::Semicolon) {
                self.advance();
            }
            let stmt = match self.current().kind {
                TokenKind::CloseBrace => return Ok(stmts),
                TokenKind::Var => self.parse_var_decl()?,
                TokenKind::Return => self.parse_return()?,
                TokenKind::Identifier if self.peek(1).is(TokenKind::Assign) => {
                    self.parse_assign()?
                }
                TokenKind::Identifier if self.peek(1).is(TokenKind::OpenParen) => {
                    Statement::Call(self.parse_call()?)
                }
                _ => return Err(self.error(Production::StatementList, "a statement or `}`")),
            };
            stmts.push(stmt);
        }
    }

    /// `'var' identifier ('<' ShapeList '>')? ('=' Expression)?`
    fn parse_var_decl(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Var, Production::VarDecl, "`var`")?;
        let name = self.expect_identifier(Production::VarDecl, "variable name")?;

        let shape = if self.at(TokenKind::OpenAngle) {
            Some(self.parse_shape_specifier()?)
        } else {
            None
        };

        let init = if self.at(TokenKind::Assign) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Statement::VarDecl { name, init, shape })
    }

    /// `'<' (entry (',' entry)*)? '>'`
    ///
    /// Numeral entries become dimensions. Any other single token in entry
    /// position is dropped from the shape instead of being rejected.
    /// `<>` is accepted as an empty shape.
    fn parse_shape_specifier(&mut self) -> ParseResult<Vec<usize>> {
        self.expect(TokenKind::OpenAngle, Production::ShapeSpecifier, "`<`")?;

        let mut shape = Vec::new();
        // `<>`: rank-0 shape.
        if self.at(TokenKind::CloseAngle) {
            self.advance();
            return Ok(shape);
        }

        loop {
            let entry = self.current();
            match entry.kind {
                TokenKind::Numeral => {
                    let dim = entry.text().parse::<usize>().map_err(|_| {
                        self.error_kind(
                            Production::ShapeSpecifier,
                            SyntaxErrorKind::DimensionOverflow(entry.text().to_string()),
                        )
                    })?;
                    shape.push(dim);
                }
                TokenKind::Eof | TokenKind::CloseAngle => {
                    return Err(self.error(Production::ShapeSpecifier, "a dimension"));
                }
                _ => {
                    debug!(
                        line = entry.line,
                        entry = %entry.describe(),
                        "dropping non-numeral shape entry"
                    );
                }
            }
            self.advance();

            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::CloseAngle => {
                    self.advance();
                    return Ok(shape);
                }
                _ => return Err(self.error(Production::ShapeSpecifier, "`,` or `>`")),
            }
        }
    }

    /// `'return' Expression`
    fn parse_return(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Return, Production::Return, "`return`")?;
        Ok(Statement::Return(self.parse_expression()?))
    }

    /// `identifier '=' Expression`
    fn parse_assign(&mut self) -> ParseResult<Statement> {
        let target = self.expect_identifier(Production::Assign, "assignment target")?;
        self.expect(TokenKind::Assign, Production::Assign, "`=`")?;
        let value = self.parse_expression()?;
        Ok(Statement::Assign { target, value })
    }

    /// `identifier '(' (Expression (',' Expression)* ','?)? ')'`
    fn parse_call(&mut self) -> ParseResult<Call> {
        let callee = self.expect_identifier(Production::Call, "function name")?;
        self.expect(TokenKind::OpenParen, Production::Call, "`(`")?;

        let mut args = Vec::new();
        loop {
            if self.at(TokenKind::CloseParen) {
                self.advance();
                break;
            }
            args.push(self.parse_expression()?);
            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::CloseParen => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error(Production::Call, "`,` or `)`")),
            }
        }

        Ok(Call { callee, args })
    }

    /// `Primary (ArithOp Primary)?` followed by an expression terminator.
    ///
    /// A second operator is an error: `a + b + c` does not parse.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_operand()?;
        if self.at_expression_end() {
            Ok(expr)
        } else {
            Err(self.error(
                Production::Expression,
                "`;`, `,`, `)`, `}` or the start of a statement",
            ))
        }
    }

    /// `Primary (ArithOp Primary)?` without the terminator check.
    fn parse_operand(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_primary()?;
        if !self.at(TokenKind::ArithOp) {
            return Ok(lhs);
        }

        let op_token = self.advance();
        let op = BinOp::from_lexeme(op_token.text()).ok_or_else(|| {
            SyntaxError::expected(op_token.clone(), Production::Expression, "`+`, `-`, `*` or `/`")
        })?;
        let rhs = self.parse_primary()?;

        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Tokens that may follow a complete expression: a separator, or the
    /// start of the next statement, or the end of the block.
    fn at_expression_end(&self) -> bool {
        match self.current().kind {
            TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::CloseParen
            | TokenKind::CloseBrace
            | TokenKind::Var
            | TokenKind::Return => true,
            TokenKind::Identifier => matches!(
                self.peek(1).kind,
                TokenKind::Assign | TokenKind::OpenParen
            ),
            _ => false,
        }
    }

    /// Tensor literal, call, or variable reference.
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current().kind {
            TokenKind::OpenBracket => Ok(Expr::Tensor(self.parse_tensor_literal()?)),
            TokenKind::Identifier if self.peek(1).is(TokenKind::OpenParen) => {
                Ok(Expr::Call(self.parse_call()?))
            }
            TokenKind::Identifier => {
                let name = self.advance().text().to_string();
                Ok(Expr::Variable(name))
            }
            _ => Err(self.error(
                Production::Primary,
                "a tensor literal, call or variable",
            )),
        }
    }

    /// `'if' Operand 'then' Operand 'else' Expression`
    ///
    /// Standalone entry point; statements never reach it.
    pub fn parse_conditional(&mut self) -> ParseResult<Expr> {
        self.expect(TokenKind::If, Production::Conditional, "`if`")?;
        let cond = self.parse_operand()?;
        self.expect(TokenKind::Then, Production::Conditional, "`then`")?;
        let then_branch = self.parse_operand()?;
        self.expect(TokenKind::Else, Production::Conditional, "`else`")?;
        let else_branch = self.parse_expression()?;

        Ok(Expr::Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// A bare numeral. Standalone entry point; `Primary` never reaches it.
    pub fn parse_number_literal(&mut self) -> ParseResult<Expr> {
        let token = self.expect(TokenKind::Numeral, Production::NumberLiteral, "a numeral")?;
        Ok(Expr::Number(token.text().to_string()))
    }
}

/// Parse a token stream into its function definitions.
pub fn parse(tokens: &[Token]) -> ParseResult<Vec<FunctionDef>> {
    Parser::new(tokens).parse_program()
}

/// Tokenize and parse `source`.
pub fn parse_source(source: &str) -> ParseResult<Vec<FunctionDef>> {
    let tokens = tokenize(source);
    parse(&tokens)
}
