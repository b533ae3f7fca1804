//! Token definitions and the tokenizer.
//!
//! Uses the `logos` crate for lexing. The raw logos tokens are mapped onto
//! [`Token`] records that keep the raw lexeme and the source line.

use std::fmt;
use std::ops::Range;

use logos::{Lexer, Logos, Skip};
use tracing::warn;

/// Closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,

    // Keywords
    Def,
    Extern,
    If,
    Else,
    Then,
    Var,
    Return,

    Identifier,
    Numeral,
    /// One of `+ - * /`
    ArithOp,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenAngle,
    CloseAngle,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Assign,
}

impl TokenKind {
    /// Source spelling for fixed tokens, a category name for the rest.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Def => "def",
            TokenKind::Extern => "extern",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Then => "then",
            TokenKind::Var => "var",
            TokenKind::Return => "return",
            TokenKind::Identifier => "identifier",
            TokenKind::Numeral => "numeral",
            TokenKind::ArithOp => "arithmetic operator",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenAngle => "<",
            TokenKind::CloseAngle => ">",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Assign => "=",
        }
    }

    /// Kinds whose tokens carry a lexeme.
    pub fn has_lexeme(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier | TokenKind::Numeral | TokenKind::ArithOp
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token: kind, raw lexeme (identifiers, numerals and operators only) and
/// 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<String>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Option<String>, line: usize) -> Self {
        Self { kind, lexeme, line }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Lexeme text, or the empty string for fixed tokens.
    pub fn text(&self) -> &str {
        self.lexeme.as_deref().unwrap_or("")
    }

    /// Short description used in diagnostics.
    pub fn describe(&self) -> String {
        match (self.kind, self.lexeme.as_deref()) {
            (TokenKind::Eof, _) => "end of input".to_string(),
            (TokenKind::Identifier, Some(name)) => format!("identifier `{}`", name),
            (TokenKind::Numeral, Some(digits)) => format!("numeral `{}`", digits),
            (_, Some(text)) => format!("`{}`", text),
            (kind, None) => format!("`{}`", kind),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} : {} : {}",
            self.kind,
            self.lexeme.as_deref().unwrap_or("None"),
            self.line
        )
    }
}

/// A character the tokenizer discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub text: String,
    pub line: usize,
    pub span: Range<usize>,
}

/// Tokenizer output together with the discarded characters.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub skipped: Vec<Skipped>,
}

fn newline(lex: &mut Lexer<RawToken>) -> Skip {
    lex.extras += 1;
    Skip
}

/// Raw lexemes recognized by logos. `extras` is the current line.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(extras = usize)]
#[logos(skip r"[ \t\x0B\x0C]+")]
#[logos(skip r"#[^\r\n]*")]
enum RawToken {
    #[regex(r"\r\n|\r|\n", newline)]
    Newline,

    #[token("def")]
    Def,
    #[token("extern")]
    Extern,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("then")]
    Then,
    #[token("var")]
    Var,
    #[token("return")]
    Return,

    #[regex(r"\p{Alphabetic}[\p{Alphabetic}\p{Nd}_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Numeral,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    ArithOp,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
}

impl RawToken {
    /// `None` for line terminators, which their callback skips.
    fn kind(self) -> Option<TokenKind> {
        let kind = match self {
            RawToken::Newline => return None,
            RawToken::Def => TokenKind::Def,
            RawToken::Extern => TokenKind::Extern,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::Then => TokenKind::Then,
            RawToken::Var => TokenKind::Var,
            RawToken::Return => TokenKind::Return,
            RawToken::Ident => TokenKind::Identifier,
            RawToken::Numeral => TokenKind::Numeral,
            RawToken::ArithOp => TokenKind::ArithOp,
            RawToken::LParen => TokenKind::OpenParen,
            RawToken::RParen => TokenKind::CloseParen,
            RawToken::LAngle => TokenKind::OpenAngle,
            RawToken::RAngle => TokenKind::CloseAngle,
            RawToken::LBrace => TokenKind::OpenBrace,
            RawToken::RBrace => TokenKind::CloseBrace,
            RawToken::LBracket => TokenKind::OpenBracket,
            RawToken::RBracket => TokenKind::CloseBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Eq => TokenKind::Assign,
        };
        Some(kind)
    }
}

/// Scan `source` into tokens, also returning the characters that were
/// discarded along the way.
pub fn lex(source: &str) -> Lexed {
    let mut lexer = RawToken::lexer_with_extras(source, 1);
    let mut lexed = Lexed::default();

    while let Some(raw) = lexer.next() {
        let line = lexer.extras;
        match raw {
            Ok(raw) => {
                if let Some(kind) = raw.kind() {
                    let lexeme = kind.has_lexeme().then(|| lexer.slice().to_string());
                    lexed.tokens.push(Token::new(kind, lexeme, line));
                }
            }
            Err(()) => {
                let span = lexer.span();
                let text = String::from_utf8_lossy(&source.as_bytes()[span.clone()]).into_owned();
                warn!(line, character = %text, "skipping unrecognized character");
                lexed.skipped.push(Skipped { text, line, span });
            }
        }
    }

    lexed
        .tokens
        .push(Token::new(TokenKind::Eof, None, lexer.extras));
    lexed
}

/// Scan `source` into tokens terminated by a single end-of-input token.
///
/// Never fails: unrecognized characters are dropped.
pub fn tokenize(source: &str) -> Vec<Token> {
    lex(source).tokens
}
