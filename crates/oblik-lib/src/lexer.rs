//! Token definitions and lexing for oblik source.
//!
//! Lexing is fatal-first: the whole source is tokenized up front and the
//! first unexpected byte, bad escape, or unterminated string aborts with a
//! lex diagnostic.

use logos::Logos;

use crate::diagnostics::Diagnostic;
use crate::span::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("=")]
    Assign,

    #[token("...")]
    DotDotDot,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token(">")]
    GreaterThan,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""(?:[^"\\\n]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Name(String),
}

impl Token {
    /// Human-readable token description for expected-token diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Token::Assign => "'='",
            Token::DotDotDot => "'...'",
            Token::Dot => "'.'",
            Token::Comma => "','",
            Token::Semicolon => "';'",
            Token::OpenBrace => "'{'",
            Token::CloseBrace => "'}'",
            Token::OpenParen => "'('",
            Token::CloseParen => "')'",
            Token::GreaterThan => "'>'",
            Token::Int(_) => "an integer",
            Token::Str(_) => "a string",
            Token::Name(_) => "a name",
        }
    }
}

/// Lex the entire source, or fail on the first lexical error.
pub fn lex(source: &str) -> Result<Vec<(Token, Span)>, Diagnostic> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(lex_error(lexer.slice(), span)),
        }
    }

    Ok(tokens)
}

fn lex_error(slice: &str, span: Span) -> Diagnostic {
    let message = if slice.starts_with('"') {
        if slice.len() > 1 && slice.ends_with('"') {
            "invalid escape sequence in string"
        } else {
            "unterminated string"
        }
    } else if slice.starts_with(|c: char| c.is_ascii_digit()) {
        "integer literal out of range"
    } else {
        "unexpected character"
    };
    Diagnostic::lex(span, message)
}

/// Strip the quotes and process escapes; `None` rejects the token.
fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            _ => return None,
        }
    }

    Some(out)
}
