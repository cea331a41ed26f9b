//! Recursive descent parser for the oblik grammar.
//!
//! ```text
//! program     := property*
//! property    := NAME '=' object ';'
//! object      := free-params? body
//! free-params := NAME+ '>'
//! body        := '{' property* '}'
//!              | NAME copy-tail*
//!              | INTEGER
//!              | STRING
//! copy-tail   := '.' NAME
//!              | '(' (object (',' object)*)? ')'
//! ```
//!
//! The parser is fatal-first: the first mismatch aborts with a diagnostic
//! listing the acceptable tokens. Free parameters (`a b > ...`) and
//! application tails (`f(x)`) are recognized grammatically but rejected with
//! a clear "not supported yet" diagnostic until the feature is designed.

mod ast;

#[cfg(test)]
mod parser_tests;

pub use ast::{Ast, Element, ElementKind, PropId, Property};

use crate::diagnostics::Diagnostic;
use crate::lexer::{self, Token};
use crate::span::Span;

/// Parse a full compilation unit.
pub fn parse(source: &str) -> Result<Ast, Diagnostic> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        next_id: 0,
        eof_span: Span::point(source.len() as u32),
    };

    let properties = parser.parse_properties_until_eof()?;
    let root = Element {
        kind: ElementKind::Properties(properties),
        span: Span::new(0, source.len() as u32),
    };

    Ok(Ast {
        root,
        property_count: parser.next_id,
    })
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    next_id: u64,
    eof_span: Span,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(token, _)| token)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(self.eof_span, |&(_, span)| span)
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let entry = self.tokens.get(self.pos).cloned();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    fn fresh_id(&mut self) -> PropId {
        let id = PropId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Diagnostic naming every acceptable alternative, per the grammar rule
    /// that failed.
    fn expected(&self, expected: &[&str]) -> Diagnostic {
        let found = self
            .peek()
            .map_or("end of file", |token| token.describe());
        let list = match expected {
            [single] => (*single).to_string(),
            [head @ .., last] => format!("{} or {last}", head.join(", ")),
            [] => unreachable!("expected set is never empty"),
        };
        Diagnostic::parse(
            self.current_span(),
            format!("expected {list}, found {found}"),
        )
    }

    fn expect_assign(&mut self) -> Result<(), Diagnostic> {
        match self.peek() {
            Some(Token::Assign) => {
                self.bump();
                Ok(())
            }
            _ => Err(self.expected(&["'='"])),
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), Diagnostic> {
        match self.peek() {
            Some(Token::Semicolon) => {
                self.bump();
                Ok(())
            }
            _ => Err(self.expected(&["';'"])),
        }
    }

    fn expect_name(&mut self, expected: &[&str]) -> Result<(String, Span), Diagnostic> {
        match self.peek() {
            Some(Token::Name(_)) => {
                let Some((Token::Name(name), span)) = self.bump() else {
                    unreachable!("peeked a name");
                };
                Ok((name, span))
            }
            _ => Err(self.expected(expected)),
        }
    }

    fn parse_properties_until_eof(&mut self) -> Result<Vec<Property>, Diagnostic> {
        let mut properties = Vec::new();
        while self.peek().is_some() {
            match self.peek() {
                Some(Token::Name(_)) => properties.push(self.parse_property()?),
                _ => return Err(self.expected(&["a property name", "end of file"])),
            }
        }
        Ok(properties)
    }

    /// `property := NAME '=' object ';'`
    fn parse_property(&mut self) -> Result<Property, Diagnostic> {
        let (name, name_span) = self.expect_name(&["a property name"])?;
        let id = self.fresh_id();
        self.expect_assign()?;
        let value = self.parse_object()?;
        self.expect_semicolon()?;
        Ok(Property {
            id,
            name,
            name_span,
            value,
        })
    }

    /// `object := free-params? body`
    fn parse_object(&mut self) -> Result<Element, Diagnostic> {
        match self.peek() {
            Some(Token::Name(_)) => {
                // A leading name is either a free-parameter list or the head
                // of a copy chain; one token of lookahead decides.
                match self.peek_nth(1) {
                    Some(Token::Name(_)) | Some(Token::GreaterThan) => {
                        let span = self.current_span();
                        Err(Diagnostic::parse(
                            span,
                            "free parameters are not supported yet",
                        ))
                    }
                    _ => self.parse_copy_chain(),
                }
            }
            Some(Token::OpenBrace) => self.parse_record(),
            Some(Token::Int(_)) => {
                let Some((Token::Int(value), span)) = self.bump() else {
                    unreachable!("peeked an integer");
                };
                Ok(Element {
                    kind: ElementKind::Int(value),
                    span,
                })
            }
            Some(Token::Str(_)) => {
                let Some((Token::Str(value), span)) = self.bump() else {
                    unreachable!("peeked a string");
                };
                Ok(Element {
                    kind: ElementKind::Str(value),
                    span,
                })
            }
            _ => Err(self.expected(&["a name", "'{'", "an integer", "a string"])),
        }
    }

    /// `NAME copy-tail*` — a bare reference or a field-access chain.
    fn parse_copy_chain(&mut self) -> Result<Element, Diagnostic> {
        let (head, head_span) = self.expect_name(&["a name"])?;
        let mut names = vec![head];
        let mut span = head_span;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.bump();
                    let (name, name_span) = self.expect_name(&["a property name"])?;
                    names.push(name);
                    span = span.join(name_span);
                }
                Some(Token::OpenParen) => {
                    return Err(Diagnostic::parse(
                        self.current_span(),
                        "object application is not supported yet",
                    ));
                }
                _ => break,
            }
        }

        let kind = if names.len() == 1 {
            let mut names = names;
            ElementKind::Id(names.pop().expect("head name is present"))
        } else {
            ElementKind::Access(names)
        };
        Ok(Element { kind, span })
    }

    /// `'{' property* '}'`
    fn parse_record(&mut self) -> Result<Element, Diagnostic> {
        let Some((Token::OpenBrace, open_span)) = self.bump() else {
            unreachable!("peeked '{{'");
        };

        let mut properties = Vec::new();
        loop {
            match self.peek() {
                Some(Token::CloseBrace) => {
                    let Some((_, close_span)) = self.bump() else {
                        unreachable!("peeked '}}'");
                    };
                    return Ok(Element {
                        kind: ElementKind::Properties(properties),
                        span: open_span.join(close_span),
                    });
                }
                Some(Token::Name(_)) => properties.push(self.parse_property()?),
                _ => return Err(self.expected(&["a property name", "'}'"])),
            }
        }
    }
}
