//! Compiler diagnostics infrastructure.
//!
//! The pipeline has no error recovery: every stage returns at most one
//! diagnostic and compilation stops there. A [`Diagnostic`] carries the
//! stage that produced it (which fixes the process exit code), the primary
//! source span, and any notes to print after the main message.

mod printer;


pub use printer::DiagnosticPrinter;

use crate::span::Span;

/// Pipeline stage that produced a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Internal,
}

impl Stage {
    /// Process exit code for a fatal diagnostic from this stage.
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::Lex => 2,
            Stage::Parse => 3,
            Stage::Semantic => 4,
            Stage::Internal => 255,
        }
    }
}

/// Additional location or remark attached to a diagnostic, printed after
/// the primary message in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub span: Option<Span>,
    pub message: String,
}

/// A fatal compiler diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("error at {}..{}: {message}", .span.start, .span.end)]
pub struct Diagnostic {
    pub stage: Stage,
    pub span: Span,
    pub message: String,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    pub fn new(stage: Stage, span: Span, message: impl Into<String>) -> Self {
        Self {
            stage,
            span,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn lex(span: Span, message: impl Into<String>) -> Self {
        Self::new(Stage::Lex, span, message)
    }

    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self::new(Stage::Parse, span, message)
    }

    pub fn semantic(span: Span, message: impl Into<String>) -> Self {
        Self::new(Stage::Semantic, span, message)
    }

    /// An internal invariant was violated; reported with location, exit 255.
    pub fn internal(span: Span, message: impl Into<String>) -> Self {
        Self::new(Stage::Internal, span, message)
    }

    /// Attach a note; notes render after the primary message in order.
    pub fn with_note(mut self, span: Option<Span>, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            span,
            message: message.into(),
        });
        self
    }

    /// Renderer for this diagnostic against its source text.
    pub fn printer<'a>(&'a self, source: &'a str, path: &'a str) -> DiagnosticPrinter<'a> {
        DiagnosticPrinter::new(self, source, path)
    }
}
