//! Renders a diagnostic as an annotated source snippet.

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use crate::span::Span;

use super::Diagnostic;

/// Builder for rendering a single fatal diagnostic.
///
/// Produces the `path:line:col` origin line plus a caret-underlined source
/// snippet; notes with spans become context annotations on the snippet,
/// spanless notes become trailing note titles.
pub struct DiagnosticPrinter<'a> {
    diagnostic: &'a Diagnostic,
    source: &'a str,
    path: &'a str,
    colored: bool,
}

impl<'a> DiagnosticPrinter<'a> {
    pub fn new(diagnostic: &'a Diagnostic, source: &'a str, path: &'a str) -> Self {
        Self {
            diagnostic,
            source,
            path,
            colored: false,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let range = adjust_range(self.diagnostic.span, self.source.len());

        let mut snippet = Snippet::source(self.source).line_start(1).path(self.path).annotation(
            AnnotationKind::Primary
                .span(range)
                .label(&self.diagnostic.message),
        );

        for note in &self.diagnostic.notes {
            if let Some(span) = note.span {
                snippet = snippet.annotation(
                    AnnotationKind::Context
                        .span(adjust_range(span, self.source.len()))
                        .label(&note.message),
                );
            }
        }

        let title_group = Level::ERROR
            .primary_title(&self.diagnostic.message)
            .element(snippet);

        let mut report: Vec<Group> = vec![title_group];

        for note in &self.diagnostic.notes {
            if note.span.is_none() {
                report.push(Group::with_title(Level::NOTE.secondary_title(&note.message)));
            }
        }

        renderer.render(&report)
    }
}

/// Empty spans are widened by one byte so the caret has something to sit on.
fn adjust_range(span: Span, limit: usize) -> std::ops::Range<usize> {
    let range = span.range();
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range
}
