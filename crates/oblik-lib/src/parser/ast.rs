//! Abstract syntax tree: named trees of properties.

use crate::span::Span;

/// Globally unique property identifier, assigned by the parser in
/// declaration order and never reused within a compilation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(pub u64);

/// A named binding inside an object: `name = value ;`.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub id: PropId,
    pub name: String,
    pub name_span: Span,
    pub value: Element,
}

/// A value expression with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    Int(i64),
    Str(String),
    /// Bare reference to another property.
    Id(String),
    /// Record of nested properties.
    Properties(Vec<Property>),
    /// Field-access chain `head.field...`; always at least two names.
    Access(Vec<String>),
}

impl Element {
    pub fn as_properties(&self) -> Option<&[Property]> {
        match &self.kind {
            ElementKind::Properties(props) => Some(props),
            _ => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, ElementKind::Properties(_))
    }
}

/// A parsed compilation unit: the top-level properties live in a synthetic
/// root record spanning the whole source.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast {
    pub root: Element,
    /// Number of properties parsed; ids are `0..property_count`.
    pub property_count: u64,
}

impl Ast {
    pub fn root_properties(&self) -> &[Property] {
        self.root.as_properties().unwrap_or(&[])
    }
}
