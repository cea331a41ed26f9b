//! oblik: a compiler for a small declarative object language.
//!
//! Source text describes objects: named trees of properties whose values
//! are integers, strings, references, records, or field-access chains. The
//! pipeline lexes and parses the source, resolves names into an object
//! graph, schedules strongly connected groups of properties dependencies
//! first, infers types by unification, and lowers the result to a QBE-shaped
//! textual IR.
//!
//! # Example
//!
//! ```
//! let ir = oblik_lib::compile_to_ir("x = 1;").expect("well-typed program");
//! assert!(ir.contains("$stack_pack"));
//! ```
//!
//! Compilation is fatal-first: the first error aborts with a [`Diagnostic`]
//! carrying the stage, span, and message.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod diagnostics;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod qbe;
mod span;

#[cfg(test)]
mod lib_tests;

pub use diagnostics::{Diagnostic, Note, Stage};
pub use span::Span;

/// Compile source text all the way to textual IR.
///
/// Runs lex, parse, analysis (name resolution, dependency ordering, type
/// inference), lowering, and IR type synthesis for every property in group
/// order.
pub fn compile_to_ir(source: &str) -> Result<String, Diagnostic> {
    let ast = parser::parse(source)?;
    let analysis = analyze::analyze(&ast)?;

    // Synthesize an IR type for every property in group order; an abstract
    // type (a variable the substitution never grounded) is fatal here.
    let mut program = qbe::Program::new();
    for group in &analysis.order {
        for &id in &group.members {
            let ty = analysis.prop_types[&id];
            let span = analysis.props[&id].name_span;
            qbe::qtype::lookup(&analysis.types, &mut program, ty, span)?;
        }
    }

    let mut instructions = Vec::new();
    lower::compile(&lower::CompileEnv::new(), &ast.root, &mut instructions)?;

    Ok(qbe::emit::emit(&mut program, &instructions))
}
