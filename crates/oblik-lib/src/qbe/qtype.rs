//! Synthesis of QBE type definitions from inferred types.
//!
//! Lookups are memoized on the resolved inference type: asking twice for
//! the same type returns the same definition. Record members are
//! synthesized before their container is appended, so member definitions
//! precede it in the program while the container keeps the lower name.

use crate::analyze::{TypeContext, TypeId, TypeShape};
use crate::diagnostics::Diagnostic;
use crate::span::Span;

use super::{Program, QbeTypeRef, Scalar, TypeDef, TypeDefKind};

/// Get or create the QBE type for an inferred type.
///
/// Abstract types (a variable the substitution never grounded) and function
/// types have no layout and are fatal here.
pub fn lookup(
    ctx: &TypeContext,
    program: &mut Program,
    ty: TypeId,
    span: Span,
) -> Result<QbeTypeRef, Diagnostic> {
    let ty = ctx.resolve(ty);

    if let Some(index) = program.types.iter().position(|def| def.base == Some(ty)) {
        return Ok(QbeTypeRef::Def(index));
    }

    match ctx.shape(ty).clone() {
        TypeShape::Var(name) => Err(Diagnostic::semantic(
            span,
            format!("type is not fully determined ({name} was never resolved)"),
        )),
        TypeShape::Arrow { .. } => Err(Diagnostic::semantic(
            span,
            "function types cannot be lowered",
        )),
        TypeShape::Base(name) => {
            let fields = match name.as_str() {
                "Int" => vec![(QbeTypeRef::Scalar(Scalar::Long), 1)],
                // Pointer, length, capacity.
                "Str" => vec![(QbeTypeRef::Scalar(Scalar::Long), 3)],
                other => {
                    return Err(Diagnostic::internal(
                        span,
                        format!("no layout for base type {other}"),
                    ));
                }
            };
            Ok(append(program, TypeDefKind::Aggregate, fields, Some(ty), None))
        }
        TypeShape::Record(rows) => {
            // Name first, members next: the container claims the lower
            // number even though members are appended before it.
            let name = program.next_type_name();
            let mut fields = Vec::with_capacity(rows.len());
            for (_, row_ty) in &rows {
                fields.push((lookup(ctx, program, *row_ty, span)?, 1));
            }
            Ok(append(
                program,
                TypeDefKind::Aggregate,
                fields,
                Some(ty),
                Some(name),
            ))
        }
    }
}

/// Define a union over the given alternatives, one field each.
///
/// Tagged packs will select among these; the front end does not synthesize
/// sums yet, so unions carry no memoization base.
pub fn union_of(
    ctx: &TypeContext,
    program: &mut Program,
    alternatives: &[TypeId],
    span: Span,
) -> Result<QbeTypeRef, Diagnostic> {
    let name = program.next_type_name();
    let mut fields = Vec::with_capacity(alternatives.len());
    for &alt in alternatives {
        fields.push((lookup(ctx, program, alt, span)?, 1));
    }
    Ok(append(program, TypeDefKind::Union, fields, None, Some(name)))
}

fn append(
    program: &mut Program,
    kind: TypeDefKind,
    fields: Vec<(QbeTypeRef, usize)>,
    base: Option<TypeId>,
    name: Option<String>,
) -> QbeTypeRef {
    let name = name.unwrap_or_else(|| program.next_type_name());
    program.types.push(TypeDef {
        name,
        kind,
        fields,
        base,
    });
    QbeTypeRef::Def(program.types.len() - 1)
}
