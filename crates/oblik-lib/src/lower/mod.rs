//! Lowering of typed elements to the instruction stream.
//!
//! `compile` walks a value depth-first, pushing scalars and packing records
//! in declaration order. Names bound in the compilation environment become
//! stack copies; everything else is a global reference.

mod env;
mod instructions;


pub use env::{CompileEnv, Frame};
pub use instructions::Instruction;

use crate::diagnostics::Diagnostic;
use crate::parser::{Element, ElementKind};

/// Append the instructions for one element.
///
/// Deterministic: the same element and environment always produce the same
/// stream.
pub fn compile(
    env: &CompileEnv,
    element: &Element,
    out: &mut Vec<Instruction>,
) -> Result<(), Diagnostic> {
    match &element.kind {
        ElementKind::Int(value) => out.push(Instruction::PushInt(*value)),
        ElementKind::Str(value) => out.push(Instruction::PushStr(value.clone())),
        ElementKind::Id(name) => match env.offset_of(name) {
            Some(offset) => out.push(Instruction::Push(offset)),
            None => out.push(Instruction::PushGlobal(name.clone())),
        },
        ElementKind::Properties(properties) => {
            for prop in properties {
                compile(env, &prop.value, out)?;
            }
            out.push(Instruction::Pack {
                size: properties.len(),
                tag: 0,
            });
        }
        ElementKind::Access(names) => {
            // Split is reserved for unpacking the accessed record; the
            // stack discipline around it is not designed yet.
            return Err(Diagnostic::semantic(
                element.span,
                format!("`{}` cannot be compiled yet: property access is not supported in the backend", names.join(".")),
            ));
        }
    }
    Ok(())
}
