//! Textual emission of the QBE module.
//!
//! The formats here are a backend contract and must stay bit-exact:
//! aggregates as `type :NAME = { TYPE COUNT, ... }`, unions as
//! `type :NAME = { { TYPE COUNT } ... }`, data as
//! `data $NAME = align K { ... }` with strings split into printable quoted
//! runs and byte literals.

use crate::lower::Instruction;

use super::{DataDef, DataItem, Program, QbeTypeRef, Scalar, TypeDefKind, Value};

/// Emit the whole module: type definitions, data definitions, then the
/// entry function driving the value stack.
///
/// String payloads from the instruction stream are interned as `$string.N`
/// data definitions before anything is written.
pub fn emit(program: &mut Program, instructions: &[Instruction]) -> String {
    let mut strings = Vec::new();
    for instruction in instructions {
        if let Instruction::PushStr(payload) = instruction {
            let name = format!("string.{}", strings.len());
            program.data.push(DataDef {
                name: name.clone(),
                align: Some(1),
                section: None,
                section_flags: None,
                items: vec![
                    DataItem::Bytes(payload.clone().into_bytes()),
                    DataItem::Zeroed(1),
                ],
            });
            strings.push((name, payload.len()));
        }
    }

    let mut out = String::new();
    for index in 0..program.types.len() {
        emit_type_def(program, index, &mut out);
    }
    for data in &program.data {
        emit_data_def(data, &mut out);
    }
    emit_function(instructions, &strings, &mut out);
    out
}

/// Render a type reference: scalars by letter; named types render `:name`
/// in type position and `l` (a pointer) in value position.
fn type_ref_text(program: &Program, ty: QbeTypeRef, aggregate: bool) -> String {
    match ty {
        QbeTypeRef::Scalar(scalar) => scalar.letter().to_string(),
        QbeTypeRef::Def(index) => {
            if aggregate {
                format!(":{}", program.types[index].name)
            } else {
                "l".to_string()
            }
        }
    }
}

pub(super) fn emit_type_def(program: &Program, index: usize, out: &mut String) {
    let def = &program.types[index];
    let union = def.kind == TypeDefKind::Union;

    out.push_str(&format!("type :{} =", def.name));
    out.push_str(" {");
    for (position, &(ty, count)) in def.fields.iter().enumerate() {
        if union {
            out.push_str(" {");
        }
        out.push(' ');
        out.push_str(&type_ref_text(program, ty, true));
        out.push_str(&format!(" {count}"));
        if union {
            out.push_str(" }");
        } else if position + 1 < def.fields.len() {
            out.push(',');
        }
    }
    out.push_str(" }\n\n");
}

fn constant_text(scalar: Scalar, value: u64) -> String {
    if scalar.size() < 8 {
        format!("{}", value as u32)
    } else {
        format!("{}", value as i64)
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Constant { scalar, value } => constant_text(*scalar, *value),
        Value::Global(name) => format!("${name}"),
        Value::Label(name) => format!("@{name}"),
        Value::Temporary(name) => format!("%{name}"),
        Value::Variadic => "...".to_string(),
    }
}

/// Whether every item is all-zero, which sends the definition to `.bss`.
fn is_zeroes(items: &[DataItem]) -> bool {
    items.iter().all(|item| match item {
        DataItem::Zeroed(_) => true,
        DataItem::Value(Value::Constant { value, .. }) => *value == 0,
        DataItem::Value(_) => false,
        DataItem::Bytes(bytes) => bytes.iter().all(|&byte| byte == 0),
        DataItem::SymbolOffset { .. } => false,
    })
}

/// Byte strings alternate between printable quoted runs and `b N` literals.
pub(super) fn data_string_text(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut quoted = false;
    for (position, &byte) in bytes.iter().enumerate() {
        if !byte.is_ascii_graphic() && byte != b' ' || byte == b'"' || byte == b'\\' {
            if quoted {
                quoted = false;
                out.push_str("\", ");
            }
            out.push_str(&format!("b {byte}"));
            if position + 1 < bytes.len() {
                out.push_str(", ");
            }
        } else {
            if !quoted {
                quoted = true;
                out.push_str("b \"");
            }
            out.push(byte as char);
        }
    }
    if quoted {
        out.push('"');
    }
    out
}

pub(super) fn emit_data_def(data: &DataDef, out: &mut String) {
    match (&data.section, &data.section_flags) {
        (Some(section), Some(flags)) => {
            out.push_str(&format!("section \"{section}\" \"{flags}\""));
        }
        (Some(section), None) => {
            out.push_str(&format!("section \"{section}\""));
        }
        (None, _) => {
            if is_zeroes(&data.items) {
                out.push_str(&format!("section \".bss.{}\"", data.name));
            } else {
                out.push_str(&format!("section \".data.{}\"", data.name));
            }
        }
    }
    out.push('\n');

    out.push_str(&format!("data ${} = ", data.name));
    if let Some(align) = data.align {
        out.push_str(&format!("align {align} "));
    }
    out.push_str("{ ");

    for (position, item) in data.items.iter().enumerate() {
        match item {
            DataItem::Zeroed(length) => out.push_str(&format!("z {length}")),
            DataItem::Value(value) => {
                let scalar = match value {
                    Value::Constant { scalar, .. } => *scalar,
                    // Symbol-valued items are pointer sized.
                    _ => Scalar::Long,
                };
                out.push(scalar.letter());
                out.push(' ');
                out.push_str(&value_text(value));
            }
            DataItem::Bytes(bytes) => out.push_str(&data_string_text(bytes)),
            DataItem::SymbolOffset { name, offset } => {
                out.push_str(&format!("l ${name} + {offset}"));
            }
        }
        out.push_str(if position + 1 < data.items.len() {
            ", "
        } else {
            " "
        });
    }

    out.push_str("}\n\n");
}

/// The entry function: every instruction becomes runtime-support calls
/// threading the `%stack` temporary.
fn emit_function(instructions: &[Instruction], strings: &[(String, usize)], out: &mut String) {
    out.push_str("export function w $main() {\n");
    out.push_str("@start\n");
    out.push_str("\t%stack =l call $stack_new()\n");

    let mut next_string = 0;
    for instruction in instructions {
        match instruction {
            Instruction::PushInt(value) => {
                out.push_str(&format!(
                    "\t%node =l call $create_number_node(l {value})\n"
                ));
                out.push_str("\t%stack =l call $stack_push(l %stack, l %node)\n");
            }
            Instruction::PushStr(_) => {
                let (name, length) = &strings[next_string];
                next_string += 1;
                out.push_str(&format!(
                    "\t%node =l call $create_string_node(l ${name}, l {length})\n"
                ));
                out.push_str("\t%stack =l call $stack_push(l %stack, l %node)\n");
            }
            Instruction::PushGlobal(name) => {
                out.push_str(&format!(
                    "\t%stack =l call $stack_push(l %stack, l ${name})\n"
                ));
            }
            Instruction::Push(offset) => {
                out.push_str(&format!(
                    "\t%stack =l call $stack_copy(l %stack, l {offset})\n"
                ));
            }
            Instruction::Pack { size, tag } => {
                out.push_str(&format!(
                    "\t%stack =l call $stack_pack(l %stack, l {size}, b {tag})\n"
                ));
            }
            Instruction::Split { size } => {
                out.push_str(&format!(
                    "\t%stack =l call $stack_split(l %stack, l {size})\n"
                ));
            }
        }
    }

    out.push_str("\tret 0\n");
    out.push_str("}\n");
}
