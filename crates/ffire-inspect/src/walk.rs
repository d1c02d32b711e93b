use ffire_schema::{PrimitiveKind, PrimitiveType, Schema, StructType, Type};
use ffire_wire::WireReader;

use crate::error::InspectError;
use crate::hexdump;
use crate::options::InspectOptions;
use crate::path::render_path;

/// `Inspect(model, messageName, bytes, {showHex, compact}) -> text | Error`, per §4.5/§6.
pub fn inspect(
    schema: &Schema,
    message_name: &str,
    bytes: &[u8],
    options: InspectOptions,
) -> Result<String, InspectError> {
    let message = schema
        .message(message_name)
        .ok_or_else(|| InspectError::MessageNotFound(message_name.to_string()))?;

    let mut reader = WireReader::new(bytes);
    let mut path = Vec::new();
    let mut lines = Vec::new();
    walk(&mut reader, &message.target, &mut path, &mut lines, options)?;

    let mut out = String::new();
    if options.show_hex {
        out.push_str(&hexdump::render(bytes));
        out.push('\n');
    }
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }

    let residual = reader.remaining();
    if residual > 0 {
        out.push_str(&format!(
            "warning: {residual} residual byte(s) after decoding '{message_name}'\n"
        ));
        tracing::warn!(message = message_name, residual, "residual bytes after inspect walk");
    }

    Ok(out)
}

fn walk(
    r: &mut WireReader,
    ty: &Type,
    path: &mut Vec<String>,
    lines: &mut Vec<String>,
    options: InspectOptions,
) -> Result<(), InspectError> {
    if ty.is_optional() {
        let offset = r.position();
        let present = r.optional_tag()?;
        if !(options.compact && !present) {
            lines.push(atom_line(
                offset,
                &render_path(path),
                "optional_tag",
                1,
                if present { "present" } else { "absent" },
            ));
        }
        if !present {
            return Ok(());
        }
    }

    match ty {
        Type::Primitive(p) => walk_primitive(r, p, path, lines),
        Type::Array(a) => {
            let offset = r.position();
            let len = r.array_header()?;
            lines.push(atom_line(offset, &render_path(path), "array_header", 2, &len.to_string()));
            for i in 0..len {
                path.push(format!("[{i}]"));
                walk(r, &a.element, path, lines, options)?;
                path.pop();
            }
            Ok(())
        }
        Type::Struct(s) => walk_struct(r, s, path, lines, options),
        Type::NamedRef(name) => {
            unreachable!("validated schema never contains an unresolved reference '{name}'")
        }
    }
}

fn walk_struct(
    r: &mut WireReader,
    s: &StructType,
    path: &mut Vec<String>,
    lines: &mut Vec<String>,
    options: InspectOptions,
) -> Result<(), InspectError> {
    for field in s.fields() {
        path.push(field.name.clone());
        walk(r, &field.ty, path, lines, options)?;
        path.pop();
    }
    Ok(())
}

fn walk_primitive(
    r: &mut WireReader,
    p: &PrimitiveType,
    path: &[String],
    lines: &mut Vec<String>,
) -> Result<(), InspectError> {
    let offset = r.position();
    let rendered_path = render_path(path);
    let (kind, width, value) = match p.kind {
        PrimitiveKind::Bool => ("bool", 1, r.bool()?.to_string()),
        PrimitiveKind::Int8 => ("int8", 1, r.i8()?.to_string()),
        PrimitiveKind::Int16 => ("int16", 2, r.i16()?.to_string()),
        PrimitiveKind::Int32 => ("int32", 4, r.i32()?.to_string()),
        PrimitiveKind::Int64 => ("int64", 8, r.i64()?.to_string()),
        PrimitiveKind::Float32 => ("float32", 4, r.f32()?.to_string()),
        PrimitiveKind::Float64 => ("float64", 8, r.f64()?.to_string()),
        PrimitiveKind::String => {
            let s = r.string()?;
            let width = 2 + s.len();
            ("string", width, format!("{s:?}"))
        }
    };
    lines.push(atom_line(offset, &rendered_path, kind, width, &value));
    Ok(())
}

fn atom_line(offset: usize, path: &str, kind: &str, width: usize, value: &str) -> String {
    if path.is_empty() {
        format!("{offset:#06x}: {kind} ({width} bytes) = {value}")
    } else {
        format!("{offset:#06x}: {path} {kind} ({width} bytes) = {value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffire_fixture::json_to_binary;
    use serde_json::json;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn inspects_small_struct() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let doc = json!({"Name": "Speaker", "Channels": 2});
        let bytes = json_to_binary(&s, "Message", &doc).unwrap();
        let report = inspect(&s, "Message", &bytes, InspectOptions::default()).unwrap();
        assert!(report.contains("Name string"));
        assert!(report.contains("Channels int32"));
        assert!(!report.contains("warning:"));
    }

    #[test]
    fn compact_mode_suppresses_absent_optional() {
        let s = schema("package demo\ntype Message = *int32\n");
        let bytes = json_to_binary(&s, "Message", &serde_json::Value::Null).unwrap();
        let verbose = inspect(&s, "Message", &bytes, InspectOptions::default()).unwrap();
        let compact = inspect(
            &s,
            "Message",
            &bytes,
            InspectOptions { show_hex: false, compact: true },
        )
        .unwrap();
        assert!(verbose.contains("optional_tag"));
        assert!(compact.is_empty());
    }

    #[test]
    fn reports_residual_bytes_as_warning() {
        let s = schema("package demo\ntype Message = int8\n");
        let report = inspect(&s, "Message", &[1, 2, 3], InspectOptions::default()).unwrap();
        assert!(report.contains("warning: 2 residual byte(s)"));
    }

    #[test]
    fn hex_preamble_included_when_requested() {
        let s = schema("package demo\ntype Message = int8\n");
        let report = inspect(
            &s,
            "Message",
            &[9],
            InspectOptions { show_hex: true, compact: false },
        )
        .unwrap();
        assert!(report.starts_with("00000000"));
    }

    #[test]
    fn message_not_found() {
        let s = schema("package demo\ntype Message = string\n");
        assert!(matches!(
            inspect(&s, "Nope", &[], InspectOptions::default()),
            Err(InspectError::MessageNotFound(_))
        ));
    }
}
