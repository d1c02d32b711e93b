use ffire_schema::{ArrayType, PrimitiveKind, PrimitiveType, Schema, StructType, Type};
use ffire_wire::WireReader;
use serde_json::{Map, Value};

use crate::error::FixtureDecodeError;

/// `BinaryToJSON(model, messageName, bytes) -> document | Error`, per §6.
///
/// The inverse of [`crate::json_to_binary`]: reads the canonical atoms of
/// §5 back into a `serde_json::Value` tree shaped by `messageName`'s type.
/// Struct fields are emitted under their `json_name` in declaration order.
///
/// Per §4.4, bytes left over after a successful walk are a non-fatal
/// warning, not a failure — only truncation mid-walk (`UnexpectedEOF`)
/// fails the conversion. This mirrors `ffire_inspect::inspect`'s own
/// residual handling.
pub fn binary_to_json(schema: &Schema, message_name: &str, bytes: &[u8]) -> Result<Value, FixtureDecodeError> {
    let message = schema
        .message(message_name)
        .ok_or_else(|| FixtureDecodeError::MessageNotFound(message_name.to_string()))?;

    let mut reader = WireReader::new(bytes);
    let value = decode_type(&mut reader, &message.target)?;

    let residual = reader.remaining();
    if residual > 0 {
        tracing::warn!(message = message_name, residual, "trailing bytes after binary_to_json walk");
    }

    tracing::debug!(message = message_name, "decoded binary to JSON document");
    Ok(value)
}

fn decode_type(r: &mut WireReader, ty: &Type) -> Result<Value, FixtureDecodeError> {
    if ty.is_optional() {
        let present = r.optional_tag()?;
        if !present {
            return Ok(Value::Null);
        }
    }

    match ty {
        Type::Primitive(p) => decode_primitive(r, p),
        Type::Array(a) => decode_array(r, a),
        Type::Struct(s) => decode_struct(r, s),
        Type::NamedRef(name) => {
            unreachable!("validated schema never contains an unresolved reference '{name}'")
        }
    }
}

fn decode_primitive(r: &mut WireReader, p: &PrimitiveType) -> Result<Value, FixtureDecodeError> {
    Ok(match p.kind {
        PrimitiveKind::Bool => Value::Bool(r.bool()?),
        PrimitiveKind::Int8 => Value::from(r.i8()?),
        PrimitiveKind::Int16 => Value::from(r.i16()?),
        PrimitiveKind::Int32 => Value::from(r.i32()?),
        PrimitiveKind::Int64 => Value::from(r.i64()?),
        PrimitiveKind::Float32 => json_float(r.f32()? as f64),
        PrimitiveKind::Float64 => json_float(r.f64()?),
        PrimitiveKind::String => Value::String(r.string()?),
    })
}

fn json_float(n: f64) -> Value {
    serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn decode_array(r: &mut WireReader, a: &ArrayType) -> Result<Value, FixtureDecodeError> {
    let len = r.array_header()?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(decode_type(r, &a.element)?);
    }
    Ok(Value::Array(items))
}

fn decode_struct(r: &mut WireReader, s: &StructType) -> Result<Value, FixtureDecodeError> {
    let mut obj = Map::new();
    for field in s.fields() {
        let value = decode_type(r, &field.ty)?;
        obj.insert(field.json_name.clone(), value);
    }
    Ok(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_to_binary::json_to_binary;
    use serde_json::json;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn round_trips_small_struct() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let doc = json!({"Name": "Speaker", "Channels": 2});
        let bytes = json_to_binary(&s, "Message", &doc).unwrap();
        let decoded = binary_to_json(&s, "Message", &bytes).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn round_trips_optional_absent() {
        let s = schema("package demo\ntype Message = *int32\n");
        let bytes = json_to_binary(&s, "Message", &Value::Null).unwrap();
        assert_eq!(binary_to_json(&s, "Message", &bytes).unwrap(), Value::Null);
    }

    #[test]
    fn message_not_found() {
        let s = schema("package demo\ntype Message = string\n");
        assert!(matches!(
            binary_to_json(&s, "Nope", &[]),
            Err(FixtureDecodeError::MessageNotFound(_))
        ));
    }

    #[test]
    fn truncated_input_surfaces_wire_error() {
        let s = schema("package demo\ntype Message = int32\n");
        assert!(matches!(
            binary_to_json(&s, "Message", &[1, 2]),
            Err(FixtureDecodeError::Wire(_))
        ));
    }
}
