use ffire_schema::{ArrayType, PrimitiveKind, PrimitiveType, Schema, StructType, Type};
use ffire_wire::WireWriter;
use serde_json::Value;

use crate::error::FixtureEncodeError;

static NULL: Value = Value::Null;

/// `JSONtoBinary(model, messageName, document) -> bytes | Error`, per §6.
///
/// Validates `document` against `messageName`'s schema first — §6 specifies
/// `JSONtoBinary` as a validating encode, not a best-effort one — then walks
/// the same tree writing the canonical atoms from §5 via [`WireWriter`].
pub fn json_to_binary(schema: &Schema, message_name: &str, document: &Value) -> Result<Vec<u8>, FixtureEncodeError> {
    ffire_validate::validate_json(schema, message_name, document)?;

    let message = schema
        .message(message_name)
        .expect("validate_json already confirmed the message exists");

    let mut writer = WireWriter::new();
    encode_type(&mut writer, document, &message.target)?;
    tracing::debug!(message = message_name, "encoded JSON document to binary");
    Ok(writer.into_bytes())
}

fn encode_type(w: &mut WireWriter, value: &Value, ty: &Type) -> Result<(), FixtureEncodeError> {
    if ty.is_optional() {
        let present = !value.is_null();
        w.optional_tag(present);
        if !present {
            return Ok(());
        }
    }

    match ty {
        Type::Primitive(p) => encode_primitive(w, value, p),
        Type::Array(a) => encode_array(w, value, a),
        Type::Struct(s) => encode_struct(w, value, s),
        Type::NamedRef(name) => {
            unreachable!("validated schema never contains an unresolved reference '{name}'")
        }
    }
}

fn encode_primitive(w: &mut WireWriter, value: &Value, p: &PrimitiveType) -> Result<(), FixtureEncodeError> {
    match p.kind {
        PrimitiveKind::Bool => {
            w.bool(value.as_bool().expect("validated bool"));
        }
        PrimitiveKind::Int8 => w.i8(value.as_i64().expect("validated int") as i8),
        PrimitiveKind::Int16 => w.i16(value.as_i64().expect("validated int") as i16),
        PrimitiveKind::Int32 => w.i32(value.as_i64().expect("validated int") as i32),
        PrimitiveKind::Int64 => w.i64(value.as_i64().expect("validated int")),
        PrimitiveKind::Float32 => w.f32(value.as_f64().expect("validated float") as f32),
        PrimitiveKind::Float64 => w.f64(value.as_f64().expect("validated float")),
        PrimitiveKind::String => w.string(value.as_str().expect("validated string"))?,
    }
    Ok(())
}

fn encode_array(w: &mut WireWriter, value: &Value, a: &ArrayType) -> Result<(), FixtureEncodeError> {
    let items = value.as_array().expect("validated array");
    w.array_header(items.len())?;
    for item in items {
        encode_type(w, item, &a.element)?;
    }
    Ok(())
}

fn encode_struct(w: &mut WireWriter, value: &Value, s: &StructType) -> Result<(), FixtureEncodeError> {
    let obj = value.as_object().expect("validated object");
    for field in s.fields() {
        let field_value = obj.get(&field.json_name).unwrap_or(&NULL);
        encode_type(w, field_value, &field.ty)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn encodes_small_struct() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let doc = json!({"Name": "Speaker", "Channels": 2});
        let bytes = json_to_binary(&s, "Message", &doc).unwrap();
        // 2-byte string length + "Speaker" (7 bytes) + 4-byte int32.
        assert_eq!(bytes.len(), 2 + 7 + 4);
    }

    #[test]
    fn rejects_invalid_document() {
        let s = schema("package demo\ntype Message = int8\n");
        let doc = json!(999);
        assert!(matches!(
            json_to_binary(&s, "Message", &doc),
            Err(FixtureEncodeError::Invalid(_))
        ));
    }

    #[test]
    fn optional_absent_field_writes_only_presence_byte() {
        let s = schema("package demo\ntype Message = *int32\n");
        let bytes = json_to_binary(&s, "Message", &Value::Null).unwrap();
        assert_eq!(bytes, vec![0]);
    }

    #[test]
    fn optional_present_field_writes_tag_then_value() {
        let s = schema("package demo\ntype Message = *int32\n");
        let bytes = json_to_binary(&s, "Message", &json!(7)).unwrap();
        assert_eq!(bytes, vec![1, 7, 0, 0, 0]);
    }

    #[test]
    fn large_int64_round_trips_exactly() {
        let s = schema("package demo\ntype Message = int64\n");
        // 2^53 + 1: the smallest positive integer an f64 cannot represent
        // exactly, so a prior `as_f64() as i64` path would corrupt this.
        let value: i64 = 9_007_199_254_740_993;
        let bytes = json_to_binary(&s, "Message", &json!(value)).unwrap();
        assert_eq!(bytes, value.to_le_bytes().to_vec());
    }
}
