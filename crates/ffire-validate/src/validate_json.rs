use ffire_schema::{PrimitiveKind, Schema, Type, MAX_WIRE_LENGTH};
use serde_json::Value;

use crate::json_error::JsonError;
use crate::path::{render_path, PathSegment};

/// `ValidateJSON(model, messageName, document) -> Ok | Error`, per §4.2
/// and §6. Walks `document` against `messageName`'s target type, mirroring
/// §3's type variants at each leaf exactly as `codegen::validator::validate`
/// dispatches on `TypeNode`.
pub fn validate_json(schema: &Schema, message_name: &str, document: &Value) -> Result<(), JsonError> {
    let message = schema
        .message(message_name)
        .ok_or_else(|| JsonError::MessageNotFound(message_name.to_string()))?;
    let mut path = Vec::new();
    walk(document, &message.target, &mut path)
}

fn walk(value: &Value, ty: &Type, path: &mut Vec<PathSegment>) -> Result<(), JsonError> {
    if ty.is_optional() && value.is_null() {
        return Ok(());
    }

    match ty {
        Type::Primitive(p) => walk_primitive(value, p.kind, path),
        Type::Array(a) => walk_array(value, &a.element, path),
        Type::Struct(s) => walk_struct(value, s, path),
        Type::NamedRef(name) => Err(JsonError::MissingField {
            path: render_path(path),
            field: format!("<unresolved reference '{name}'>"),
        }),
    }
}

fn walk_primitive(value: &Value, kind: PrimitiveKind, path: &[PathSegment]) -> Result<(), JsonError> {
    match kind {
        PrimitiveKind::Bool => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(mismatch(path, "bool", value))
            }
        }
        PrimitiveKind::String => {
            let Some(s) = value.as_str() else {
                return Err(mismatch(path, "string", value));
            };
            if s.len() > MAX_WIRE_LENGTH {
                return Err(JsonError::StringTooLong {
                    path: render_path(path),
                    len: s.len(),
                });
            }
            Ok(())
        }
        k if k.is_integer() => {
            let Some(n) = value.as_i64().or_else(|| value.as_u64().and_then(|u| i64::try_from(u).ok())) else {
                if value.as_f64().is_some() {
                    return Err(mismatch(path, "integer", value));
                }
                return Err(mismatch(path, "number", value));
            };
            let (min, max) = k.integer_range().expect("integer kind has a range");
            if n < min || n > max {
                return Err(JsonError::IntOutOfRange {
                    path: render_path(path),
                    value: n as f64,
                    min,
                    max,
                });
            }
            Ok(())
        }
        // Float kinds: NaN/Infinity only ever arrive via a JSON parser
        // extension (§9 "Float edge cases"); serde_json's standard parser
        // rejects them in source text, so by the time a `Value` exists any
        // finite-ness issue already failed upstream. We still check for
        // completeness per §4.2.
        _ => {
            let Some(n) = value.as_f64() else {
                return Err(mismatch(path, "number", value));
            };
            if !n.is_finite() {
                return Err(JsonError::NotFinite { path: render_path(path) });
            }
            Ok(())
        }
    }
}

fn walk_array(value: &Value, element: &Type, path: &mut Vec<PathSegment>) -> Result<(), JsonError> {
    let Some(items) = value.as_array() else {
        return Err(mismatch(path, "array", value));
    };
    if items.len() > MAX_WIRE_LENGTH {
        return Err(JsonError::ArrayTooLong {
            path: render_path(path),
            len: items.len(),
        });
    }
    for (i, item) in items.iter().enumerate() {
        path.push(PathSegment::Index(i));
        walk(item, element, path)?;
        path.pop();
    }
    Ok(())
}

fn walk_struct(value: &Value, s: &ffire_schema::StructType, path: &mut Vec<PathSegment>) -> Result<(), JsonError> {
    let Some(obj) = value.as_object() else {
        return Err(mismatch(path, "object", value));
    };
    for field in s.fields() {
        path.push(PathSegment::Field(field.name.clone()));
        match obj.get(&field.json_name) {
            Some(v) if v.is_null() && !field.ty.is_optional() => {
                return Err(JsonError::MissingField {
                    path: render_path(path),
                    field: field.json_name.clone(),
                });
            }
            Some(v) => walk(v, &field.ty, path)?,
            None if field.ty.is_optional() => {}
            None => {
                return Err(JsonError::MissingField {
                    path: render_path(path),
                    field: field.json_name.clone(),
                });
            }
        }
        path.pop();
    }
    // Unknown object keys are forward-compatibility slack in JSON input
    // only (§4.2) — intentionally not checked against `s.fields()`.
    for key in obj.keys() {
        if !s.fields().iter().any(|f| &f.json_name == key) {
            tracing::warn!(path = %render_path(path), key = %key, "ignoring unknown JSON object key");
        }
    }
    Ok(())
}

fn mismatch(path: &[PathSegment], expected: &'static str, actual: &Value) -> JsonError {
    JsonError::TypeMismatch {
        path: render_path(path),
        expected,
        actual: json_kind(actual),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(src: &str) -> Schema {
        ffire_parser::parse(src).unwrap()
    }

    #[test]
    fn validates_small_struct() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let doc = json!({"Name": "Speaker", "Channels": 2});
        assert!(validate_json(&s, "Message", &doc).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let s = schema(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        );
        let doc = json!({"Name": "Speaker"});
        assert!(matches!(
            validate_json(&s, "Message", &doc),
            Err(JsonError::MissingField { .. })
        ));
    }

    #[test]
    fn oversized_string_rejected() {
        let s = schema("package demo\ntype Message = string\n");
        let doc = Value::String("a".repeat(65_536));
        assert!(matches!(
            validate_json(&s, "Message", &doc),
            Err(JsonError::StringTooLong { .. })
        ));
    }

    #[test]
    fn oversized_array_rejected() {
        let s = schema("package demo\ntype Message = []int32\n");
        let doc = Value::Array(vec![json!(1); 65_536]);
        assert!(matches!(
            validate_json(&s, "Message", &doc),
            Err(JsonError::ArrayTooLong { .. })
        ));
    }

    #[test]
    fn null_optional_passes() {
        let s = schema("package demo\ntype Message = *int32\n");
        assert!(validate_json(&s, "Message", &Value::Null).is_ok());
    }

    #[test]
    fn out_of_range_int_rejected() {
        let s = schema("package demo\ntype Message = int8\n");
        let doc = json!(200);
        assert!(matches!(
            validate_json(&s, "Message", &doc),
            Err(JsonError::IntOutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_object_keys_ignored() {
        let s = schema("package demo\ntype Message = Device\ntype Device struct {\n  Name string\n}\n");
        let doc = json!({"Name": "Speaker", "Extra": true});
        assert!(validate_json(&s, "Message", &doc).is_ok());
    }

    #[test]
    fn large_int64_survives_validation_exactly() {
        let s = schema("package demo\ntype Message = int64\n");
        // Not exactly representable as f64 (53-bit mantissa); must be
        // checked via as_i64, not round-tripped through as_f64.
        let doc = json!(9_007_199_254_740_993i64);
        assert!(validate_json(&s, "Message", &doc).is_ok());
    }

    #[test]
    fn message_not_found() {
        let s = schema("package demo\ntype Message = string\n");
        assert!(matches!(
            validate_json(&s, "Nope", &Value::Null),
            Err(JsonError::MessageNotFound(_))
        ));
    }
}
