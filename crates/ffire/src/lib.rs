//! Facade over the ffire toolchain (§6): `Parse`, `ValidateSchema`,
//! `ValidateJSON`, `GeneratePackage`, `JSONtoBinary`, `BinaryToJSON`,
//! `Inspect`. Each function here is a thin pass-through to its owning
//! crate; this crate exists so an external collaborator (CLI, build
//! orchestration) depends on one path instead of wiring up seven.

pub use ffire_codegen::{
    Backend, CodegenError, GenerateOptions, GeneratedFile, OptimizeLevel, Target,
};
pub use ffire_fixture::{FixtureDecodeError, FixtureEncodeError};
pub use ffire_inspect::{InspectError, InspectOptions};
pub use ffire_parser::ParseError;
pub use ffire_schema::{
    ArrayType, Field, Message, PrimitiveKind, PrimitiveType, Schema, StructType, Type,
};
pub use ffire_validate::{JsonError, PathSegment, SchemaError};
pub use ffire_wire::{WireDecodeError, WireEncodeError};

use serde_json::Value;

/// Umbrella error across the whole `Parse → ValidateSchema → GeneratePackage`
/// (or `→ JSONtoBinary` / `→ Inspect`) pipeline, so a caller can chain stages
/// with `?` instead of matching each crate's own error type. Mirrors the
/// layering `json-joy-json-type::BinaryCodegenError` uses to wrap
/// `JsonTextCodegenError`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FfireError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Json(#[from] JsonError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    FixtureEncode(#[from] FixtureEncodeError),

    #[error(transparent)]
    FixtureDecode(#[from] FixtureDecodeError),

    #[error(transparent)]
    Inspect(#[from] InspectError),
}

/// `Parse(source) -> Schema | Error`, per §4.1/§6.
pub fn parse(source: &str) -> Result<Schema, ParseError> {
    ffire_parser::parse(source)
}

/// `ValidateSchema(schema) -> Ok | Error`, per §4.2/§6.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    ffire_validate::validate_schema(schema)
}

/// `ValidateJSON(schema, messageName, document) -> Ok | Error`, per §4.2/§6.
pub fn validate_json(schema: &Schema, message_name: &str, document: &Value) -> Result<(), JsonError> {
    ffire_validate::validate_json(schema, message_name, document)
}

/// `GeneratePackage(schema, options) -> GeneratedFile | Error`, per §4.6/§6.
pub fn generate_package(schema: &Schema, options: &GenerateOptions) -> Result<GeneratedFile, CodegenError> {
    ffire_codegen::generate_package(schema, options)
}

/// `JSONtoBinary(schema, messageName, document) -> bytes | Error`, per §4.4/§6.
pub fn json_to_binary(
    schema: &Schema,
    message_name: &str,
    document: &Value,
) -> Result<Vec<u8>, FixtureEncodeError> {
    ffire_fixture::json_to_binary(schema, message_name, document)
}

/// `BinaryToJSON(schema, messageName, bytes) -> document | Error`, per §4.4/§6.
pub fn binary_to_json(schema: &Schema, message_name: &str, bytes: &[u8]) -> Result<Value, FixtureDecodeError> {
    ffire_fixture::binary_to_json(schema, message_name, bytes)
}

/// `Inspect(schema, messageName, bytes, options) -> text | Error`, per §4.5/§6.
pub fn inspect(
    schema: &Schema,
    message_name: &str,
    bytes: &[u8],
    options: InspectOptions,
) -> Result<String, InspectError> {
    ffire_inspect::inspect(schema, message_name, bytes, options)
}

/// Parses and validates a schema in one step, the pipeline's most common
/// entry point (`Parse` followed immediately by `ValidateSchema`, per §6).
pub fn parse_and_validate(source: &str) -> Result<Schema, FfireError> {
    let schema = parse(source)?;
    validate_schema(&schema)?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_schema() -> Schema {
        parse(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n  Channels int32\n}\n",
        )
        .unwrap()
    }

    #[test]
    fn pipeline_parses_validates_and_generates() {
        let schema = parse_and_validate(
            "package demo\ntype Message = Device\ntype Device struct {\n  Name string\n}\n",
        )
        .unwrap();
        let options = GenerateOptions::new(Target::Go);
        let file = generate_package(&schema, &options).unwrap();
        assert!(file.source.contains("Device"));
    }

    #[test]
    fn round_trips_json_through_binary() {
        let schema = demo_schema();
        let document = serde_json::json!({ "Name": "radio", "Channels": 4 });
        let bytes = json_to_binary(&schema, "Message", &document).unwrap();
        let decoded = binary_to_json(&schema, "Message", &bytes).unwrap();
        assert_eq!(decoded, document);
    }

    #[test]
    fn inspect_renders_message_report() {
        let schema = demo_schema();
        let document = serde_json::json!({ "Name": "radio", "Channels": 4 });
        let bytes = json_to_binary(&schema, "Message", &document).unwrap();
        let report = inspect(&schema, "Message", &bytes, InspectOptions::default()).unwrap();
        assert!(report.contains("Name"));
    }

    #[test]
    fn invalid_source_surfaces_parse_error() {
        let err = parse_and_validate("not a schema").unwrap_err();
        assert!(matches!(err, FfireError::Parse(_)));
    }
}
