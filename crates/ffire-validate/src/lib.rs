mod json_error;
mod path;
mod schema_error;
mod validate_json;
mod validate_schema;

pub use json_error::JsonError;
pub use path::PathSegment;
pub use schema_error::SchemaError;
pub use validate_json::validate_json;
pub use validate_schema::validate_schema;
