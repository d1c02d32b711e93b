mod binary_to_json;
mod error;
mod json_to_binary;

pub use binary_to_json::binary_to_json;
pub use error::{FixtureDecodeError, FixtureEncodeError};
pub use json_to_binary::json_to_binary;
