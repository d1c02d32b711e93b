//! Canonical atom-level codec for the ffire binary wire format (§5).
//!
//! This crate is the shared oracle against which every codegen target's
//! emitted reader/writer code is judged: the same `i32`/`string`/array
//! header bytes produced here must be exactly what a generated Go or C++
//! struct's own writer would produce for the same value.

mod error;
mod reader;
mod writer;

pub use error::{WireDecodeError, WireEncodeError};
pub use reader::WireReader;
pub use writer::WireWriter;
