//! Typed schema model for ffire.
//!
//! Mirrors the `TypeNode` sum-type hierarchy the json-joy type system uses
//! (see `json-joy-json-type::type_def`), but specialized for the fixed,
//! closed set of wire-representable shapes §3 describes: there is
//! no open class hierarchy here, just a recursive `Type` enum the parser
//! builds and every downstream crate (validator, wire codec, fixture,
//! inspector, codegen) walks read-only.

mod field;
mod message;
mod primitive;
mod schema;
mod ty;

pub use field::Field;
pub use message::Message;
pub use primitive::PrimitiveKind;
pub use schema::Schema;
pub use ty::{ArrayType, PrimitiveType, StructType, Type};

/// Maximum nesting depth (arrays, structs, optionals combined), per §3
/// invariant 4. Shared here because both the validator and the codegen's
/// buffer-sizing pass need the same bound.
pub const MAX_NESTING_DEPTH: u32 = 32;

/// Maximum string/array length representable on the wire, per §3 invariant 7
/// (a `uint16` length prefix).
pub const MAX_WIRE_LENGTH: usize = 65_535;
