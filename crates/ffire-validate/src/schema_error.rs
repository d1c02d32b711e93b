/// `ValidateSchema` failure modes, per §7.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema package identifier must not be empty")]
    EmptyPackage,

    #[error("schema must declare at least one message")]
    NoMessages,

    #[error("message name '{0}' is not exported (must start with an uppercase rune)")]
    NonExportedMessage(String),

    #[error("duplicate message name '{0}'")]
    DuplicateMessageName(String),

    #[error("{path}: struct '{name}' has no fields")]
    EmptyStruct { path: String, name: String },

    #[error("{path}: duplicate field name in struct '{name}'")]
    DuplicateField { path: String, name: String },

    #[error("{path}: type '{name}' forms a cycle not guarded by an optional reference")]
    CyclicType { path: String, name: String },

    #[error("{path}: nesting depth exceeds the maximum of {max}")]
    MaxNestingExceeded { path: String, max: u32 },

    /// Structurally unreachable once a `Schema` value exists — `PrimitiveKind`
    /// is a closed Rust enum, so there is no runtime value that could name an
    /// unknown primitive. Retained so the error *identity* from §7 exists for
    /// callers that match on it, and so a hand-constructed `Schema` bypassing
    /// the parser still gets a named failure instead of a panic.
    #[error("{path}: unknown primitive kind")]
    UnknownPrimitive { path: String },

    /// Defensive: a validated model must never contain a `NamedRef` (§3).
    /// Reachable only if a `Schema` is constructed by hand, bypassing
    /// `ffire_parser`'s resolver.
    #[error("{path}: unresolved named reference '{name}'")]
    UnresolvedType { path: String, name: String },
}
