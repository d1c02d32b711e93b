/// `ValidateJSON` failure modes, per §7's "JSON-vs-schema validation
/// failures" group. Every variant that carries a path renders it the way
/// §7's worked example does (`Plugins[3].Parameters[0].Unit: ...`); the
/// path is rendered to a `String` at construction time (via
/// `path::render_path`) rather than carried as raw segments, since the
/// segment vector has no meaningful `Display` of its own.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonError {
    #[error("message '{0}' not found in schema")]
    MessageNotFound(String),

    #[error("{path}: TypeMismatch (expected {expected}, found {actual})")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{path}: MissingField '{field}'")]
    MissingField { path: String, field: String },

    #[error("{path}: IntOutOfRange ({value} not in [{min}, {max}])")]
    IntOutOfRange {
        path: String,
        value: f64,
        min: i64,
        max: i64,
    },

    #[error("{path}: StringTooLong ({len} > 65535)")]
    StringTooLong { path: String, len: usize },

    #[error("{path}: ArrayTooLong ({len} > 65535)")]
    ArrayTooLong { path: String, len: usize },

    #[error("{path}: NotFinite")]
    NotFinite { path: String },
}
