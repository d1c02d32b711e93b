/// Parser failure modes, per §4.1.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unsupported construct: {construct}")]
    UnsupportedConstruct { line: usize, construct: String },

    #[error("{0}: unresolved type")]
    UnresolvedType(String),

    #[error("duplicate declaration of '{0}'")]
    DuplicateName(String),
}
