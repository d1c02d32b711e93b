/// `JSONtoBinary` failure modes, per §6.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FixtureEncodeError {
    #[error(transparent)]
    Invalid(#[from] ffire_validate::JsonError),

    #[error(transparent)]
    Wire(#[from] ffire_wire::WireEncodeError),
}

/// `BinaryToJSON` failure modes, per §6.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FixtureDecodeError {
    #[error("message '{0}' not found in schema")]
    MessageNotFound(String),

    #[error(transparent)]
    Wire(#[from] ffire_wire::WireDecodeError),
}
