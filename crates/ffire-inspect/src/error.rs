/// `Inspect` failure modes, per §6. Truncation mid-walk surfaces the
/// underlying wire error; residual bytes after a complete walk are a
/// non-fatal warning folded into the rendered report instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InspectError {
    #[error("message '{0}' not found in schema")]
    MessageNotFound(String),

    #[error(transparent)]
    Wire(#[from] ffire_wire::WireDecodeError),
}
