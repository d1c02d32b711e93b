/// `GeneratePackage` failure modes. A validated schema never fails to
/// plan or render; the only external input this crate rejects is an
/// unrecognized target tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("unknown generation target '{0}'")]
    UnknownTarget(String),
}
