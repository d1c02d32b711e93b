use crate::ir::Plan;
use crate::options::GenerateOptions;

/// What every per-target emitter implements, per §4.6's "per-target
/// responsibilities": type declarations, an `Encode`, and a `Decode` for
/// each message, all driven by the same [`Plan`].
pub trait Backend {
    fn file_name(&self, package: &str) -> String;
    fn render(&self, plan: &Plan, options: &GenerateOptions) -> String;
}
