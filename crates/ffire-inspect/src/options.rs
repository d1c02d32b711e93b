/// `Inspect` rendering options, per §4.5/§6.
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectOptions {
    /// Prepend a 16-bytes-per-row hex dump with an ASCII column.
    pub show_hex: bool,
    /// Suppress lines for optional fields decoded as absent.
    pub compact: bool,
}
