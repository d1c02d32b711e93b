mod error;
mod hexdump;
mod options;
mod path;
mod walk;

pub use error::InspectError;
pub use options::InspectOptions;
pub use walk::inspect;
