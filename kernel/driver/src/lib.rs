//! The Environment façade (component H): serialises processing of an
//! out-of-core entry stream over components A–G, the only layer that
//! owns a mutable `Signature` and the only crate allowed to initialise a
//! logging backend.

mod entry;
mod environment;
mod error;

pub use entry::{CheckKind, Entry, EnvOutput, ModuleId, ModuleLoader};
pub use environment::{Environment, EnvironmentConfig};
pub use error::EnvError;

#[cfg(feature = "logging")]
pub fn init_logging() {
    let _ = env_logger::try_init();
}
