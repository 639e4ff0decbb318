//! The global signature: qualified names mapped to staticity, type, and
//! compiled rewrite trees (component B).

mod entry;
mod error;
mod oracle;
mod signature;

pub use entry::Staticity;
pub use error::SigError;
pub use oracle::{AssumeConfluent, ConfluenceOracle};
pub use signature::Signature;
