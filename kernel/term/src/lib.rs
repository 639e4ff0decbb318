//! Term representation & substitution — the leaf component of the
//! lfkernel logical framework (component A).
//!
//! No other kernel crate is a dependency of this one; everything above
//! builds on the `Term`/`Pattern` algebra and the shift/substitution
//! operations defined here.

mod context;
mod error;
mod ident;
mod pattern;
mod shift;
mod subst;
mod term;

pub use context::Context;
pub use error::TermError;
pub use ident::{NameHint, QName};
pub use pattern::Pattern;
pub use shift::{shift, unshift};
pub use subst::{psubst_l, subst};
pub use term::Term;
