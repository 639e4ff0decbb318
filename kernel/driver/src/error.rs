use std::rc::Rc;

use lfkernel_reduce::ReduceError;
use lfkernel_signature::SigError;
use lfkernel_typeck::TypeError;
use miette::Diagnostic;
use thiserror::Error;

/// The façade's own error taxonomy (spec §4.H, §7), aggregating every
/// sub-crate's taxonomy via `#[from]` — the same composition the
/// teacher's own driver uses for its top-level `Error`.
#[derive(Debug, Error, Diagnostic)]
pub enum EnvError {
    #[error("a `Def` entry may not declare a type of `Kind`")]
    #[diagnostic(code("K-701"))]
    KindLevelDefinition,

    #[error("check failed: {reason}")]
    #[diagnostic(code("K-702"))]
    CheckFailed { reason: String },

    #[error("module `{0}` could not be loaded: no `ModuleLoader` is configured")]
    #[diagnostic(code("K-703"))]
    NoModuleLoader(Rc<str>),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Signature(#[from] SigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reduce(#[from] ReduceError),
}
