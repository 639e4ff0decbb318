use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while constructing or transforming terms.
#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    /// Raised by `unshift` when a free index below the shift amount is
    /// encountered; this is ordinary control flow for several callers
    /// (the reducer retries after forcing normal form), not a hard failure.
    #[error("cannot unshift by {amount}: index {index} would become negative")]
    #[diagnostic(code("K-001"))]
    Unshift { amount: usize, index: usize },
}
