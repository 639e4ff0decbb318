use miette::Diagnostic;
use thiserror::Error;

/// `NotUnifiable` is ordinary control flow, not a user-visible failure
/// (spec §7): the decision-tree walker retries after forcing normal form
/// and only escalates if that retry fails too.
#[derive(Debug, Error, Diagnostic, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    #[error("term mentions a bound variable outside the pattern's distinct-variable set")]
    #[diagnostic(code("K-301"))]
    NotUnifiable,
}
