use lfkernel_term::Term;
use miette::Diagnostic;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ReduceError {
    /// A `Bracket` guard failed. This is fatal: rewriting may not
    /// silently skip a bracket guard (spec §4.D, §9 open question 3).
    #[error("bracket guard failed: expected `{expected}`, found `{found}`")]
    #[diagnostic(code("K-401"))]
    GuardNotSatisfied { found: Rc<Term>, expected: Rc<Term> },
}
