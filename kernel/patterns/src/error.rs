use std::rc::Rc;

use lfkernel_term::Term;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while elaborating a raw left-hand side into a typed
/// `Pattern` (component F). Crate-internal to the extent that callers
/// outside `kernel/typeck` never see it directly — `typeck::TypeError`
/// wraps the whole taxonomy via `#[from]`.
#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("expected a product type while elaborating the pattern, found {found}")]
    #[diagnostic(code("K-501"))]
    ProductExpected { found: Rc<Term> },

    #[error("pattern variable `{name}` is applied to arguments on the left-hand side")]
    #[diagnostic(code("K-502"))]
    PatternVariableApplication { name: Rc<str> },

    #[error("the equations gathered while elaborating the left-hand side have no solution")]
    #[diagnostic(code("K-503"))]
    UnsatisfiableConstraints { left: Rc<Term>, right: Rc<Term> },

    #[error("expected a bound variable, found a different pattern shape")]
    #[diagnostic(code("K-504"))]
    BoundVariableExpected,

    #[error("a variable occurring inside a bracket guard is bound outside the guard's scope")]
    #[diagnostic(code("K-505"))]
    VariableBoundOutsideTheGuard,

    #[error("a higher-order pattern variable must be applied to pairwise distinct bound variables")]
    #[diagnostic(code("K-506"))]
    DistinctBoundVariablesExpected,

    #[error("identifier `{name}` is neither a pattern variable nor a signature symbol")]
    #[diagnostic(code("K-507"))]
    UnboundVariable { name: Rc<str> },

    #[error("a plain variable cannot itself serve as an applied argument position")]
    #[diagnostic(code("K-508"))]
    AVariableIsNotAPattern,

    #[error("a pattern variable occurs more than once outside of bracket-guarded positions")]
    #[diagnostic(code("K-509"))]
    NonLinearNonEqArguments,
}
