use std::rc::Rc;

use lfkernel_patterns::PatternError;
use lfkernel_reduce::ReduceError;
use lfkernel_signature::SigError;
use lfkernel_term::Term;
use miette::Diagnostic;
use thiserror::Error;

/// The typing-judgement error taxonomy (spec §7 "Typing", plus the
/// patterns/signature/reduce taxonomies it delegates to via `#[from]`,
/// mirroring the teacher's `TypeError::Lookup(#[from] LookupError)`
/// composition).
#[derive(Debug, Error, Diagnostic)]
pub enum TypeError {
    #[error("`Kind` has no type of its own")]
    #[diagnostic(code("K-601"))]
    KindIsNotTypable,

    #[error("expected `{expected}`, inferred `{inferred}` for `{term}`")]
    #[diagnostic(code("K-602"))]
    ConvertibilityError { term: Rc<Term>, expected: Rc<Term>, inferred: Rc<Term> },

    #[error("de Bruijn index {0} has no matching binder in the context")]
    #[diagnostic(code("K-603"))]
    VariableNotFound(usize),

    #[error("expected `Type` or `Kind`, found `{found}`")]
    #[diagnostic(code("K-604"))]
    SortExpected { found: Rc<Term> },

    #[error("expected a product type, found `{found}`")]
    #[diagnostic(code("K-605"))]
    ProductExpected { found: Rc<Term> },

    #[error("the body of a lambda may not have type `Kind`")]
    #[diagnostic(code("K-606"))]
    InexpectedKind,

    #[error("a domain-free lambda cannot be type-checked, only substituted")]
    #[diagnostic(code("K-607"))]
    DomainFreeLambda,

    #[error("could not infer the type of this pattern")]
    #[diagnostic(code("K-608"))]
    CannotInferTypeOfPattern,

    #[error("variable `{var}` occurs in the right-hand side applied to {used_arity} argument(s), fewer than the {declared_arity} it is matched against on the left-hand side")]
    #[diagnostic(code("K-609"))]
    NotEnoughArguments { var: Rc<str>, declared_arity: usize, used_arity: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Signature(#[from] SigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reduce(#[from] ReduceError),
}
