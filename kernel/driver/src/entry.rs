use std::rc::Rc;

use lfkernel_reduce::ReductionConfig;
use lfkernel_signature::Staticity;
use lfkernel_term::{QName, Term};
use lfkernel_typeck::RawRule;

use crate::error::EnvError;

/// An opaque module reference, forwarded verbatim to a caller-supplied
/// `ModuleLoader` (spec §6: `Require(module)`'s dependency-tracking body
/// is an external collaborator, never implemented in-core).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(pub Rc<str>);

impl ModuleId {
    pub fn new(name: impl Into<Rc<str>>) -> ModuleId {
        ModuleId(name.into())
    }
}

/// What a `Check` entry asserts (spec §6: `Check(assert-flag, negate-flag,
/// Convert|HasType …)`).
#[derive(Debug, Clone)]
pub enum CheckKind {
    Convert { lhs: Rc<Term>, rhs: Rc<Term> },
    HasType { term: Rc<Term>, ty: Rc<Term> },
}

/// The Rust encoding of the abstract entry stream (spec §6). Each variant
/// carries exactly the payload spec.md lists; source-span attachment is
/// the caller's concern — the kernel never invents one, so entries carry
/// none of their own.
#[derive(Debug, Clone)]
pub enum Entry {
    Decl { name: QName, staticity: Staticity, ty: Rc<Term> },
    Def { name: QName, opaque: bool, declared_type: Option<Rc<Term>>, body: Rc<Term> },
    Rules(Vec<RawRule>),
    Eval { cfg: ReductionConfig, term: Rc<Term> },
    Infer { cfg: ReductionConfig, term: Rc<Term> },
    Check { assert: bool, negate: bool, kind: CheckKind },
    DTree { module: Option<Rc<str>>, symbol: Rc<str> },
    Print(String),
    Name(Rc<str>),
    Require(ModuleId),
}

/// What a query entry reports back (spec §4.H: "runs a query through
/// 4.D/4.G"). Declarations report the name they added so a caller can log
/// progress; queries report their result; `Print` hands its string back
/// rather than writing it anywhere, leaving actual output to the
/// (out-of-scope) caller.
#[derive(Debug, Clone)]
pub enum EnvOutput {
    Declared(QName),
    Defined(QName),
    RulesAdded(usize),
    Evaluated(Rc<Term>),
    Inferred(Rc<Term>),
    CheckPassed,
    CheckFailed { reason: String },
    Tree { pivot: Option<usize> },
    Printed(String),
    Named(Rc<str>),
    Required(ModuleId),
}

/// External collaborator for `Require` (spec §6: no module-graph
/// resolution lives in the core). A caller supplies one to turn a
/// `ModuleId` into the entries that module contains.
pub trait ModuleLoader {
    fn load(&mut self, module: &ModuleId) -> Result<Vec<Entry>, EnvError>;
}
