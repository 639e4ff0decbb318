use std::rc::Rc;

use lfkernel_term::{NameHint, Term};

/// The surface shape of a left-hand-side pattern, as handed to `kernel/typeck`
/// by whatever out-of-scope parser produced it. `Atom` covers both what
/// elaborates into a `Pattern::Var` (a bound pattern variable, possibly
/// applied to further bound variables) and what elaborates into a
/// `Pattern::Pattern` (a rigid constructor applied to sub-patterns) — §4.F
/// only tells them apart once it knows whether the name is bound in Γ.
#[derive(Debug, Clone)]
pub enum RawPattern {
    Atom(Rc<str>, Vec<RawPattern>),
    Lambda(NameHint, Box<RawPattern>),
    Brackets(Rc<Term>),
    Unknown(usize),
}

impl RawPattern {
    pub fn atom(name: impl Into<Rc<str>>, args: Vec<RawPattern>) -> RawPattern {
        RawPattern::Atom(name.into(), args)
    }

    pub fn var(name: impl Into<Rc<str>>) -> RawPattern {
        RawPattern::Atom(name.into(), Vec::new())
    }
}

/// A deferred type equation gathered while elaborating a left-hand side,
/// solved at the end by `unify::solve` (spec §4.F: "a first-order unifier
/// with occurs-check").
#[derive(Debug, Clone)]
pub struct Equation {
    pub left: Rc<Term>,
    pub right: Rc<Term>,
}

impl Equation {
    pub fn new(left: Rc<Term>, right: Rc<Term>) -> Equation {
        Equation { left, right }
    }
}
