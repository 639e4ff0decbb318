use std::rc::Rc;

use lfkernel_term::Term;

/// One pattern-variable's recorded position for a `Syntactic` leaf: the
/// stack column it was matched at, and the abstraction depth it sits
/// under within that column (spec §4.D `Syntactic(positions)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntacticPosition {
    pub column: usize,
    pub depth: usize,
}

/// One pattern-variable's recorded position for a `MillerPattern` leaf:
/// the column, its enclosing abstraction depth, and the bound-variable
/// indices it is applied to (spec §4.D `MillerPattern(abstract-problems)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MillerProblem {
    pub column: usize,
    pub depth: usize,
    pub bound_vars: Vec<usize>,
}

/// The matching discipline a leaf's right-hand side needs in order to
/// reconstruct its context from the reducer's stack (spec §4.D).
#[derive(Debug, Clone)]
pub enum MatchProblem {
    Syntactic(Vec<SyntacticPosition>),
    MillerPattern(Vec<MillerProblem>),
}

/// A leaf-level side condition, checked after a candidate context has
/// been built and before the rule is allowed to fire (spec §4.D
/// "Guards").
#[derive(Debug, Clone)]
pub enum Guard {
    /// The `i`-th and `j`-th context entries must be convertible —
    /// enforces a non-left-linear rule such as `eq x x`.
    Linearity(usize, usize),
    /// The `i`-th context entry must be convertible to `t`; violation is
    /// a hard `GuardNotSatisfied`, never a fall-through to `default`.
    Bracket(usize, Rc<Term>),
}
