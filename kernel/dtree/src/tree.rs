use std::rc::Rc;

use lfkernel_term::{QName, Term};

use crate::problem::{Guard, MatchProblem};

/// The shape a decision-tree `Switch` branches on (spec §3 "Decision
/// tree"): a rigid constructor at a given arity, a bound-variable
/// reference at a given arity, or a plain lambda.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaseShape {
    Const(QName, usize),
    Db(usize, usize),
    Lambda,
}

/// A compiled decision tree, consumed by `kernel/reduce`'s `gamma_rewrite`
/// walker (spec §4.D).
#[derive(Debug, Clone)]
pub enum DTree {
    Switch {
        column: usize,
        cases: Vec<(CaseShape, Rc<DTree>)>,
        default: Option<Rc<DTree>>,
    },
    Test {
        rule_name: Rc<str>,
        problem: MatchProblem,
        guards: Vec<Guard>,
        rhs: Rc<Term>,
        default: Option<Rc<DTree>>,
    },
}
