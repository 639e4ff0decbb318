use std::rc::Rc;

use crate::ident::{NameHint, QName};
use crate::term::Term;

/// Left-hand-side pattern algebra (spec §3 "Pattern").
///
/// `Var`'s `applied_args` are themselves patterns, restricted (by the
/// Miller discipline, enforced in `kernel/matching` and `kernel/patterns`,
/// not by this type) to distinct bound variables.
#[derive(Debug, Clone)]
pub enum Pattern {
    Var(NameHint, usize, Vec<Pattern>),
    Pattern(QName, Vec<Pattern>),
    Lambda(NameHint, Box<Pattern>),
    Brackets(Rc<Term>),
    Joker(usize),
}

impl Pattern {
    pub fn var(hint: NameHint, index: usize, applied_args: Vec<Pattern>) -> Pattern {
        Pattern::Var(hint, index, applied_args)
    }

    pub fn constructor(name: QName, sub_patterns: Vec<Pattern>) -> Pattern {
        Pattern::Pattern(name, sub_patterns)
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Pattern::Joker(_))
    }

    /// A column shape that never becomes a `Switch` branch: a pattern
    /// variable (plain or Miller-applied), a joker, or a bracket guard —
    /// none of these are a `CaseShape`. Used by the tree compiler's
    /// column-selection heuristic (spec §4.E step 2).
    pub fn is_variable_like(&self) -> bool {
        matches!(self, Pattern::Joker(_) | Pattern::Var(_, _, _) | Pattern::Brackets(_))
    }
}
