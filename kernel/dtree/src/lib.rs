//! Decision-tree types and the rewrite-rule compiler (component E).
//!
//! Depends only on `kernel/term`; consumed by `kernel/signature` (which
//! stores the compiled tree per head symbol) and `kernel/reduce` (whose
//! `gamma_rewrite` walks it).

mod compile;
mod error;
mod problem;
mod rule;
mod tree;

pub use compile::compile;
pub use error::CompileError;
pub use problem::{Guard, MatchProblem, MillerProblem, SyntacticPosition};
pub use rule::CompiledRule;
pub use tree::{CaseShape, DTree};

#[cfg(test)]
mod tests {
    use super::*;
    use lfkernel_term::{NameHint, Pattern, QName, Term};
    use std::rc::Rc;

    fn q(name: &str) -> QName {
        QName::new("nat", name)
    }

    #[test]
    fn single_variable_rule_compiles_to_one_leaf() {
        // id x --> x   (S1 from the scenario list)
        let rule = CompiledRule {
            name: Rc::from("id_x"),
            head: q("id"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        let (pivot, tree) = compile(&[rule]).expect("compiles");
        assert_eq!(pivot, 1);
        match tree {
            DTree::Test { problem: MatchProblem::Syntactic(positions), default, .. } => {
                assert_eq!(positions.len(), 1);
                assert_eq!(positions[0].column, 0);
                assert!(default.is_none());
            }
            _ => panic!("expected a single Test leaf"),
        }
    }

    #[test]
    fn rigid_first_column_produces_a_switch() {
        // plus z m --> m ; plus (s n) m --> s (plus n m)
        let z_rule = CompiledRule {
            name: Rc::from("plus_z"),
            head: q("plus"),
            patterns: vec![
                Pattern::constructor(q("z"), vec![]),
                Pattern::var(NameHint::new("m"), 0, vec![]),
            ],
            rhs: Term::db(NameHint::new("m"), 0),
        };
        let s_rule = CompiledRule {
            name: Rc::from("plus_s"),
            head: q("plus"),
            patterns: vec![
                Pattern::constructor(q("s"), vec![Pattern::var(NameHint::new("n"), 0, vec![])]),
                Pattern::var(NameHint::new("m"), 1, vec![]),
            ],
            rhs: Term::app1(
                Term::const_(q("s")),
                Term::app(
                    Term::const_(q("plus")),
                    vec![Term::db(NameHint::new("n"), 0), Term::db(NameHint::new("m"), 1)],
                ),
            ),
        };
        let (pivot, tree) = compile(&[z_rule, s_rule]).expect("compiles");
        assert_eq!(pivot, 2);
        match tree {
            DTree::Switch { column, cases, .. } => {
                assert_eq!(column, 0);
                assert_eq!(cases.len(), 2);
            }
            _ => panic!("expected a Switch on the first column"),
        }
    }

    #[test]
    fn mismatched_heads_are_rejected() {
        let a = CompiledRule {
            name: Rc::from("a"),
            head: q("f"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        let b = CompiledRule {
            name: Rc::from("b"),
            head: q("g"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        assert!(compile(&[a, b]).is_err());
    }
}
