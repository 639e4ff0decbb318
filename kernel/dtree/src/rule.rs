use std::rc::Rc;

use lfkernel_term::{Pattern, QName, Term};

/// One untyped-but-elaborated rewrite rule ready for tree compilation:
/// the arity is simply `patterns.len()` (spec §4.E).
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: Rc<str>,
    pub head: QName,
    pub patterns: Vec<Pattern>,
    pub rhs: Rc<Term>,
}

/// A row of the compilation matrix: one rule's patterns, right-padded to
/// the shared column width with fresh `Joker`s (spec §4.E step 1).
///
/// `depths` tracks, for each column, how many pattern-`Lambda`s it sits
/// under — needed so a leaf can record the abstraction depth a `Var`
/// occurrence is found at (spec §4.D's `Syntactic`/`MillerPattern`
/// positions carry a depth alongside the column).
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub name: Rc<str>,
    pub columns: Vec<Pattern>,
    pub depths: Vec<usize>,
    pub rhs: Rc<Term>,
}

impl Row {
    pub fn from_rule(rule: &CompiledRule, width: usize, next_joker: &mut usize) -> Row {
        let mut columns = rule.patterns.clone();
        while columns.len() < width {
            columns.push(Pattern::Joker(*next_joker));
            *next_joker += 1;
        }
        let depths = vec![0; columns.len()];
        Row { name: rule.name.clone(), columns, depths, rhs: rule.rhs.clone() }
    }
}
