use std::rc::Rc;

use lfkernel_dtree::{CompiledRule, DTree};
use lfkernel_term::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staticity {
    Static,
    Definable,
}

/// What the signature stores for one qualified name. `rules` and
/// `all_rules` are `None`/empty until the first `add_rules` call;
/// `all_rules` is kept so a later `add_rules` for the same head can
/// recompile the merged set from scratch (spec §4.B: "invokes 4.E to
/// recompile the merged tree").
#[derive(Debug, Clone)]
pub(crate) struct SymbolEntry {
    pub staticity: Staticity,
    pub ty: Rc<Term>,
    pub all_rules: Vec<CompiledRule>,
    pub compiled: Option<(usize, DTree)>,
}

impl SymbolEntry {
    pub fn new(staticity: Staticity, ty: Rc<Term>) -> Self {
        SymbolEntry { staticity, ty, all_rules: Vec::new(), compiled: None }
    }
}
