use std::rc::Rc;

use fxhash::FxHashMap;
use lfkernel_dtree::{compile, CompiledRule, DTree};
use lfkernel_term::{QName, Term};

use crate::entry::{Staticity, SymbolEntry};
use crate::error::SigError;
use crate::oracle::ConfluenceOracle;

/// The global mapping from qualified names to declarations and their
/// compiled rewrite trees (spec §3 "Signature", §4.B). Mutable only
/// through monotonic extension: `add_declaration` never overwrites an
/// existing entry, `add_rules` only ever grows the rule set a symbol
/// already has.
#[derive(Debug, Default)]
pub struct Signature {
    entries: FxHashMap<QName, SymbolEntry>,
}

impl Signature {
    pub fn new() -> Self {
        Signature { entries: FxHashMap::default() }
    }

    pub fn get_type(&self, name: &QName) -> Result<Rc<Term>, SigError> {
        self.entries
            .get(name)
            .map(|e| e.ty.clone())
            .ok_or_else(|| SigError::SymbolNotFound(name.clone()))
    }

    pub fn staticity(&self, name: &QName) -> Result<Staticity, SigError> {
        self.entries
            .get(name)
            .map(|e| e.staticity)
            .ok_or_else(|| SigError::SymbolNotFound(name.clone()))
    }

    /// The compiled tree for `name`, if any rules have been added yet.
    /// `Ok(None)` distinguishes "declared, no rules" from
    /// `Err(SymbolNotFound)`, "never declared".
    pub fn get_tree(&self, name: &QName) -> Result<Option<(usize, &DTree)>, SigError> {
        let entry = self.entries.get(name).ok_or_else(|| SigError::SymbolNotFound(name.clone()))?;
        Ok(entry.compiled.as_ref().map(|(pivot, tree)| (*pivot, tree)))
    }

    /// Definable symbols with no compiled rule tree yet — useful for a
    /// `DTree` query entry that must report "no rules" rather than treat
    /// an un-ruled symbol as an error.
    pub fn iter_definable(&self) -> impl Iterator<Item = &QName> {
        self.entries
            .iter()
            .filter(|(_, e)| e.staticity == Staticity::Definable)
            .map(|(name, _)| name)
    }

    pub fn add_declaration(&mut self, name: QName, staticity: Staticity, ty: Rc<Term>) -> Result<(), SigError> {
        if self.entries.contains_key(&name) {
            return Err(SigError::AlreadyDefined(name));
        }
        log::trace!("signature: declaring `{}`", name);
        self.entries.insert(name, SymbolEntry::new(staticity, ty));
        Ok(())
    }

    /// Adds a batch of rules sharing a head symbol, recompiling the
    /// merged decision tree and consulting `oracle` before committing
    /// (spec §4.B). All of `rules` must share `head`; this is enforced
    /// by `kernel/dtree::compile` and surfaces as `CompileError`, wrapped
    /// in `SigError::TreeCompile`.
    pub fn add_rules(
        &mut self,
        head: &QName,
        rules: &[CompiledRule],
        oracle: &dyn ConfluenceOracle,
    ) -> Result<(), SigError> {
        if rules.is_empty() {
            return Ok(());
        }
        let entry = self.entries.get(head).ok_or_else(|| SigError::SymbolNotFound(head.clone()))?;
        if entry.staticity != Staticity::Definable {
            return Err(SigError::CannotRewriteStaticSymbol(head.clone()));
        }

        let mut merged = entry.all_rules.clone();
        merged.extend_from_slice(rules);

        let (pivot, tree) =
            compile(&merged).map_err(|source| SigError::TreeCompile { symbol: head.clone(), source })?;

        oracle
            .check_confluence(head, pivot, &tree)
            .map_err(|reason| SigError::ConfluenceCheckFailed { symbol: head.clone(), reason })?;

        log::trace!("signature: compiled {} rule(s) for `{}`, pivot {}", merged.len(), head, pivot);

        let entry = self.entries.get_mut(head).expect("looked up above");
        entry.all_rules = merged;
        entry.compiled = Some((pivot, tree));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::AssumeConfluent;
    use lfkernel_term::{NameHint, Pattern};

    fn q(name: &str) -> QName {
        QName::new("m", name)
    }

    #[test]
    fn unknown_symbol_errors() {
        let sig = Signature::new();
        assert!(matches!(sig.get_type(&q("x")), Err(SigError::SymbolNotFound(_))));
    }

    #[test]
    fn redeclaring_a_symbol_fails() {
        let mut sig = Signature::new();
        sig.add_declaration(q("a"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        assert!(matches!(
            sig.add_declaration(q("a"), Staticity::Static, Term::const_(q("Type"))),
            Err(SigError::AlreadyDefined(_))
        ));
    }

    #[test]
    fn static_symbols_reject_rules() {
        let mut sig = Signature::new();
        sig.add_declaration(q("a"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        let rule = CompiledRule {
            name: Rc::from("r"),
            head: q("a"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        assert!(matches!(
            sig.add_rules(&q("a"), &[rule], &AssumeConfluent),
            Err(SigError::CannotRewriteStaticSymbol(_))
        ));
    }

    #[test]
    fn rules_accumulate_across_calls() {
        let mut sig = Signature::new();
        sig.add_declaration(q("id"), Staticity::Definable, Term::const_(q("Type"))).unwrap();
        let rule = CompiledRule {
            name: Rc::from("id_x"),
            head: q("id"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        sig.add_rules(&q("id"), std::slice::from_ref(&rule), &AssumeConfluent).unwrap();
        let (pivot, _) = sig.get_tree(&q("id")).unwrap().unwrap();
        assert_eq!(pivot, 1);
    }
}
