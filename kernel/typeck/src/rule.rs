use std::collections::BTreeMap;
use std::rc::Rc;

use lfkernel_dtree::CompiledRule;
use lfkernel_patterns::{apply_subst, fresh_hole, infer_pattern_type, RawPattern};
use lfkernel_reduce::{ReductionConfig, Reducer};
use lfkernel_signature::Signature;
use lfkernel_term::{Context, NameHint, Pattern, QName, Term};

use crate::error::TypeError;
use crate::judgement::check;

/// A rewrite rule as handed to the kernel by whatever out-of-scope parser
/// produced it: a declared pattern-variable context (each entry optionally
/// carrying an explicit type — absent entries get a fresh hole, solved by
/// elaborating the left-hand side per spec §4.F), the left-hand side's
/// head and raw argument patterns, and a right-hand side that refers to
/// context entries by the same de Bruijn convention `kernel/term::Context`
/// uses (spec §3 "Rule (typed)", built from an untyped input record).
#[derive(Debug, Clone)]
pub struct RawRule {
    pub name: Rc<str>,
    pub var_names: Vec<NameHint>,
    pub declared_types: Vec<Option<Rc<Term>>>,
    pub lhs_head: QName,
    pub lhs_args: Vec<RawPattern>,
    pub rhs: Rc<Term>,
}

/// Component G's rule checker (spec §4.G "check_rule"), orchestrating
/// C–F: builds the pattern-variable context, elaborates the left-hand
/// side (component F, which itself drives the Miller matching kernel's
/// discipline at the `Pattern` level), type-checks the right-hand side
/// against the inferred left-hand-side type, and verifies the arity
/// invariant before handing a `CompiledRule` to the caller (who forwards
/// it to `kernel/signature::add_rules`, i.e. component E).
pub fn check_rule(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    raw: &RawRule,
) -> Result<CompiledRule, TypeError> {
    let mut ctx = Context::new();
    let mut declared_in_order: Vec<Rc<Term>> = Vec::with_capacity(raw.var_names.len());
    for (i, (hint, declared)) in raw.var_names.iter().zip(raw.declared_types.iter()).enumerate() {
        let ty = match declared {
            Some(t) => check(sig, reducer, cfg, &ctx, t, &Rc::new(Term::Type))?,
            None => fresh_hole(i),
        };
        declared_in_order.push(ty.clone());
        ctx = ctx.extend(hint.clone(), ty);
    }

    let (patterns, lhs_type, solution) =
        infer_pattern_type(sig, reducer, cfg, &ctx, &raw.lhs_head, &raw.lhs_args)?;

    let mut final_ctx = Context::new();
    for (hint, ty) in raw.var_names.iter().zip(declared_in_order.iter()) {
        final_ctx = final_ctx.extend(hint.clone(), apply_subst(&solution, ty));
    }

    let elaborated_rhs = check(sig, reducer, cfg, &final_ctx, &raw.rhs, &lhs_type)?;

    check_arity_invariant(&raw.var_names, &patterns, &elaborated_rhs)?;

    log::trace!("typeck: rule `{}` on `{}` checked, {} pattern(s)", raw.name, raw.lhs_head, patterns.len());

    Ok(CompiledRule { name: raw.name.clone(), head: raw.lhs_head.clone(), patterns, rhs: elaborated_rhs })
}

/// Every pattern-variable's occurrence count in the right-hand side, per
/// application site, must be at least the arity it was matched at on the
/// left-hand side (spec §4.G step 4, "arity invariant").
fn check_arity_invariant(
    var_names: &[NameHint],
    patterns: &[Pattern],
    rhs: &Rc<Term>,
) -> Result<(), TypeError> {
    let mut lhs_arities = BTreeMap::new();
    collect_var_arities(patterns, &mut lhs_arities);
    walk_rhs(rhs, 0, &lhs_arities, var_names)
}

fn collect_var_arities(patterns: &[Pattern], out: &mut BTreeMap<usize, usize>) {
    for p in patterns {
        collect_one(p, out);
    }
}

fn collect_one(p: &Pattern, out: &mut BTreeMap<usize, usize>) {
    match p {
        Pattern::Var(_, index, applied_args) => {
            let arity = applied_args.len();
            out.entry(*index).and_modify(|a| *a = (*a).max(arity)).or_insert(arity);
        }
        Pattern::Pattern(_, sub_patterns) => collect_var_arities(sub_patterns, out),
        Pattern::Lambda(_, inner) => collect_one(inner, out),
        Pattern::Brackets(_) | Pattern::Joker(_) => {}
    }
}

fn walk_rhs(
    t: &Rc<Term>,
    depth: usize,
    lhs_arities: &BTreeMap<usize, usize>,
    var_names: &[NameHint],
) -> Result<(), TypeError> {
    match &**t {
        Term::Kind | Term::Type | Term::Const(_) => Ok(()),
        Term::DB(_, n) => check_occurrence(*n, depth, 0, lhs_arities, var_names),
        Term::App(head, args) => {
            match &**head {
                Term::DB(_, n) => check_occurrence(*n, depth, args.len(), lhs_arities, var_names)?,
                _ => walk_rhs(head, depth, lhs_arities, var_names)?,
            }
            for a in args {
                walk_rhs(a, depth, lhs_arities, var_names)?;
            }
            Ok(())
        }
        Term::Lam(_, domain, body) => {
            if let Some(d) = domain {
                walk_rhs(d, depth, lhs_arities, var_names)?;
            }
            walk_rhs(body, depth + 1, lhs_arities, var_names)
        }
        Term::Pi(_, domain, codomain) => {
            walk_rhs(domain, depth, lhs_arities, var_names)?;
            walk_rhs(codomain, depth + 1, lhs_arities, var_names)
        }
    }
}

fn check_occurrence(
    n: usize,
    depth: usize,
    used_arity: usize,
    lhs_arities: &BTreeMap<usize, usize>,
    var_names: &[NameHint],
) -> Result<(), TypeError> {
    if n < depth {
        // Bound by a binder introduced within the right-hand side itself,
        // not one of the rule's pattern variables.
        return Ok(());
    }
    let index = n - depth;
    if let Some(&declared_arity) = lhs_arities.get(&index) {
        if used_arity < declared_arity {
            // `index` is a Context-style De Bruijn index (0 = innermost,
            // i.e. the last-declared variable); `var_names` is stored in
            // declaration order, so the two run in opposite directions.
            let var = var_names
                .len()
                .checked_sub(index + 1)
                .and_then(|i| var_names.get(i))
                .map(|h| h.0.clone())
                .unwrap_or_else(|| Rc::from("?"));
            return Err(TypeError::NotEnoughArguments { var, declared_arity, used_arity });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfkernel_patterns::RawPattern;
    use lfkernel_signature::Staticity;
    use lfkernel_term::QName;

    fn q(name: &str) -> QName {
        QName::new("m", name)
    }

    #[test]
    fn scenario_s1_identity_rule_checks() {
        // A : Type, id : A -> A, rule: id x --> x
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Rc::new(Term::Type)).unwrap();
        sig.add_declaration(
            q("id"),
            Staticity::Definable,
            Term::pi(NameHint::anonymous(), Term::const_(q("A")), Term::const_(q("A"))),
        )
        .unwrap();
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let raw = RawRule {
            name: Rc::from("id_x"),
            var_names: vec![NameHint::new("x")],
            declared_types: vec![None],
            lhs_head: q("id"),
            lhs_args: vec![RawPattern::var("x")],
            rhs: Term::db(NameHint::new("x"), 0),
        };

        let compiled = check_rule(&sig, &reducer, &cfg, &raw).unwrap();
        assert_eq!(compiled.head, q("id"));
        assert_eq!(compiled.patterns.len(), 1);
    }

    #[test]
    fn arity_invariant_rejects_underapplied_variable() {
        // apply : (A -> B) -> A -> B ; rule apply f a --> f   (drops the argument f needs)
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Rc::new(Term::Type)).unwrap();
        sig.add_declaration(q("B"), Staticity::Static, Rc::new(Term::Type)).unwrap();
        sig.add_declaration(
            q("apply"),
            Staticity::Definable,
            Term::pi(
                NameHint::anonymous(),
                Term::pi(NameHint::anonymous(), Term::const_(q("A")), Term::const_(q("B"))),
                Term::pi(NameHint::anonymous(), Term::const_(q("A")), Term::const_(q("B"))),
            ),
        )
        .unwrap();
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        // f is applied to `a` on the LHS (arity 1 via Miller pattern), but the
        // RHS only mentions `f` bare (arity 0) -- must be rejected.
        let raw = RawRule {
            name: Rc::from("bad"),
            var_names: vec![NameHint::new("f"), NameHint::new("a")],
            declared_types: vec![None, None],
            lhs_head: q("apply"),
            lhs_args: vec![
                RawPattern::Lambda(
                    NameHint::new("z"),
                    Box::new(RawPattern::atom("f", vec![RawPattern::var("z")])),
                ),
                RawPattern::var("a"),
            ],
            rhs: Term::db(NameHint::new("f"), 1),
        };

        let err = check_rule(&sig, &reducer, &cfg, &raw).unwrap_err();
        assert!(matches!(err, TypeError::NotEnoughArguments { .. }));
    }
}
