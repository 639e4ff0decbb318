use std::collections::BTreeMap;
use std::rc::Rc;

use lfkernel_term::{QName, Term};

use crate::error::PatternError;
use crate::raw::Equation;

/// The reserved module name under which this crate mints metavariables —
/// a `Const` whose module is this string never appears in a signature or
/// in user-written terms, only in the provisional types `kernel/typeck`
/// assigns to pattern variables whose declared type is left for §4.F to
/// infer.
const HOLE_MODULE: &str = "$hole";

pub fn fresh_hole(index: usize) -> Rc<Term> {
    Term::const_(QName::new(HOLE_MODULE, index.to_string()))
}

fn as_hole(t: &Term) -> Option<usize> {
    match t {
        Term::Const(q) if q.module.as_ref() == HOLE_MODULE => q.name.parse().ok(),
        _ => None,
    }
}

/// A solved substitution: hole index -> its solution.
pub type Substitution = BTreeMap<usize, Rc<Term>>;

pub fn apply_subst(subst: &Substitution, t: &Rc<Term>) -> Rc<Term> {
    if let Some(n) = as_hole(t) {
        if let Some(solved) = subst.get(&n) {
            return apply_subst(subst, solved);
        }
        return t.clone();
    }
    match &**t {
        Term::Kind | Term::Type | Term::DB(_, _) | Term::Const(_) => t.clone(),
        Term::App(head, args) => {
            let head = apply_subst(subst, head);
            let args = args.iter().map(|a| apply_subst(subst, a)).collect();
            Term::app(head, args)
        }
        Term::Lam(hint, dom, body) => {
            let dom = dom.as_ref().map(|d| apply_subst(subst, d));
            let body = apply_subst(subst, body);
            Term::lam(hint.clone(), dom, body)
        }
        Term::Pi(hint, dom, cod) => {
            let dom = apply_subst(subst, dom);
            let cod = apply_subst(subst, cod);
            Term::pi(hint.clone(), dom, cod)
        }
    }
}

fn occurs(n: usize, t: &Rc<Term>) -> bool {
    if as_hole(t) == Some(n) {
        return true;
    }
    match &**t {
        Term::Kind | Term::Type | Term::DB(_, _) | Term::Const(_) => false,
        Term::App(head, args) => occurs(n, head) || args.iter().any(|a| occurs(n, a)),
        Term::Lam(_, dom, body) => dom.as_ref().is_some_and(|d| occurs(n, d)) || occurs(n, body),
        Term::Pi(_, dom, cod) => occurs(n, dom) || occurs(n, cod),
    }
}

/// First-order syntactic unification with occurs-check over an equation
/// set accumulated by `infer::infer_pattern_type` (spec §4.F, last
/// paragraph). Purely syntactic: it never forces terms to whnf, since the
/// equations it is given already relate whnf-forced expected types to
/// concrete (possibly hole-containing) declared types.
pub fn solve(equations: Vec<Equation>) -> Result<Substitution, PatternError> {
    let mut worklist = equations;
    let mut subst = Substitution::new();
    while let Some(eq) = worklist.pop() {
        let left = apply_subst(&subst, &eq.left);
        let right = apply_subst(&subst, &eq.right);
        unify_pair(left, right, &mut subst)?;
    }
    Ok(subst)
}

fn unify_pair(left: Rc<Term>, right: Rc<Term>, subst: &mut Substitution) -> Result<(), PatternError> {
    if left == right {
        return Ok(());
    }
    if let Some(n) = as_hole(&left) {
        return bind(n, right, subst);
    }
    if let Some(n) = as_hole(&right) {
        return bind(n, left, subst);
    }
    match (&*left, &*right) {
        (Term::Kind, Term::Kind) | (Term::Type, Term::Type) => Ok(()),
        (Term::DB(_, a), Term::DB(_, b)) if a == b => Ok(()),
        (Term::Const(a), Term::Const(b)) if a == b => Ok(()),
        (Term::App(fh, fa), Term::App(gh, ga)) if fa.len() == ga.len() => {
            unify_pair(fh.clone(), gh.clone(), subst)?;
            for (a, b) in fa.iter().zip(ga.iter()) {
                unify_pair(a.clone(), b.clone(), subst)?;
            }
            Ok(())
        }
        (Term::Lam(_, Some(da), ba), Term::Lam(_, Some(db), bb)) => {
            unify_pair(da.clone(), db.clone(), subst)?;
            unify_pair(ba.clone(), bb.clone(), subst)
        }
        (Term::Lam(_, None, ba), Term::Lam(_, None, bb)) => unify_pair(ba.clone(), bb.clone(), subst),
        (Term::Pi(_, da, ca), Term::Pi(_, db, cb)) => {
            unify_pair(da.clone(), db.clone(), subst)?;
            unify_pair(ca.clone(), cb.clone(), subst)
        }
        _ => Err(PatternError::UnsatisfiableConstraints { left, right }),
    }
}

fn bind(n: usize, t: Rc<Term>, subst: &mut Substitution) -> Result<(), PatternError> {
    if let Some(m) = as_hole(&t) {
        if m == n {
            return Ok(());
        }
    }
    if occurs(n, &t) {
        return Err(PatternError::UnsatisfiableConstraints { left: fresh_hole(n), right: t });
    }
    subst.insert(n, t);
    Ok(())
}
