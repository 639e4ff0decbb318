use std::rc::Rc;

use lfkernel_term::{NameHint, Term};

use crate::error::MatchError;
use crate::normalizer::Normalizer;

/// Solves `u x_1 … x_k ≡ t` for `u`, where `t` is a term found `depth`
/// abstractions below the matching problem's root and `bound_vars` is
/// the (distinct) list of bound-variable indices the pattern variable was
/// applied to, in application order (spec §4.C).
///
/// On success, `u` is returned already wrapped in `bound_vars.len()`
/// binders — `u` applied back to `x_1 … x_k` beta-reduces to (a
/// reindexing of) `t`, which is what a decision-tree leaf substitutes
/// into the rewrite context.
///
/// `bound_vars[0]` corresponds to the innermost of the wrapping binders;
/// this is an internal convention, not observable outside this crate.
pub fn solve(
    depth: usize,
    bound_vars: &[usize],
    t: &Rc<Term>,
    normalizer: &dyn Normalizer,
) -> Result<Rc<Term>, MatchError> {
    match project(0, depth, bound_vars, t) {
        Ok(body) => Ok(wrap(bound_vars.len(), body)),
        Err(MatchError::NotUnifiable) => {
            let normal = normalizer.whnf(t.clone())?;
            let body = project(0, depth, bound_vars, &normal)?;
            Ok(wrap(bound_vars.len(), body))
        }
    }
}

fn wrap(k: usize, mut body: Rc<Term>) -> Rc<Term> {
    for _ in 0..k {
        body = Term::lam(NameHint::anonymous(), None, body);
    }
    body
}

/// `extra` counts binders introduced by `t` itself during the recursion
/// (these are untouched — they are the solved term's own local binders);
/// indices at or beyond `extra` are relative to the `depth`-deep context
/// the matching problem was posed in.
fn project(extra: usize, depth: usize, bound_vars: &[usize], t: &Rc<Term>) -> Result<Rc<Term>, MatchError> {
    match &**t {
        Term::Kind | Term::Type | Term::Const(_) => Ok(t.clone()),
        Term::DB(hint, n) => {
            if *n < extra {
                return Ok(t.clone());
            }
            let local = n - extra;
            if local >= depth {
                // Free above the problem's depth: keep it free, but reindex
                // past the k fresh binders `wrap` will add and the `extra`
                // local binders we have since descended through.
                let shifted = extra + bound_vars.len() + (local - depth);
                return Ok(Term::db(hint.clone(), shifted));
            }
            match bound_vars.iter().position(|&x| x == local) {
                Some(i) => Ok(Term::db(hint.clone(), extra + i)),
                None => Err(MatchError::NotUnifiable),
            }
        }
        Term::App(head, args) => {
            let head = project(extra, depth, bound_vars, head)?;
            let args = args
                .iter()
                .map(|a| project(extra, depth, bound_vars, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rc::new(Term::App(head, args)))
        }
        Term::Lam(hint, dom, body) => {
            let dom = dom.as_ref().map(|d| project(extra, depth, bound_vars, d)).transpose()?;
            let body = project(extra + 1, depth, bound_vars, body)?;
            Ok(Rc::new(Term::Lam(hint.clone(), dom, body)))
        }
        Term::Pi(hint, dom, cod) => {
            let dom = project(extra, depth, bound_vars, dom)?;
            let cod = project(extra + 1, depth, bound_vars, cod)?;
            Ok(Rc::new(Term::Pi(hint.clone(), dom, cod)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lfkernel_term::QName;

    struct NoopNormalizer;
    impl Normalizer for NoopNormalizer {
        fn whnf(&self, t: Rc<Term>) -> Result<Rc<Term>, MatchError> {
            Ok(t)
        }
    }

    #[test]
    fn projects_a_bound_variable_to_the_new_binder() {
        // depth 1, bound_vars = [0]; t = DB(0) -> solved u should be \_. DB(0)
        let t = Term::db(NameHint::new("x"), 0);
        let u = solve(1, &[0], &t, &NoopNormalizer).expect("solves");
        match &*u {
            Term::Lam(_, None, body) => assert_eq!(**body, Term::DB(NameHint::anonymous(), 0)),
            _ => panic!("expected a single binder"),
        }
    }

    #[test]
    fn fails_when_a_disallowed_bound_variable_escapes() {
        // depth 2, bound_vars = [0]; t mentions DB(1), which is bound but not in bound_vars
        let t = Term::db(NameHint::new("y"), 1);
        assert_eq!(solve(2, &[0], &t, &NoopNormalizer), Err(MatchError::NotUnifiable));
    }

    #[test]
    fn keeps_constants_and_free_variables_untouched() {
        let c = Term::const_(QName::new("m", "f"));
        let u = solve(0, &[], &c, &NoopNormalizer).expect("solves");
        assert_eq!(*u, *c);
    }
}
