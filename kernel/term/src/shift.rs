use std::rc::Rc;

use crate::error::TermError;
use crate::term::Term;

/// Adds `n` to every free index (index ≥ `cutoff`) in `t`. `cutoff` starts
/// at the caller-supplied value and increases by one under each binder.
pub fn shift(n: usize, cutoff: usize, t: &Rc<Term>) -> Rc<Term> {
    if n == 0 {
        return t.clone();
    }
    match &**t {
        Term::Kind | Term::Type | Term::Const(_) => t.clone(),
        Term::DB(hint, i) => {
            if *i >= cutoff {
                Term::db(hint.clone(), i + n)
            } else {
                t.clone()
            }
        }
        Term::App(head, args) => {
            let head = shift(n, cutoff, head);
            let args = args.iter().map(|a| shift(n, cutoff, a)).collect();
            Rc::new(Term::App(head, args))
        }
        Term::Lam(hint, dom, body) => {
            let dom = dom.as_ref().map(|d| shift(n, cutoff, d));
            let body = shift(n, cutoff + 1, body);
            Rc::new(Term::Lam(hint.clone(), dom, body))
        }
        Term::Pi(hint, dom, cod) => {
            let dom = shift(n, cutoff, dom);
            let cod = shift(n, cutoff + 1, cod);
            Rc::new(Term::Pi(hint.clone(), dom, cod))
        }
    }
}

/// Subtracts `n` from every free index in `t`, failing with
/// `TermError::Unshift` as soon as a free index below `n` is found —
/// callers (the reducer's `Syntactic` position reader, the matching
/// kernel) treat this as recoverable control flow and retry after
/// forcing normal form (spec §4.D, §9 "Control flow mapped from
/// exceptions").
pub fn unshift(n: usize, t: &Rc<Term>) -> Result<Rc<Term>, TermError> {
    unshift_at(n, 0, t)
}

fn unshift_at(n: usize, cutoff: usize, t: &Rc<Term>) -> Result<Rc<Term>, TermError> {
    if n == 0 {
        return Ok(t.clone());
    }
    match &**t {
        Term::Kind | Term::Type | Term::Const(_) => Ok(t.clone()),
        Term::DB(hint, i) => {
            if *i < cutoff {
                Ok(t.clone())
            } else if *i < cutoff + n {
                Err(TermError::Unshift { amount: n, index: *i })
            } else {
                Ok(Term::db(hint.clone(), i - n))
            }
        }
        Term::App(head, args) => {
            let head = unshift_at(n, cutoff, head)?;
            let args = args
                .iter()
                .map(|a| unshift_at(n, cutoff, a))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rc::new(Term::App(head, args)))
        }
        Term::Lam(hint, dom, body) => {
            let dom = dom.as_ref().map(|d| unshift_at(n, cutoff, d)).transpose()?;
            let body = unshift_at(n, cutoff + 1, body)?;
            Ok(Rc::new(Term::Lam(hint.clone(), dom, body)))
        }
        Term::Pi(hint, dom, cod) => {
            let dom = unshift_at(n, cutoff, dom)?;
            let cod = unshift_at(n, cutoff + 1, cod)?;
            Ok(Rc::new(Term::Pi(hint.clone(), dom, cod)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::NameHint;

    #[test]
    fn shift_then_unshift_is_identity() {
        let t = Term::db(NameHint::new("x"), 3);
        let shifted = shift(2, 0, &t);
        let back = unshift(2, &shifted).expect("unshift should succeed");
        assert_eq!(back, t);
    }

    #[test]
    fn unshift_fails_on_escaping_index() {
        let t = Term::db(NameHint::new("x"), 0);
        assert!(unshift(1, &t).is_err());
    }

    #[test]
    fn shift_respects_binder_cutoff() {
        let bound = Term::db(NameHint::new("x"), 0);
        let lam = Term::lam(NameHint::new("x"), None, bound);
        let shifted = shift(1, 0, &lam);
        assert_eq!(shifted, lam);
    }
}
