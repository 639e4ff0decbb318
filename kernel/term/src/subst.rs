use std::rc::Rc;

use crate::shift::shift;
use crate::term::Term;

/// `body[0 ↦ value]`: replaces the outermost bound variable of `body`
/// with `value`, shifting `value` under each binder it is carried
/// through and shifting every other free index in `body` down by one
/// (spec §4.A).
pub fn subst(body: &Rc<Term>, value: &Rc<Term>) -> Rc<Term> {
    subst_at(0, body, value)
}

fn subst_at(depth: usize, body: &Rc<Term>, value: &Rc<Term>) -> Rc<Term> {
    match &**body {
        Term::Kind | Term::Type | Term::Const(_) => body.clone(),
        Term::DB(hint, i) => {
            if *i == depth {
                shift(depth, 0, value)
            } else if *i > depth {
                Term::db(hint.clone(), i - 1)
            } else {
                body.clone()
            }
        }
        Term::App(head, args) => {
            let head = subst_at(depth, head, value);
            let args = args.iter().map(|a| subst_at(depth, a, value)).collect();
            Rc::new(Term::App(head, args))
        }
        Term::Lam(hint, dom, inner) => {
            let dom = dom.as_ref().map(|d| subst_at(depth, d, value));
            let inner = subst_at(depth + 1, inner, value);
            Rc::new(Term::Lam(hint.clone(), dom, inner))
        }
        Term::Pi(hint, dom, cod) => {
            let dom = subst_at(depth, dom, value);
            let cod = subst_at(depth + 1, cod, value);
            Rc::new(Term::Pi(hint.clone(), dom, cod))
        }
    }
}

/// Simultaneous substitution of `env[0..k-1]` at the outermost `k`
/// binders of `body` (spec §4.A `psubst_l`): index `i < k` is replaced
/// by `env[i]` (shifted under whatever depth we have since descended),
/// index `i ≥ k` is shifted down by `k` to account for the `k` binders
/// that disappear.
pub fn psubst_l(env: &[Rc<Term>], body: &Rc<Term>) -> Rc<Term> {
    psubst_l_at(0, env, body)
}

fn psubst_l_at(depth: usize, env: &[Rc<Term>], body: &Rc<Term>) -> Rc<Term> {
    let k = env.len();
    if k == 0 {
        return body.clone();
    }
    match &**body {
        Term::Kind | Term::Type | Term::Const(_) => body.clone(),
        Term::DB(hint, i) => {
            if *i < depth {
                body.clone()
            } else if *i < depth + k {
                shift(depth, 0, &env[*i - depth])
            } else {
                Term::db(hint.clone(), i - k)
            }
        }
        Term::App(head, args) => {
            let head = psubst_l_at(depth, env, head);
            let args = args.iter().map(|a| psubst_l_at(depth, env, a)).collect();
            Rc::new(Term::App(head, args))
        }
        Term::Lam(hint, dom, inner) => {
            let dom = dom.as_ref().map(|d| psubst_l_at(depth, env, d));
            let inner = psubst_l_at(depth + 1, env, inner);
            Rc::new(Term::Lam(hint.clone(), dom, inner))
        }
        Term::Pi(hint, dom, cod) => {
            let dom = psubst_l_at(depth, env, dom);
            let cod = psubst_l_at(depth + 1, env, cod);
            Rc::new(Term::Pi(hint.clone(), dom, cod))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::NameHint;
    use crate::shift::shift as shift_fn;

    #[test]
    fn subst_replaces_outermost_bound_variable() {
        let value = Term::db(NameHint::new("v"), 5);
        let body = Term::db(NameHint::new("x"), 0);
        let result = subst(&body, &value);
        assert_eq!(result, value);
    }

    #[test]
    fn subst_commutes_with_shifting() {
        // shift(1,0, subst(b,u)) = subst(shift(1,1,b), shift(1,0,u))  (spec §8 property 3)
        let b = Term::app1(Term::db(NameHint::new("f"), 1), Term::db(NameHint::new("x"), 0));
        let u = Term::db(NameHint::new("u"), 2);

        let lhs = shift_fn(1, 0, &subst(&b, &u));
        let rhs = subst(&shift_fn(1, 1, &b), &shift_fn(1, 0, &u));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn psubst_l_substitutes_k_outer_binders_simultaneously() {
        let env = vec![
            Term::db(NameHint::new("a"), 10),
            Term::db(NameHint::new("b"), 20),
        ];
        // DB(0), DB(1), DB(2) under no extra binder: 0 and 1 come from env, 2 shifts down to 0.
        let body = Term::app(
            Term::db(NameHint::new("h"), 0),
            vec![Term::db(NameHint::new("x"), 1), Term::db(NameHint::new("y"), 2)],
        );
        let result = psubst_l(&env, &body);
        let expected = Term::app(
            Term::db(NameHint::new("a"), 10),
            vec![Term::db(NameHint::new("b"), 20), Term::db(NameHint::new("z"), 0)],
        );
        assert_eq!(result, expected);
    }
}
