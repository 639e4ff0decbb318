//! The abstract-machine reducer (component D): weak-head normalisation
//! driven by compiled decision trees, plus derived snf/hnf/nsteps and a
//! convertibility test.

mod config;
mod error;
mod reducer;
mod thunk;

pub use config::{EvalLogger, ReductionConfig, RuleSelector, Strategy, Target};
pub use error::ReduceError;
pub use reducer::Reducer;
pub use thunk::{force, term_of_state, Env, State, Thunk, ThunkCell};

#[cfg(test)]
mod tests {
    use super::*;
    use lfkernel_dtree::CompiledRule;
    use lfkernel_signature::{AssumeConfluent, Signature, Staticity};
    use lfkernel_term::{NameHint, Pattern, QName, Term};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn q(name: &str) -> QName {
        QName::new("m", name)
    }

    #[test]
    fn whnf_of_a_normal_term_is_itself() {
        let sig = Signature::new();
        let reducer = Reducer::new(&sig);
        let t = Term::const_(q("a"));
        let result = reducer.whnf(&t, &ReductionConfig::default()).unwrap();
        assert_eq!(result, t);
    }

    /// A bare index free above an empty environment is already whnf
    /// (spec §4.D rule 3) — this must terminate rather than loop forever
    /// recomputing the same state, which snf/hnf both rely on when they
    /// descend under a binder (snf(\x. x) calls whnf on the body, DB(0),
    /// with an empty environment).
    #[test]
    fn whnf_of_a_free_de_bruijn_index_terminates() {
        let sig = Signature::new();
        let reducer = Reducer::new(&sig);
        let t = Term::db(NameHint::new("x"), 0);
        let result = reducer.whnf(&t, &ReductionConfig::default()).unwrap();
        assert_eq!(result, t);
    }

    #[test]
    fn snf_of_an_open_lambda_body_terminates() {
        let sig = Signature::new();
        let reducer = Reducer::new(&sig);
        let lam = Term::lam(NameHint::new("x"), None, Term::db(NameHint::new("x"), 0));
        let result = reducer.snf(&lam, &ReductionConfig::default()).unwrap();
        assert_eq!(result, lam);
    }

    #[test]
    fn scenario_s1_identity_rule_fires() {
        // declare A : Type, id : A -> A with rule id x --> x; whnf(id a) = a.
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(q("id"), Staticity::Definable, Term::const_(q("A"))).unwrap();
        sig.add_declaration(q("a"), Staticity::Static, Term::const_(q("A"))).unwrap();

        let rule = CompiledRule {
            name: Rc::from("id_x"),
            head: q("id"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        sig.add_rules(&q("id"), std::slice::from_ref(&rule), &AssumeConfluent).unwrap();

        let reducer = Reducer::new(&sig);
        let applied = Term::app1(Term::const_(q("id")), Term::const_(q("a")));
        let result = reducer.whnf(&applied, &ReductionConfig::default()).unwrap();
        assert_eq!(result, Term::const_(q("a")));
    }

    #[test]
    fn beta_disabled_leaves_applied_lambda_unreduced() {
        let sig = Signature::new();
        let reducer = Reducer::new(&sig);
        let lam = Term::lam(NameHint::new("x"), None, Term::db(NameHint::new("x"), 0));
        let applied = Term::app1(lam, Term::const_(q("a")));
        let mut cfg = ReductionConfig::default();
        cfg.beta = false;
        let result = reducer.whnf(&applied, &cfg).unwrap();
        assert_eq!(result, applied);
    }

    #[test]
    fn convertibility_is_reflexive() {
        let sig = Signature::new();
        let reducer = Reducer::new(&sig);
        let t = Term::app1(Term::const_(q("f")), Term::const_(q("a")));
        assert!(reducer.are_convertible(&t, &t, &ReductionConfig::default()).unwrap());
    }

    /// `ByName` suspends an application's arguments unforced, so a
    /// discarded argument's own rewrite rules never fire; `ByValue` reduces
    /// every argument eagerly before it is even pushed, so they fire
    /// whether or not the result is used (spec §4.D "Reduction-config
    /// surface": strategy "controls whether sub-terms are reduced before
    /// pushing on the stack").
    #[test]
    fn by_value_strategy_reduces_discarded_arguments_eagerly() {
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(q("id"), Staticity::Definable, Term::const_(q("A"))).unwrap();
        sig.add_declaration(q("a"), Staticity::Static, Term::const_(q("A"))).unwrap();
        sig.add_declaration(q("b"), Staticity::Static, Term::const_(q("A"))).unwrap();

        let rule = CompiledRule {
            name: Rc::from("id_x"),
            head: q("id"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        sig.add_rules(&q("id"), std::slice::from_ref(&rule), &AssumeConfluent).unwrap();
        let reducer = Reducer::new(&sig);

        // f := \x. \y. x — drops its second argument entirely.
        let f = Term::lam(
            NameHint::new("x"),
            None,
            Term::lam(NameHint::new("y"), None, Term::db(NameHint::new("x"), 1)),
        );
        let id_b = Term::app1(Term::const_(q("id")), Term::const_(q("b")));
        let applied = Term::app(f, vec![Term::const_(q("a")), id_b]);

        let fired: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let logged = fired.clone();
        let logger: EvalLogger = Rc::new(move |kind, name, _t| logged.borrow_mut().push(format!("{kind}:{name}")));

        let mut by_name = ReductionConfig::default();
        by_name.logger = Some(logger.clone());
        let result = reducer.whnf(&applied, &by_name).unwrap();
        assert_eq!(result, Term::const_(q("a")));
        assert!(!fired.borrow().iter().any(|e| e.contains("id_x")), "ByName must not force the discarded argument");

        fired.borrow_mut().clear();
        let mut by_value = ReductionConfig::default();
        by_value.strategy = Strategy::ByValue;
        by_value.logger = Some(logger);
        let result = reducer.whnf(&applied, &by_value).unwrap();
        assert_eq!(result, Term::const_(q("a")));
        assert!(fired.borrow().iter().any(|e| e.contains("id_x")), "ByValue must reduce every argument eagerly");
    }

    /// `ByStrongValue` additionally reduces the domain of a `Pi` (and a
    /// `Lam`'s type annotation) as part of whnf, unlike the other two
    /// strategies.
    #[test]
    fn by_strong_value_reduces_pi_domain() {
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Rc::new(Term::Type)).unwrap();
        sig.add_declaration(
            q("id"),
            Staticity::Definable,
            Term::pi(NameHint::anonymous(), Rc::new(Term::Type), Rc::new(Term::Type)),
        )
        .unwrap();
        let rule = CompiledRule {
            name: Rc::from("id_x"),
            head: q("id"),
            patterns: vec![Pattern::var(NameHint::new("x"), 0, vec![])],
            rhs: Term::db(NameHint::new("x"), 0),
        };
        sig.add_rules(&q("id"), std::slice::from_ref(&rule), &AssumeConfluent).unwrap();
        let reducer = Reducer::new(&sig);

        let domain = Term::app1(Term::const_(q("id")), Term::const_(q("A")));
        let pi = Term::pi(NameHint::anonymous(), domain, Term::const_(q("A")));

        let mut cfg = ReductionConfig::default();
        let unreduced = reducer.whnf(&pi, &cfg).unwrap();
        match &*unreduced {
            Term::Pi(_, dom, _) => assert_ne!(**dom, *Term::const_(q("A"))),
            _ => panic!("expected a Pi"),
        }

        cfg.strategy = Strategy::ByStrongValue;
        let reduced = reducer.whnf(&pi, &cfg).unwrap();
        match &*reduced {
            Term::Pi(_, dom, _) => assert_eq!(**dom, *Term::const_(q("A"))),
            _ => panic!("expected a Pi"),
        }
    }
}
