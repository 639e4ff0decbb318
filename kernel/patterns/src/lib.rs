//! Pattern type inference (component F): elaborates a raw left-hand side
//! into a typed `Pattern` tree, gathering and solving the equations that
//! pin down each pattern variable's type.

mod error;
mod infer;
mod raw;
mod unify;

pub use error::PatternError;
pub use infer::infer_pattern_type;
pub use raw::{Equation, RawPattern};
pub use unify::{apply_subst, fresh_hole, solve, Substitution};

#[cfg(test)]
mod tests {
    use super::*;
    use lfkernel_reduce::{ReductionConfig, Reducer};
    use lfkernel_signature::{Signature, Staticity};
    use lfkernel_term::{Context, NameHint, QName, Term};

    fn q(name: &str) -> QName {
        QName::new("m", name)
    }

    #[test]
    fn plain_variable_gathers_a_type_equation() {
        // nat : Type, zero : nat, succ : nat -> nat
        // pattern `succ x` against head `succ`, x a fresh Γ-bound variable of
        // unresolved type: elaboration should produce Var(_, 0, []) and
        // refine the LHS type to `nat`.
        let mut sig = Signature::new();
        sig.add_declaration(q("nat"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(
            q("succ"),
            Staticity::Definable,
            Term::pi(NameHint::anonymous(), Term::const_(q("nat")), Term::const_(q("nat"))),
        )
        .unwrap();

        let ctx = Context::new().extend(NameHint::new("x"), fresh_hole(0));
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let (patterns, refined, _subst) =
            infer_pattern_type(&sig, &reducer, &cfg, &ctx, &q("succ"), &[RawPattern::var("x")]).unwrap();

        assert_eq!(patterns.len(), 1);
        assert!(matches!(patterns[0], lfkernel_term::Pattern::Var(_, 0, _)));
        assert_eq!(refined, Term::const_(q("nat")));
    }

    #[test]
    fn pattern_variable_applied_to_a_non_bound_variable_is_rejected() {
        // the Miller restriction only admits applying a pattern variable to
        // bound variables; a joker in argument position isn't one.
        let mut sig = Signature::new();
        sig.add_declaration(q("nat"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(
            q("id"),
            Staticity::Definable,
            Term::pi(NameHint::anonymous(), Term::const_(q("nat")), Term::const_(q("nat"))),
        )
        .unwrap();

        let ctx = Context::new().extend(NameHint::new("f"), fresh_hole(0));
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let raw_args = vec![RawPattern::atom("f", vec![RawPattern::Unknown(0)])];
        let err = infer_pattern_type(&sig, &reducer, &cfg, &ctx, &q("id"), &raw_args).unwrap_err();
        assert!(matches!(err, PatternError::PatternVariableApplication { .. }));
    }

    #[test]
    fn too_many_arguments_reports_product_expected() {
        let mut sig = Signature::new();
        sig.add_declaration(q("nat"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(q("zero"), Staticity::Static, Term::const_(q("nat"))).unwrap();

        let ctx = Context::new();
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let raw_args = vec![RawPattern::Unknown(0)];
        let err = infer_pattern_type(&sig, &reducer, &cfg, &ctx, &q("zero"), &raw_args).unwrap_err();
        assert!(matches!(err, PatternError::ProductExpected { .. }));
    }

    #[test]
    fn applied_pattern_variable_over_a_bound_variable_elaborates() {
        // apply : (A -> B) -> A -> B ; pattern `apply (x => f x) a`: f must
        // elaborate to an applied Miller variable, Var(_, 1, [Var(_, 0, [])]),
        // rather than being rejected as in the non-Miller case.
        let mut sig = Signature::new();
        sig.add_declaration(q("A"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(q("B"), Staticity::Static, Term::const_(q("Type"))).unwrap();
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

        let ctx = Context::new().extend(NameHint::new("f"), fresh_hole(0)).extend(NameHint::new("a"), fresh_hole(1));
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let raw_args = vec![
            RawPattern::Lambda(NameHint::new("x"), Box::new(RawPattern::atom("f", vec![RawPattern::var("x")]))),
            RawPattern::var("a"),
        ];
        let (patterns, refined, _subst) =
            infer_pattern_type(&sig, &reducer, &cfg, &ctx, &q("apply"), &raw_args).unwrap();

        assert_eq!(patterns.len(), 2);
        assert_eq!(refined, Term::const_(q("B")));
        match &patterns[0] {
            lfkernel_term::Pattern::Lambda(_, inner) => match inner.as_ref() {
                lfkernel_term::Pattern::Var(_, 1, applied) => {
                    assert_eq!(applied.len(), 1);
                    assert!(matches!(&applied[0], lfkernel_term::Pattern::Var(_, 0, a) if a.is_empty()));
                }
                other => panic!("expected an applied pattern variable `f`, got {other:?}"),
            },
            other => panic!("expected a lambda pattern, got {other:?}"),
        }
        assert!(matches!(&patterns[1], lfkernel_term::Pattern::Var(_, 0, a) if a.is_empty()));
    }

    #[test]
    fn nested_rigid_constructor_elaborates_and_unifies() {
        // nat : Type, zero : nat, succ : nat -> nat, plus : nat -> nat -> nat
        // pattern `plus (succ x) y` — checks the rigid/variable mix.
        let mut sig = Signature::new();
        sig.add_declaration(q("nat"), Staticity::Static, Term::const_(q("Type"))).unwrap();
        sig.add_declaration(q("zero"), Staticity::Static, Term::const_(q("nat"))).unwrap();
        sig.add_declaration(
            q("succ"),
            Staticity::Definable,
            Term::pi(NameHint::anonymous(), Term::const_(q("nat")), Term::const_(q("nat"))),
        )
        .unwrap();
        sig.add_declaration(
            q("plus"),
            Staticity::Definable,
            Term::pi(
                NameHint::anonymous(),
                Term::const_(q("nat")),
                Term::pi(NameHint::anonymous(), Term::const_(q("nat")), Term::const_(q("nat"))),
            ),
        )
        .unwrap();

        let ctx = Context::new()
            .extend(NameHint::new("x"), fresh_hole(0))
            .extend(NameHint::new("y"), fresh_hole(1));
        let reducer = Reducer::new(&sig);
        let cfg = ReductionConfig::default();

        let raw_args = vec![RawPattern::atom("m.succ", vec![RawPattern::var("x")]), RawPattern::var("y")];
        let (patterns, refined, _subst) =
            infer_pattern_type(&sig, &reducer, &cfg, &ctx, &q("plus"), &raw_args).unwrap();

        assert_eq!(patterns.len(), 2);
        assert!(matches!(&patterns[0], lfkernel_term::Pattern::Pattern(name, args) if *name == q("succ") && args.len() == 1));
        assert_eq!(refined, Term::const_(q("nat")));
    }
}
