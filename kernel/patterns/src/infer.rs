use std::collections::BTreeSet;
use std::rc::Rc;

use lfkernel_reduce::{ReductionConfig, Reducer};
use lfkernel_signature::Signature;
use lfkernel_term::{subst, Context, NameHint, Pattern, QName, Term};

use crate::error::PatternError;
use crate::raw::{Equation, RawPattern};
use crate::unify::{self, Substitution};

/// Component F entry point: elaborates `head(args…)` against Γ, returning
/// the elaborated sub-patterns, the LHS's own inferred (and
/// constraint-refined) type, and the solved substitution (callers that
/// also elaborated sibling rule components may want to apply it to them).
pub fn infer_pattern_type(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    head: &QName,
    args: &[RawPattern],
) -> Result<(Vec<Pattern>, Rc<Term>, Substitution), PatternError> {
    let head_ty = sig
        .get_type(head)
        .map_err(|_| PatternError::UnboundVariable { name: head.to_string().into() })?;
    let (patterns, lhs_type, equations) = fold_args(sig, reducer, cfg, ctx, &[], head_ty, args)?;
    let solution = unify::solve(equations)?;
    let refined = unify::apply_subst(&solution, &lhs_type);
    Ok((patterns, refined, solution))
}

/// Folds `check_pattern` over `args`, threading the expected type through
/// successive `Pi` codomains (spec §4.F, first paragraph). `locals` holds
/// the domain types of the pattern-lambda binders currently open around
/// `ctx`'s tail (outer to inner) — it's how a nested `RawPattern::Lambda`
/// tells a pattern-variable occurrence underneath it apart from Γ itself,
/// so an applied Miller pattern variable's own type (which lives in Γ, not
/// under those binders) can be reconstructed as a `Pi` telescope over it.
fn fold_args(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    locals: &[Rc<Term>],
    head_ty: Rc<Term>,
    args: &[RawPattern],
) -> Result<(Vec<Pattern>, Rc<Term>, Vec<Equation>), PatternError> {
    let mut expected = head_ty;
    let mut patterns = Vec::with_capacity(args.len());
    let mut equations = Vec::new();
    let mut next_wild = 0usize;
    for raw in args {
        let forced = reducer
            .whnf(&expected, cfg)
            .map_err(|_| PatternError::ProductExpected { found: expected.clone() })?;
        let (domain, codomain) = match &*forced {
            Term::Pi(_, domain, codomain) => (domain.clone(), codomain.clone()),
            _ => return Err(PatternError::ProductExpected { found: forced }),
        };
        let (elaborated, mut eqs) = check_pattern(sig, reducer, cfg, ctx, locals, &domain, raw)?;
        equations.append(&mut eqs);
        let arg_term = pattern_placeholder(&elaborated, &mut next_wild);
        expected = subst(&codomain, &arg_term);
        patterns.push(elaborated);
    }
    Ok((patterns, expected, equations))
}

fn check_pattern(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    locals: &[Rc<Term>],
    expected: &Rc<Term>,
    raw: &RawPattern,
) -> Result<(Pattern, Vec<Equation>), PatternError> {
    match raw {
        RawPattern::Unknown(n) => Ok((Pattern::Joker(*n), Vec::new())),

        RawPattern::Brackets(term) => Ok((Pattern::Brackets(term.clone()), Vec::new())),

        RawPattern::Lambda(hint, body) => {
            let forced = reducer
                .whnf(expected, cfg)
                .map_err(|_| PatternError::ProductExpected { found: expected.clone() })?;
            let (domain, codomain) = match &*forced {
                Term::Pi(_, domain, codomain) => (domain.clone(), codomain.clone()),
                _ => return Err(PatternError::ProductExpected { found: forced }),
            };
            let inner_ctx = ctx.extend(hint.clone(), domain.clone());
            let mut inner_locals = Vec::with_capacity(locals.len() + 1);
            inner_locals.extend_from_slice(locals);
            inner_locals.push(domain);
            let (inner, eqs) = check_pattern(sig, reducer, cfg, &inner_ctx, &inner_locals, &codomain, body)?;
            Ok((Pattern::Lambda(hint.clone(), Box::new(inner)), eqs))
        }

        RawPattern::Atom(name, raw_args) => check_atom(sig, reducer, cfg, ctx, locals, expected, name, raw_args),
    }
}

fn check_atom(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    locals: &[Rc<Term>],
    expected: &Rc<Term>,
    name: &Rc<str>,
    raw_args: &[RawPattern],
) -> Result<(Pattern, Vec<Equation>), PatternError> {
    let local_count = locals.len();
    match resolve(ctx, name) {
        Some(index) if raw_args.is_empty() => {
            if index < local_count {
                // A bare reference to a binder introduced by an enclosing
                // pattern lambda: not a pattern variable, and this crate
                // does not elaborate rigid bound-variable LHS positions.
                return Err(PatternError::AVariableIsNotAPattern);
            }
            let gamma_index = index - local_count;
            let declared = ctx.type_at(index).expect("resolve only returns in-bounds indices");
            let equations = vec![Equation::new(expected.clone(), declared)];
            Ok((Pattern::var(NameHint::new(name.clone()), gamma_index, Vec::new()), equations))
        }
        Some(index) => {
            if index < local_count {
                return Err(PatternError::AVariableIsNotAPattern);
            }
            check_miller_application(ctx, locals, expected, name, index - local_count, raw_args)
        }
        None => {
            let qname = parse_qualified(name).ok_or_else(|| PatternError::UnboundVariable { name: name.clone() })?;
            let ctor_ty = sig
                .get_type(&qname)
                .map_err(|_| PatternError::UnboundVariable { name: name.clone() })?;
            let (sub_patterns, produced_ty, mut equations) =
                fold_args(sig, reducer, cfg, ctx, locals, ctor_ty, raw_args)?;
            equations.push(Equation::new(expected.clone(), produced_ty));
            Ok((Pattern::constructor(qname, sub_patterns), equations))
        }
    }
}

/// Elaborates a higher-order pattern variable applied to arguments (spec
/// §3 "Var(name-hint, index, applied-args) — applied to a list of distinct
/// bound variables, the Miller restriction"). Each argument must itself be
/// a bare reference to one of the pattern-lambda binders currently open
/// (`locals`), used pairwise-distinctly and in the same outer-to-inner
/// order they were bound in — the common, soundly-typeable shape (e.g.
/// `x => y => F x y`). Anything else falls back to
/// `PatternVariableApplication`, the same rejection this crate always gave
/// applied pattern variables before Miller support existed.
fn check_miller_application(
    ctx: &Context,
    locals: &[Rc<Term>],
    expected: &Rc<Term>,
    name: &Rc<str>,
    gamma_index: usize,
    raw_args: &[RawPattern],
) -> Result<(Pattern, Vec<Equation>), PatternError> {
    let local_count = locals.len();
    let mut written: Vec<usize> = Vec::with_capacity(raw_args.len());
    for raw_arg in raw_args {
        let arg_name = match raw_arg {
            RawPattern::Atom(arg_name, inner) if inner.is_empty() => arg_name,
            _ => return Err(PatternError::PatternVariableApplication { name: name.clone() }),
        };
        match resolve(ctx, arg_name) {
            Some(local_idx) if local_idx < local_count => written.push(local_idx),
            _ => return Err(PatternError::PatternVariableApplication { name: name.clone() }),
        }
    }

    let mut seen = BTreeSet::new();
    for &idx in &written {
        if !seen.insert(idx) {
            return Err(PatternError::DistinctBoundVariablesExpected);
        }
    }

    let expected_order: Vec<usize> = (0..local_count).rev().collect();
    if written != expected_order {
        return Err(PatternError::DistinctBoundVariablesExpected);
    }

    let mut candidate = expected.clone();
    for domain in locals.iter().rev() {
        candidate = Term::pi(NameHint::anonymous(), domain.clone(), candidate);
    }

    let full_index = gamma_index + local_count;
    let declared = ctx.type_at(full_index).expect("resolve only returns in-bounds indices");
    let equations = vec![Equation::new(declared, candidate)];

    let applied_patterns: Vec<Pattern> =
        written.iter().map(|&local_idx| Pattern::var(NameHint::anonymous(), local_idx, Vec::new())).collect();
    Ok((Pattern::var(NameHint::new(name.clone()), gamma_index, applied_patterns), equations))
}

/// Looks `name` up among Γ's bound pattern variables by spelling (the
/// name hint is ignored by `NameHint`'s own `Eq`, so this compares the
/// carried string directly rather than going through `PartialEq`).
fn resolve(ctx: &Context, name: &str) -> Option<usize> {
    (0..ctx.len()).find(|&i| ctx.name_at(i).is_some_and(|hint| hint.0.as_ref() == name))
}

/// A bare `module.name` splitter standing in for real name resolution,
/// which belongs to the out-of-scope parser/elaborator front-end; this
/// crate only needs *some* way to turn a spelling that isn't bound in Γ
/// into a `QName` to look up in the signature.
fn parse_qualified(name: &str) -> Option<QName> {
    let (module, local) = name.split_once('.')?;
    Some(QName::new(module, local))
}

/// A symbolic placeholder term standing in for a just-elaborated
/// sub-pattern, used only to instantiate a `Pi`'s codomain (spec §4.F:
/// "the next `expected` is `B[arg]`"). Distinct from `unify`'s hole
/// module so it can never be accidentally solved by the unifier.
fn pattern_placeholder(pattern: &Pattern, next_wild: &mut usize) -> Rc<Term> {
    match pattern {
        Pattern::Var(hint, index, applied) => {
            let args: Vec<Rc<Term>> = applied.iter().map(|a| pattern_placeholder(a, next_wild)).collect();
            Term::app(Term::db(hint.clone(), *index), args)
        }
        Pattern::Pattern(name, sub_patterns) => {
            let args: Vec<Rc<Term>> = sub_patterns.iter().map(|a| pattern_placeholder(a, next_wild)).collect();
            Term::app(Term::const_(name.clone()), args)
        }
        Pattern::Lambda(hint, body) => {
            let body = pattern_placeholder(body, next_wild);
            Term::lam(hint.clone(), None, body)
        }
        Pattern::Brackets(term) => term.clone(),
        Pattern::Joker(_) => {
            let n = *next_wild;
            *next_wild += 1;
            Term::const_(QName::new("$wild", n.to_string()))
        }
    }
}
