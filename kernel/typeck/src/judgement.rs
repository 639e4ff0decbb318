use std::rc::Rc;

use lfkernel_reduce::{ReductionConfig, Reducer};
use lfkernel_signature::Signature;
use lfkernel_term::{subst, Context, Term};

use crate::error::TypeError;

/// Bidirectional inference (spec §4.G "infer"). Returns the elaborated
/// term alongside its inferred type; the elaborated term is returned
/// rather than discarded because `App` nodes get their argument
/// re-elaborated by `infer_app`, matching the teacher's `Infer` trait
/// convention of returning a (possibly rewritten) `Target` alongside
/// whatever auxiliary information the judgement needs.
pub fn infer(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    t: &Rc<Term>,
) -> Result<(Rc<Term>, Rc<Term>), TypeError> {
    match &**t {
        Term::Type => Ok((t.clone(), Rc::new(Term::Kind))),

        Term::Kind => Err(TypeError::KindIsNotTypable),

        Term::DB(_, n) => {
            let ty = ctx.type_at(*n).ok_or(TypeError::VariableNotFound(*n))?;
            Ok((t.clone(), ty))
        }

        Term::Const(name) => {
            let ty = sig.get_type(name)?;
            Ok((t.clone(), ty))
        }

        Term::App(head, args) => {
            let (mut elaborated, mut ty) = infer(sig, reducer, cfg, ctx, head)?;
            for arg in args {
                let (new_head, new_ty) = infer_app(sig, reducer, cfg, ctx, (elaborated, ty), arg)?;
                elaborated = new_head;
                ty = new_ty;
            }
            Ok((elaborated, ty))
        }

        Term::Pi(hint, domain, codomain) => {
            check(sig, reducer, cfg, ctx, domain, &Rc::new(Term::Type))?;
            let inner_ctx = ctx.extend(hint.clone(), domain.clone());
            let (codomain, codomain_ty) = infer(sig, reducer, cfg, &inner_ctx, codomain)?;
            match &*codomain_ty {
                Term::Type | Term::Kind => {
                    Ok((Term::pi(hint.clone(), domain.clone(), codomain), codomain_ty))
                }
                _ => Err(TypeError::SortExpected { found: codomain_ty }),
            }
        }

        Term::Lam(hint, Some(domain), body) => {
            check(sig, reducer, cfg, ctx, domain, &Rc::new(Term::Type))?;
            let inner_ctx = ctx.extend(hint.clone(), domain.clone());
            let (body, body_ty) = infer(sig, reducer, cfg, &inner_ctx, body)?;
            if matches!(&*body_ty, Term::Kind) {
                return Err(TypeError::InexpectedKind);
            }
            let lam = Term::lam(hint.clone(), Some(domain.clone()), body);
            let pi = Term::pi(hint.clone(), domain.clone(), body_ty);
            Ok((lam, pi))
        }

        Term::Lam(_, None, _) => Err(TypeError::DomainFreeLambda),
    }
}

/// `infer_app` (spec §4.G): `τ_f` is whnf-forced, and the argument is
/// checked against the domain it exposes.
fn infer_app(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    f: (Rc<Term>, Rc<Term>),
    u: &Rc<Term>,
) -> Result<(Rc<Term>, Rc<Term>), TypeError> {
    let (f_term, f_ty) = f;
    let forced = reducer.whnf(&f_ty, cfg)?;
    match &*forced {
        Term::Pi(_, domain, codomain) => {
            let (u_term, u_ty) = infer(sig, reducer, cfg, ctx, u)?;
            if !reducer.are_convertible(domain, &u_ty, cfg)? {
                return Err(TypeError::ConvertibilityError {
                    term: u.clone(),
                    expected: domain.clone(),
                    inferred: u_ty,
                });
            }
            let applied = Term::app1(f_term, u_term.clone());
            let result_ty = subst(codomain, &u_term);
            Ok((applied, result_ty))
        }
        _ => Err(TypeError::ProductExpected { found: forced }),
    }
}

/// Bidirectional checking (spec §4.G "check"): infers, then requires
/// convertibility with the expected type.
pub fn check(
    sig: &Signature,
    reducer: &Reducer,
    cfg: &ReductionConfig,
    ctx: &Context,
    t: &Rc<Term>,
    expected: &Rc<Term>,
) -> Result<Rc<Term>, TypeError> {
    let (elaborated, inferred) = infer(sig, reducer, cfg, ctx, t)?;
    if !reducer.are_convertible(expected, &inferred, cfg)? {
        return Err(TypeError::ConvertibilityError {
            term: t.clone(),
            expected: expected.clone(),
            inferred,
        });
    }
    Ok(elaborated)
}
