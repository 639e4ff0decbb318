use std::rc::Rc;

use lfkernel_dtree::{CaseShape, DTree, Guard, MatchProblem};
use lfkernel_matching::{self as matching, MatchError};
use lfkernel_signature::Signature;
use lfkernel_term::{psubst_l, unshift, Term};

use crate::config::{ReductionConfig, Strategy};
use crate::error::ReduceError;
use crate::thunk::{force, suspend, term_of_state, value, Env, State, ThunkCell};

/// The abstract-machine reducer (component D). Holds a borrow of the
/// signature it consults for compiled rewrite trees; never mutates it.
pub struct Reducer<'sig> {
    signature: &'sig Signature,
}

impl<'sig> Reducer<'sig> {
    pub fn new(signature: &'sig Signature) -> Self {
        Reducer { signature }
    }

    pub fn whnf(&self, t: &Rc<Term>, cfg: &ReductionConfig) -> Result<Rc<Term>, ReduceError> {
        let state = self.state_whnf(State::root(t.clone()), cfg, &mut cfg.step_limit.clone())?;
        let result = term_of_state(&state);
        self.reduce_strategy_annotations(&result, cfg)
    }

    /// Strategy `ByStrongValue` additionally reduces the type annotation on
    /// a `Lam` and the domain of a `Pi` (spec §4.D "Reduction-config
    /// surface": "whether type annotations on λ and domains of Π are
    /// reduced"). `ByName`/`ByValue` leave them untouched.
    fn reduce_strategy_annotations(&self, t: &Rc<Term>, cfg: &ReductionConfig) -> Result<Rc<Term>, ReduceError> {
        if !matches!(cfg.strategy, Strategy::ByStrongValue) {
            return Ok(t.clone());
        }
        match &**t {
            Term::Lam(hint, Some(domain), body) => {
                let domain = self.whnf(domain, cfg)?;
                Ok(Term::lam(hint.clone(), Some(domain), body.clone()))
            }
            Term::Pi(hint, domain, codomain) => {
                let domain = self.whnf(domain, cfg)?;
                Ok(Term::pi(hint.clone(), domain, codomain.clone()))
            }
            _ => Ok(t.clone()),
        }
    }

    /// Strong normal form: whnf, then recurse into every sub-term (spec
    /// §4.D "snf").
    pub fn snf(&self, t: &Rc<Term>, cfg: &ReductionConfig) -> Result<Rc<Term>, ReduceError> {
        let head = self.whnf(t, cfg)?;
        match &*head {
            Term::App(f, args) => {
                let f = self.snf(f, cfg)?;
                let args = args.iter().map(|a| self.snf(a, cfg)).collect::<Result<Vec<_>, _>>()?;
                Ok(Term::app(f, args))
            }
            Term::Lam(hint, dom, body) => {
                let dom = dom.as_ref().map(|d| self.snf(d, cfg)).transpose()?;
                let body = self.snf(body, cfg)?;
                Ok(Term::lam(hint.clone(), dom, body))
            }
            Term::Pi(hint, dom, cod) => {
                let dom = self.snf(dom, cfg)?;
                let cod = self.snf(cod, cfg)?;
                Ok(Term::pi(hint.clone(), dom, cod))
            }
            _ => Ok(head),
        }
    }

    /// Head normal form: whnf, then recurse only into `App`'s arguments
    /// (spec §4.D "hnf").
    pub fn hnf(&self, t: &Rc<Term>, cfg: &ReductionConfig) -> Result<Rc<Term>, ReduceError> {
        let head = self.whnf(t, cfg)?;
        match &*head {
            Term::App(f, args) => {
                let args = args.iter().map(|a| self.hnf(a, cfg)).collect::<Result<Vec<_>, _>>()?;
                Ok(Term::app(f.clone(), args))
            }
            _ => Ok(head),
        }
    }

    /// A bounded variant of `whnf` that performs at most `n` β+γ
    /// firings, returning whatever state it reached (spec §4.D
    /// "nsteps" and §5's "partial normal form").
    pub fn nsteps(&self, n: usize, t: &Rc<Term>, cfg: &ReductionConfig) -> Result<Rc<Term>, ReduceError> {
        let mut budget = Some(n);
        let state = self.state_whnf(State::root(t.clone()), cfg, &mut budget)?;
        Ok(term_of_state(&state))
    }

    /// Worklist convertibility check (spec §4.D "are_convertible").
    pub fn are_convertible(&self, a: &Rc<Term>, b: &Rc<Term>, cfg: &ReductionConfig) -> Result<bool, ReduceError> {
        let mut worklist = vec![(a.clone(), b.clone())];
        while let Some((t1, t2)) = worklist.pop() {
            if t1 == t2 {
                continue;
            }
            let t1 = self.whnf(&t1, cfg)?;
            let t2 = self.whnf(&t2, cfg)?;
            match (&*t1, &*t2) {
                (Term::Type, Term::Type) | (Term::Kind, Term::Kind) => {}
                (Term::Const(a), Term::Const(b)) if a == b => {}
                (Term::DB(_, i), Term::DB(_, j)) if i == j => {}
                (Term::App(f, xs), Term::App(g, ys)) if xs.len() == ys.len() => {
                    worklist.push((f.clone(), g.clone()));
                    for (x, y) in xs.iter().zip(ys.iter()) {
                        worklist.push((x.clone(), y.clone()));
                    }
                }
                (Term::Lam(_, _, b1), Term::Lam(_, _, b2)) => {
                    worklist.push((b1.clone(), b2.clone()));
                }
                (Term::Pi(_, a1, b1), Term::Pi(_, a2, b2)) => {
                    worklist.push((a1.clone(), a2.clone()));
                    worklist.push((b1.clone(), b2.clone()));
                }
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// The six machine rules of spec §4.D, run to a fixed point (whnf).
    fn state_whnf(
        &self,
        mut state: State,
        cfg: &ReductionConfig,
        budget: &mut Option<usize>,
    ) -> Result<State, ReduceError> {
        loop {
            if let Some(0) = budget {
                return Ok(state);
            }
            match &*state.term.clone() {
                Term::Type | Term::Kind | Term::Pi(_, _, _) => return Ok(state),
                Term::Lam(_, _, _) if state.stack.is_empty() => return Ok(state),
                Term::Lam(_, _, body) => {
                    if !cfg.beta {
                        return Ok(state);
                    }
                    if let Some(log) = &cfg.logger {
                        log("beta", "<beta>", body);
                    }
                    let mut stack = state.stack;
                    let arg = stack.remove(0);
                    let mut env: Env = Vec::with_capacity(state.env.len() + 1);
                    env.push(arg);
                    env.extend(state.env);
                    state = State { env, term: body.clone(), stack };
                    consume_budget(budget);
                }
                Term::DB(hint, n) => {
                    if *n < state.env.len() {
                        let forced = force(&state.env[*n]);
                        state = State { env: Vec::new(), term: forced, stack: state.stack };
                    } else {
                        // Free above the environment: already weak-head
                        // normal (spec §4.D rule 3) — looping here would
                        // recompute the identical state forever, since
                        // `env` is now empty and the term is still a `DB`.
                        let free = n - state.env.len();
                        return Ok(State {
                            env: Vec::new(),
                            term: Term::db(hint.clone(), free),
                            stack: state.stack,
                        });
                    }
                }
                Term::Const(name) => {
                    let tree = self.signature.get_tree(name).ok().flatten();
                    match tree {
                        Some((pivot, tree)) if state.stack.len() >= pivot => {
                            let (s1, s2) = state.stack.split_at(pivot);
                            match self.gamma_rewrite(s1, tree, cfg)? {
                                Some((rhs_env, rhs_term)) => {
                                    state = State { env: rhs_env, term: rhs_term, stack: s2.to_vec() };
                                    consume_budget(budget);
                                }
                                None => return Ok(state),
                            }
                        }
                        _ => return Ok(state),
                    }
                }
                Term::App(head, args) => {
                    let mut new_stack: Vec<ThunkCell> = args
                        .iter()
                        .map(|a| self.prepare_arg(&state.env, a, cfg, budget))
                        .collect::<Result<Vec<_>, _>>()?;
                    new_stack.extend(state.stack);
                    state = State { env: state.env, term: head.clone(), stack: new_stack };
                }
            }
        }
    }

    /// Prepares an application argument for the stack per `cfg.strategy`
    /// (spec §4.D "Reduction-config surface": "controls whether sub-terms
    /// are reduced before pushing on the stack"). `ByName` suspends the
    /// argument unevaluated, matching the six machine rules as written;
    /// `ByValue` reduces it to whnf first; `ByStrongValue` reduces it all
    /// the way to snf. Both eager modes still hand back a memoising cell
    /// so a shared argument is evaluated at most once either way.
    fn prepare_arg(
        &self,
        env: &Env,
        term: &Rc<Term>,
        cfg: &ReductionConfig,
        budget: &mut Option<usize>,
    ) -> Result<ThunkCell, ReduceError> {
        match cfg.strategy {
            Strategy::ByName => Ok(suspend(env.clone(), term.clone())),
            Strategy::ByValue => {
                let state = self.state_whnf(State { env: env.clone(), term: term.clone(), stack: Vec::new() }, cfg, budget)?;
                Ok(value(term_of_state(&state)))
            }
            Strategy::ByStrongValue => {
                let state = self.state_whnf(State { env: env.clone(), term: term.clone(), stack: Vec::new() }, cfg, budget)?;
                let whnf_term = term_of_state(&state);
                Ok(value(self.snf(&whnf_term, cfg)?))
            }
        }
    }

    /// Walks a compiled decision tree against the first `pivot` stack
    /// elements, returning the matched rule's context environment and
    /// right-hand side, or `None` if no rule fires (spec §4.D
    /// "gamma_rewrite").
    fn gamma_rewrite(
        &self,
        stack_segment: &[ThunkCell],
        tree: &DTree,
        cfg: &ReductionConfig,
    ) -> Result<Option<(Env, Rc<Term>)>, ReduceError> {
        let mut work: Vec<ThunkCell> = stack_segment.to_vec();
        self.walk(&mut work, tree, cfg)
    }

    fn walk(
        &self,
        work: &mut Vec<ThunkCell>,
        tree: &DTree,
        cfg: &ReductionConfig,
    ) -> Result<Option<(Env, Rc<Term>)>, ReduceError> {
        match tree {
            DTree::Switch { column, cases, default } => {
                let scrutinee = self.whnf(&force(&work[*column]), cfg)?;
                if let Some(shape) = case_shape_of(&scrutinee) {
                    if let Some((_, subtree)) = cases.iter().find(|(s, _)| *s == shape) {
                        let mut branch_work = work.clone();
                        push_destructured(&mut branch_work, &scrutinee);
                        if let Some(hit) = self.walk(&mut branch_work, subtree, cfg)? {
                            return Ok(Some(hit));
                        }
                    }
                }
                match default {
                    Some(d) => self.walk(work, d, cfg),
                    None => Ok(None),
                }
            }
            DTree::Test { rule_name, problem, guards, rhs, default } => {
                if !cfg.rule_allowed(rule_name) {
                    return self.fall_through(work, default, cfg);
                }
                let context = match self.build_context(work, problem, cfg)? {
                    Some(ctx) => ctx,
                    None => return self.fall_through(work, default, cfg),
                };
                match self.check_guards(work, &context, guards, cfg)? {
                    true => {
                        if let Some(log) = &cfg.logger {
                            log("gamma", rule_name, rhs);
                        }
                        let env: Env = context.into_iter().map(value).collect();
                        Ok(Some((env, rhs.clone())))
                    }
                    false => self.fall_through(work, default, cfg),
                }
            }
        }
    }

    fn fall_through(
        &self,
        work: &mut Vec<ThunkCell>,
        default: &Option<Rc<DTree>>,
        cfg: &ReductionConfig,
    ) -> Result<Option<(Env, Rc<Term>)>, ReduceError> {
        match default {
            Some(d) => self.walk(work, d, cfg),
            None => Ok(None),
        }
    }

    fn build_context(
        &self,
        work: &[ThunkCell],
        problem: &MatchProblem,
        cfg: &ReductionConfig,
    ) -> Result<Option<Vec<Rc<Term>>>, ReduceError> {
        match problem {
            MatchProblem::Syntactic(positions) => {
                let mut ctx = Vec::with_capacity(positions.len());
                for pos in positions {
                    let raw = force(&work[pos.column]);
                    let resolved = match unshift(pos.depth, &raw) {
                        Ok(v) => v,
                        Err(_) => {
                            let normalized = self.whnf(&raw, cfg)?;
                            match unshift(pos.depth, &normalized) {
                                Ok(v) => v,
                                Err(_) => return Ok(None),
                            }
                        }
                    };
                    ctx.push(resolved);
                }
                Ok(Some(ctx))
            }
            MatchProblem::MillerPattern(problems) => {
                let mut ctx = Vec::with_capacity(problems.len());
                for p in problems {
                    let raw = force(&work[p.column]);
                    match matching::solve(p.depth, &p.bound_vars, &raw, self) {
                        Ok(v) => ctx.push(v),
                        Err(MatchError::NotUnifiable) => return Ok(None),
                    }
                }
                Ok(Some(ctx))
            }
        }
    }

    /// `context` is the rule's just-built pattern-variable bindings
    /// (`build_context`'s result, indexed exactly like the `rhs_env` the
    /// caller substitutes into the right-hand side). A `Bracket` guard's
    /// term is written in that same de Bruijn convention (spec §4.D
    /// "Guards": "a closed-wrt-context expected value"), so it must be
    /// closed against `context` — not compared as a raw open term — before
    /// `are_convertible` can mean anything.
    fn check_guards(
        &self,
        work: &[ThunkCell],
        context: &[Rc<Term>],
        guards: &[Guard],
        cfg: &ReductionConfig,
    ) -> Result<bool, ReduceError> {
        for guard in guards {
            match guard {
                Guard::Linearity(i, j) => {
                    let a = force(&work[*i]);
                    let b = force(&work[*j]);
                    if !self.are_convertible(&a, &b, cfg)? {
                        return Ok(false);
                    }
                }
                Guard::Bracket(i, expected) => {
                    let found = force(&work[*i]);
                    let expected = psubst_l(context, expected);
                    if !self.are_convertible(&found, &expected, cfg)? {
                        return Err(ReduceError::GuardNotSatisfied { found, expected });
                    }
                }
            }
        }
        Ok(true)
    }
}

impl<'sig> matching::Normalizer for Reducer<'sig> {
    fn whnf(&self, t: Rc<Term>) -> Result<Rc<Term>, MatchError> {
        Reducer::whnf(self, &t, &ReductionConfig::default()).map_err(|_| MatchError::NotUnifiable)
    }
}

fn consume_budget(budget: &mut Option<usize>) {
    if let Some(n) = budget {
        *n -= 1;
    }
}

fn case_shape_of(t: &Rc<Term>) -> Option<CaseShape> {
    match &**t {
        Term::Const(name) => Some(CaseShape::Const(name.clone(), 0)),
        Term::DB(_, idx) => Some(CaseShape::Db(*idx, 0)),
        Term::Lam(_, _, _) => Some(CaseShape::Lambda),
        Term::App(head, args) => match &**head {
            Term::Const(name) => Some(CaseShape::Const(name.clone(), args.len())),
            Term::DB(_, idx) => Some(CaseShape::Db(*idx, args.len())),
            _ => None,
        },
        _ => None,
    }
}

fn push_destructured(work: &mut Vec<ThunkCell>, scrutinee: &Rc<Term>) {
    match &**scrutinee {
        Term::App(_, args) => {
            for a in args {
                work.push(value(a.clone()));
            }
        }
        Term::Lam(_, _, body) => {
            work.push(value(body.clone()));
        }
        _ => {}
    }
}
