use std::cell::RefCell;
use std::rc::Rc;

use lfkernel_term::{psubst_l, Term};

/// A memoising environment cell (spec §5 "the only deferred work is term
/// closures in the environment"; §9 "Thunks & sharing"). Forcing mutates
/// the cell in place so repeated forces of a shared cell do the
/// substitution work only once — critical for call-by-need rewriting.
pub enum Thunk {
    Sus(State),
    Res(Rc<Term>),
}

pub type ThunkCell = Rc<RefCell<Thunk>>;
pub type Env = Vec<ThunkCell>;

pub fn suspend(env: Env, term: Rc<Term>) -> ThunkCell {
    Rc::new(RefCell::new(Thunk::Sus(State { env, term, stack: Vec::new() })))
}

pub fn suspend_state(state: State) -> ThunkCell {
    Rc::new(RefCell::new(Thunk::Sus(state)))
}

pub fn value(term: Rc<Term>) -> ThunkCell {
    Rc::new(RefCell::new(Thunk::Res(term)))
}

/// A reducer state: `env` supplies the lazy values bound to `term`'s
/// outermost De Bruijn indices, `stack` holds pending arguments, each
/// itself a suspended reduction (spec §3 "Reducer state").
#[derive(Clone)]
pub struct State {
    pub env: Env,
    pub term: Rc<Term>,
    pub stack: Vec<ThunkCell>,
}

impl State {
    pub fn root(term: Rc<Term>) -> State {
        State { env: Vec::new(), term, stack: Vec::new() }
    }
}

/// Forces a cell: memoised, so a second call against the same `Rc`
/// returns the cached term without recomputing it.
pub fn force(cell: &ThunkCell) -> Rc<Term> {
    let cached = match &*cell.borrow() {
        Thunk::Res(t) => Some(t.clone()),
        Thunk::Sus(_) => None,
    };
    if let Some(t) = cached {
        return t;
    }
    let forced = {
        let guard = cell.borrow();
        match &*guard {
            Thunk::Res(t) => t.clone(),
            Thunk::Sus(state) => term_of_state(state),
        }
    };
    *cell.borrow_mut() = Thunk::Res(forced.clone());
    forced
}

/// Reads back a state into a plain term by parallel-substituting `env`
/// into `term` and re-applying every stack element (spec §3
/// "term_of_state"). This performs no reduction of its own — it only
/// closes over already-suspended work.
pub fn term_of_state(state: &State) -> Rc<Term> {
    let env_terms: Vec<Rc<Term>> = state.env.iter().map(force).collect();
    let substituted = psubst_l(&env_terms, &state.term);
    let args: Vec<Rc<Term>> = state.stack.iter().map(force).collect();
    Term::app(substituted, args)
}
