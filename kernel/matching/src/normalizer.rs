use std::rc::Rc;

use lfkernel_term::Term;

use crate::error::MatchError;

/// Injected reduction strategy: `kernel/matching` cannot depend on
/// `kernel/reduce` (that crate depends back on matching for Miller
/// sub-problems, spec §4.D), so it declares this seam itself and the
/// caller — `kernel/reduce::Reducer` — implements it.
pub trait Normalizer {
    fn whnf(&self, t: Rc<Term>) -> Result<Rc<Term>, MatchError>;
}
