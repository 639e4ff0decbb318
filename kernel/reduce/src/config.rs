use std::fmt;
use std::rc::Rc;

use lfkernel_term::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Whnf,
    Snf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ByName,
    ByValue,
    ByStrongValue,
}

pub type RuleSelector = Rc<dyn Fn(&str) -> bool>;
pub type EvalLogger = Rc<dyn Fn(&str, &str, &Rc<Term>)>;

/// The reduction configuration surface (spec §4.D "Reduction-config
/// surface"). Threaded explicitly through every reducer entry point —
/// per the REDESIGN FLAG applied to spec §9's "Global flags" note, this
/// replaces what the source keeps as process-wide mutable flags.
#[derive(Clone)]
pub struct ReductionConfig {
    pub selector: Option<RuleSelector>,
    pub beta: bool,
    pub target: Target,
    pub strategy: Strategy,
    pub step_limit: Option<usize>,
    pub logger: Option<EvalLogger>,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            selector: None,
            beta: true,
            target: Target::Whnf,
            strategy: Strategy::ByName,
            step_limit: None,
            logger: None,
        }
    }
}

impl fmt::Debug for ReductionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReductionConfig")
            .field("selector", &self.selector.is_some())
            .field("beta", &self.beta)
            .field("target", &self.target)
            .field("strategy", &self.strategy)
            .field("step_limit", &self.step_limit)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl ReductionConfig {
    pub fn rule_allowed(&self, rule_name: &str) -> bool {
        match &self.selector {
            Some(pred) => pred(rule_name),
            None => true,
        }
    }
}
