use std::rc::Rc;

use lfkernel_dtree::CompiledRule;
use lfkernel_reduce::{ReductionConfig, Reducer, Target};
use lfkernel_signature::{AssumeConfluent, ConfluenceOracle, Signature, Staticity};
use lfkernel_term::{Context, QName, Term};
use lfkernel_typeck::{check, check_rule, infer, RawRule, TypeError};

use crate::entry::{CheckKind, Entry, EnvOutput, ModuleId, ModuleLoader};
use crate::error::EnvError;

/// Bundles the façade-level knobs that sit above `ReductionConfig` (spec
/// §5's REDESIGN FLAG: no process globals — every knob here is threaded
/// explicitly by `run`/`run_entry` rather than mutated in place).
#[derive(Clone)]
pub struct EnvironmentConfig {
    /// Used for entries that need *some* reduction behaviour but don't
    /// carry their own (`Decl`'s well-formedness check, `Def`'s body
    /// check, `Check`'s `Convert`/`HasType` queries).
    pub default_reduction: ReductionConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig { default_reduction: ReductionConfig::default() }
    }
}

/// Component H: serialises processing of an entry stream over components
/// A–G (spec §4.H). Holds the one piece of shared mutable state the core
/// has — the append-only `Signature` — plus the confluence oracle and
/// optional module loader every `add_rules`/`Require` call goes through.
pub struct Environment {
    signature: Signature,
    oracle: Box<dyn ConfluenceOracle>,
    loader: Option<Box<dyn ModuleLoader>>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment { signature: Signature::new(), oracle: Box::new(AssumeConfluent), loader: None }
    }

    pub fn with_oracle(oracle: Box<dyn ConfluenceOracle>) -> Self {
        Environment { signature: Signature::new(), oracle, loader: None }
    }

    pub fn set_loader(&mut self, loader: Box<dyn ModuleLoader>) {
        self.loader = Some(loader);
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Runs every entry in order, threading `cfg` through each one. Per
    /// spec §4.H, a `Check` entry with its `assert` flag set never aborts
    /// the stream — its failure is recorded as an `EnvOutput::CheckFailed`
    /// instead of propagating, so a signature file can mix passing entries
    /// with deliberately-failing regression checks.
    pub fn run(&mut self, cfg: &EnvironmentConfig, entries: Vec<Entry>) -> Result<Vec<EnvOutput>, EnvError> {
        entries.into_iter().map(|entry| self.run_entry(cfg, entry)).collect()
    }

    pub fn run_entry(&mut self, cfg: &EnvironmentConfig, entry: Entry) -> Result<EnvOutput, EnvError> {
        match entry {
            Entry::Decl { name, staticity, ty } => self.run_decl(cfg, name, staticity, ty),
            Entry::Def { name, opaque, declared_type, body } => {
                self.run_def(cfg, name, opaque, declared_type, body)
            }
            Entry::Rules(raw_rules) => self.run_rules(cfg, raw_rules),
            Entry::Eval { cfg: reduction_cfg, term } => self.run_eval(&reduction_cfg, term),
            Entry::Infer { cfg: reduction_cfg, term } => self.run_infer(&reduction_cfg, term),
            Entry::Check { assert, negate, kind } => self.run_check(cfg, assert, negate, kind),
            Entry::DTree { module, symbol } => self.run_dtree(module, symbol),
            Entry::Print(s) => Ok(EnvOutput::Printed(s)),
            Entry::Name(module) => Ok(EnvOutput::Named(module)),
            Entry::Require(module_id) => self.run_require(cfg, module_id),
        }
    }

    fn run_decl(
        &mut self,
        cfg: &EnvironmentConfig,
        name: QName,
        staticity: Staticity,
        ty: Rc<Term>,
    ) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let (_, sort) = infer(&self.signature, &reducer, &cfg.default_reduction, &Context::new(), &ty)?;
        if !matches!(&*sort, Term::Type | Term::Kind) {
            return Err(EnvError::Type(TypeError::SortExpected { found: sort }));
        }
        self.signature.add_declaration(name.clone(), staticity, ty)?;
        log::debug!("driver: declared `{}`", name);
        Ok(EnvOutput::Declared(name))
    }

    fn run_def(
        &mut self,
        cfg: &EnvironmentConfig,
        name: QName,
        opaque: bool,
        declared_type: Option<Rc<Term>>,
        body: Rc<Term>,
    ) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let (elaborated_body, ty) = match declared_type {
            Some(declared) => {
                let elaborated = check(&self.signature, &reducer, &cfg.default_reduction, &Context::new(), &body, &declared)?;
                (elaborated, declared)
            }
            None => infer(&self.signature, &reducer, &cfg.default_reduction, &Context::new(), &body)?,
        };
        if matches!(&*ty, Term::Kind) {
            return Err(EnvError::KindLevelDefinition);
        }

        self.signature.add_declaration(name.clone(), Staticity::Definable, ty)?;

        if !opaque {
            let delta = CompiledRule {
                name: Rc::from(format!("delta_{}", name)),
                head: name.clone(),
                patterns: Vec::new(),
                rhs: elaborated_body,
            };
            self.signature.add_rules(&name, &[delta], self.oracle.as_ref())?;
        }

        log::debug!("driver: defined `{}` (opaque: {})", name, opaque);
        Ok(EnvOutput::Defined(name))
    }

    fn run_rules(&mut self, cfg: &EnvironmentConfig, raw_rules: Vec<RawRule>) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let mut grouped: Vec<(QName, Vec<CompiledRule>)> = Vec::new();
        let mut total = 0usize;
        for raw in &raw_rules {
            let compiled = check_rule(&self.signature, &reducer, &cfg.default_reduction, raw)?;
            total += 1;
            match grouped.iter_mut().find(|(head, _)| *head == compiled.head) {
                Some((_, rules)) => rules.push(compiled),
                None => grouped.push((compiled.head.clone(), vec![compiled])),
            }
        }
        for (head, rules) in &grouped {
            self.signature.add_rules(head, rules, self.oracle.as_ref())?;
        }
        Ok(EnvOutput::RulesAdded(total))
    }

    fn run_eval(&self, reduction_cfg: &ReductionConfig, term: Rc<Term>) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let result = match reduction_cfg.target {
            Target::Whnf => reducer.whnf(&term, reduction_cfg)?,
            Target::Snf => reducer.snf(&term, reduction_cfg)?,
        };
        Ok(EnvOutput::Evaluated(result))
    }

    fn run_infer(&self, reduction_cfg: &ReductionConfig, term: Rc<Term>) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let (_, ty) = infer(&self.signature, &reducer, reduction_cfg, &Context::new(), &term)?;
        Ok(EnvOutput::Inferred(ty))
    }

    fn run_check(
        &self,
        cfg: &EnvironmentConfig,
        assert: bool,
        negate: bool,
        kind: CheckKind,
    ) -> Result<EnvOutput, EnvError> {
        let reducer = Reducer::new(&self.signature);
        let (holds, reason) = match kind {
            CheckKind::Convert { lhs, rhs } => {
                let holds = reducer.are_convertible(&lhs, &rhs, &cfg.default_reduction)?;
                (holds, format!("`{}` and `{}` are not convertible", lhs, rhs))
            }
            CheckKind::HasType { term, ty } => {
                match check(&self.signature, &reducer, &cfg.default_reduction, &Context::new(), &term, &ty) {
                    Ok(_) => (true, String::new()),
                    Err(TypeError::ConvertibilityError { .. }) => {
                        (false, format!("`{}` does not have type `{}`", term, ty))
                    }
                    Err(other) => return Err(EnvError::Type(other)),
                }
            }
        };
        let holds = if negate { !holds } else { holds };

        if holds {
            Ok(EnvOutput::CheckPassed)
        } else if assert {
            Ok(EnvOutput::CheckFailed { reason })
        } else {
            Err(EnvError::CheckFailed { reason })
        }
    }

    fn run_dtree(&self, module: Option<Rc<str>>, symbol: Rc<str>) -> Result<EnvOutput, EnvError> {
        let name = QName::new(module.unwrap_or_else(|| Rc::from("")), symbol);
        let pivot = self.signature.get_tree(&name)?.map(|(pivot, _)| pivot);
        Ok(EnvOutput::Tree { pivot })
    }

    fn run_require(&mut self, cfg: &EnvironmentConfig, module_id: ModuleId) -> Result<EnvOutput, EnvError> {
        let entries = match &mut self.loader {
            Some(loader) => loader.load(&module_id)?,
            None => return Err(EnvError::NoModuleLoader(module_id.0.clone())),
        };
        self.run(cfg, entries)?;
        Ok(EnvOutput::Required(module_id))
    }
}
