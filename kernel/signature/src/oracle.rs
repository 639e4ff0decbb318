use lfkernel_dtree::DTree;
use lfkernel_term::QName;

/// The external confluence checker (out of scope per the core's purpose
/// statement): `add_rules` calls out to whatever implements this trait
/// after a tree recompiles successfully, and rejects the extension if it
/// reports a conflict.
pub trait ConfluenceOracle {
    fn check_confluence(&self, head: &QName, pivot: usize, tree: &DTree) -> Result<(), String>;
}

/// The oracle used when no external checker is wired up: confluence is
/// assumed. Per spec §9 open question 1, a production embedding should
/// replace this with a real call-out and treat its failure as fatal by
/// default.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeConfluent;

impl ConfluenceOracle for AssumeConfluent {
    fn check_confluence(&self, _head: &QName, _pivot: usize, _tree: &DTree) -> Result<(), String> {
        Ok(())
    }
}
