use lfkernel_term::QName;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error("cannot merge rules for `{first}` and `{second}` into one decision tree: different head symbols")]
    #[diagnostic(code("K-101"))]
    HeadSymbolMismatch { first: QName, second: QName },

    #[error("symbol `{symbol}` occurs at arity {first_arity} in one rule and arity {second_arity} in another, under the same column")]
    #[diagnostic(code("K-102"))]
    ArityInnerMismatch { symbol: QName, first_arity: usize, second_arity: usize },
}
