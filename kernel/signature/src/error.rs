use lfkernel_dtree::CompileError;
use lfkernel_term::QName;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SigError {
    #[error("unknown symbol `{0}`")]
    #[diagnostic(code("K-201"))]
    SymbolNotFound(QName),

    #[error("symbol `{0}` is already declared")]
    #[diagnostic(code("K-202"))]
    AlreadyDefined(QName),

    #[error("`{0}` is static and may not receive rewrite rules")]
    #[diagnostic(code("K-203"))]
    CannotRewriteStaticSymbol(QName),

    #[error("confluence check failed for `{symbol}`: {reason}")]
    #[diagnostic(code("K-204"))]
    ConfluenceCheckFailed { symbol: QName, reason: String },

    #[error("failed to compile the rewrite rules for `{symbol}`")]
    #[diagnostic(code("K-205"))]
    TreeCompile {
        symbol: QName,
        #[source]
        source: CompileError,
    },
}
