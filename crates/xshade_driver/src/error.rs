//! Driver error types.

use thiserror::Error;

/// Errors surfaced to API users who want a `Result` instead of the
/// boolean success flag.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preprocessing input code failed")]
    Preprocess,

    #[error("parsing input code failed")]
    Parse,

    #[error("analyzing input code failed")]
    Analysis,

    #[error("generating output code failed")]
    Generate,
}

pub type CompileResult<T> = Result<T, CompileError>;
