//! Preprocessor error types. All of these abort the translation unit.

use thiserror::Error;
use xshade_common::SourcePosition;
use xshade_lexer::ScanError;

pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// A fatal preprocessing failure.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("{0}")]
    Scan(#[from] ScanError),

    #[error("malformed '#{directive}' directive")]
    MalformedDirective {
        directive: String,
        pos: SourcePosition,
    },

    #[error("unknown preprocessor directive '#{directive}'")]
    UnknownDirective {
        directive: String,
        pos: SourcePosition,
    },

    #[error("unbalanced '#{directive}' directive")]
    UnbalancedConditional {
        directive: String,
        pos: SourcePosition,
    },

    #[error("missing '#endif' at end of file")]
    MissingEndif { pos: SourcePosition },

    #[error("failed to include '{name}': {message}")]
    MissingInclude {
        name: String,
        message: String,
        pos: SourcePosition,
    },

    #[error("redefinition of function-like macro '{name}' with different arity")]
    MacroRedefinition { name: String, pos: SourcePosition },

    #[error("{message}")]
    UserError {
        message: String,
        pos: SourcePosition,
    },

    #[error("invalid constant expression in conditional directive: {message}")]
    InvalidCondition {
        message: String,
        pos: SourcePosition,
    },

    #[error("include nesting too deep while including '{name}'")]
    IncludeNestingTooDeep { name: String, pos: SourcePosition },
}

impl PreprocessError {
    pub fn pos(&self) -> SourcePosition {
        match self {
            PreprocessError::Scan(err) => err.pos(),
            PreprocessError::MalformedDirective { pos, .. }
            | PreprocessError::UnknownDirective { pos, .. }
            | PreprocessError::UnbalancedConditional { pos, .. }
            | PreprocessError::MissingEndif { pos }
            | PreprocessError::MissingInclude { pos, .. }
            | PreprocessError::MacroRedefinition { pos, .. }
            | PreprocessError::UserError { pos, .. }
            | PreprocessError::InvalidCondition { pos, .. }
            | PreprocessError::IncludeNestingTooDeep { pos, .. } => *pos,
        }
    }
}
