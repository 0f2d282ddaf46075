//! The HLSL preprocessor.
//!
//! Wraps the scanner and evaluates directives, producing text a
//! hand-preprocessed source would scan to, plus `#line` markers around
//! included files so diagnostics keep pointing at their origin. Lines
//! consumed by directives or disabled conditional scopes are replaced by
//! blank lines, keeping logical rows aligned with the input.

mod condition;
mod error;
mod preprocessor;

pub use error::*;
pub use preprocessor::*;
