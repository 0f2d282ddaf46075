//! GLSL emission: a pretty-printer walking the decorated AST.

mod emitter;
mod keywords;
mod writer;

pub use emitter::*;
pub use keywords::*;
pub use writer::*;
