//! D3D-compiler-style error codes attached to reports.

pub const ERR_SEMANTICS: &str = "X3514";
pub const ERR_PACK_OFFSET_IN_INVALID_SCOPE: &str = "X3530";
pub const ERR_BIND_INVALID: &str = "X3530";
pub const ERR_TARGET_INVALID: &str = "X3515";
pub const ERR_UNDECLARED_IDENTIFIER: &str = "X3004";
pub const ERR_AMBIGUOUS_OVERLOAD: &str = "X3067";
pub const ERR_INVALID_CAST: &str = "X3017";
pub const ERR_REDEFINITION: &str = "X3003";
