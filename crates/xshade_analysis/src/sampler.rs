//! Sampler-state harvesting from `sampler_state { ... }` initializers.

use crate::analyzer::Analyzer;
use xshade_ast::{ConstExprEvaluator, Expr, ExprKind, SamplerDecl};
use xshade_common::{ComparisonFunc, Filter, SamplerState, TextureAddressMode};

/// Folds the named state values of a sampler declaration into a
/// [`SamplerState`] record. Unknown names and malformed values are
/// reported as warnings and leave the default in place.
pub(crate) fn harvest_sampler_state(
    analyzer: &mut Analyzer,
    decl: &SamplerDecl,
) -> SamplerState {
    let mut state = SamplerState::default();

    for value in &decl.values {
        match value.name.as_str() {
            "MipLODBias" => {
                if let Some(v) = eval_float(&value.value) {
                    state.mip_lod_bias = v;
                }
            }
            "MaxAnisotropy" => {
                if let Some(v) = eval_float(&value.value) {
                    state.max_anisotropy = v.max(0.0) as u32;
                }
            }
            "MinLOD" => {
                if let Some(v) = eval_float(&value.value) {
                    state.min_lod = v;
                }
            }
            "MaxLOD" => {
                if let Some(v) = eval_float(&value.value) {
                    state.max_lod = v;
                }
            }
            "Filter" => match enum_ident(&value.value).and_then(parse_filter) {
                Some(filter) => state.filter = filter,
                None => analyzer.reports.warning(
                    "unknown value to initialize sampler value 'Filter'",
                    Some(value.span),
                ),
            },
            "AddressU" => match enum_ident(&value.value).and_then(parse_address_mode) {
                Some(mode) => state.address_u = mode,
                None => analyzer.reports.warning(
                    "unknown value to initialize sampler value 'AddressU'",
                    Some(value.span),
                ),
            },
            "AddressV" => match enum_ident(&value.value).and_then(parse_address_mode) {
                Some(mode) => state.address_v = mode,
                None => analyzer.reports.warning(
                    "unknown value to initialize sampler value 'AddressV'",
                    Some(value.span),
                ),
            },
            "AddressW" => match enum_ident(&value.value).and_then(parse_address_mode) {
                Some(mode) => state.address_w = mode,
                None => analyzer.reports.warning(
                    "unknown value to initialize sampler value 'AddressW'",
                    Some(value.span),
                ),
            },
            "ComparisonFunc" => match enum_ident(&value.value).and_then(parse_comparison_func) {
                Some(func) => state.comparison_func = func,
                None => analyzer.reports.warning(
                    "unknown value to initialize sampler value 'ComparisonFunc'",
                    Some(value.span),
                ),
            },
            "BorderColor" => {
                if let Some(color) = eval_border_color(&value.value) {
                    state.border_color = color;
                } else {
                    analyzer.reports.warning(
                        "invalid arguments to initialize sampler value 'BorderColor'",
                        Some(value.span),
                    );
                }
            }
            _ => {}
        }
    }

    state
}

/// Evaluates a sub-expression to a constant float.
fn eval_float(expr: &Expr) -> Option<f32> {
    ConstExprEvaluator::new()
        .evaluate(expr)
        .ok()
        .map(|v| v.to_real() as f32)
}

/// State enumerations are written as bare identifiers, which parse as
/// variable accesses.
fn enum_ident(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::VarAccess {
            var_ident,
            assign_op: None,
            ..
        } if var_ident.next.is_none() => Some(&var_ident.ident),
        _ => None,
    }
}

/// A border color is a vector constructor, a cast (broadcast), or an
/// initializer list of four constants.
fn eval_border_color(expr: &Expr) -> Option<[f32; 4]> {
    match &expr.kind {
        ExprKind::Call(call) => {
            let ty = call.type_ctor.as_ref()?;
            if !ty.is_vector() || call.args.len() != 4 {
                return None;
            }
            let mut color = [0.0f32; 4];
            for (slot, arg) in color.iter_mut().zip(&call.args) {
                *slot = eval_float(arg)?;
            }
            Some(color)
        }
        ExprKind::Cast { expr, .. } => {
            let value = eval_float(expr)?;
            Some([value; 4])
        }
        ExprKind::Initializer(exprs) => {
            if exprs.len() != 4 {
                return None;
            }
            let mut color = [0.0f32; 4];
            for (slot, arg) in color.iter_mut().zip(exprs) {
                *slot = eval_float(arg)?;
            }
            Some(color)
        }
        _ => None,
    }
}

fn parse_filter(value: &str) -> Option<Filter> {
    use Filter as F;
    Some(match value {
        "MIN_MAG_MIP_POINT" => F::MinMagMipPoint,
        "MIN_MAG_POINT_MIP_LINEAR" => F::MinMagPointMipLinear,
        "MIN_POINT_MAG_LINEAR_MIP_POINT" => F::MinPointMagLinearMipPoint,
        "MIN_POINT_MAG_MIP_LINEAR" => F::MinPointMagMipLinear,
        "MIN_LINEAR_MAG_MIP_POINT" => F::MinLinearMagMipPoint,
        "MIN_LINEAR_MAG_POINT_MIP_LINEAR" => F::MinLinearMagPointMipLinear,
        "MIN_MAG_LINEAR_MIP_POINT" => F::MinMagLinearMipPoint,
        "MIN_MAG_MIP_LINEAR" => F::MinMagMipLinear,
        "ANISOTROPIC" => F::Anisotropic,
        "COMPARISON_MIN_MAG_MIP_POINT" => F::ComparisonMinMagMipPoint,
        "COMPARISON_MIN_MAG_POINT_MIP_LINEAR" => F::ComparisonMinMagPointMipLinear,
        "COMPARISON_MIN_POINT_MAG_LINEAR_MIP_POINT" => F::ComparisonMinPointMagLinearMipPoint,
        "COMPARISON_MIN_POINT_MAG_MIP_LINEAR" => F::ComparisonMinPointMagMipLinear,
        "COMPARISON_MIN_LINEAR_MAG_MIP_POINT" => F::ComparisonMinLinearMagMipPoint,
        "COMPARISON_MIN_LINEAR_MAG_POINT_MIP_LINEAR" => F::ComparisonMinLinearMagPointMipLinear,
        "COMPARISON_MIN_MAG_LINEAR_MIP_POINT" => F::ComparisonMinMagLinearMipPoint,
        "COMPARISON_MIN_MAG_MIP_LINEAR" => F::ComparisonMinMagMipLinear,
        "COMPARISON_ANISOTROPIC" => F::ComparisonAnisotropic,
        "MINIMUM_MIN_MAG_MIP_POINT" => F::MinimumMinMagMipPoint,
        "MINIMUM_MIN_MAG_POINT_MIP_LINEAR" => F::MinimumMinMagPointMipLinear,
        "MINIMUM_MIN_POINT_MAG_LINEAR_MIP_POINT" => F::MinimumMinPointMagLinearMipPoint,
        "MINIMUM_MIN_POINT_MAG_MIP_LINEAR" => F::MinimumMinPointMagMipLinear,
        "MINIMUM_MIN_LINEAR_MAG_MIP_POINT" => F::MinimumMinLinearMagMipPoint,
        "MINIMUM_MIN_LINEAR_MAG_POINT_MIP_LINEAR" => F::MinimumMinLinearMagPointMipLinear,
        "MINIMUM_MIN_MAG_LINEAR_MIP_POINT" => F::MinimumMinMagLinearMipPoint,
        "MINIMUM_MIN_MAG_MIP_LINEAR" => F::MinimumMinMagMipLinear,
        "MINIMUM_ANISOTROPIC" => F::MinimumAnisotropic,
        "MAXIMUM_MIN_MAG_MIP_POINT" => F::MaximumMinMagMipPoint,
        "MAXIMUM_MIN_MAG_POINT_MIP_LINEAR" => F::MaximumMinMagPointMipLinear,
        "MAXIMUM_MIN_POINT_MAG_LINEAR_MIP_POINT" => F::MaximumMinPointMagLinearMipPoint,
        "MAXIMUM_MIN_POINT_MAG_MIP_LINEAR" => F::MaximumMinPointMagMipLinear,
        "MAXIMUM_MIN_LINEAR_MAG_MIP_POINT" => F::MaximumMinLinearMagMipPoint,
        "MAXIMUM_MIN_LINEAR_MAG_POINT_MIP_LINEAR" => F::MaximumMinLinearMagPointMipLinear,
        "MAXIMUM_MIN_MAG_LINEAR_MIP_POINT" => F::MaximumMinMagLinearMipPoint,
        "MAXIMUM_MIN_MAG_MIP_LINEAR" => F::MaximumMinMagMipLinear,
        "MAXIMUM_ANISOTROPIC" => F::MaximumAnisotropic,
        _ => return None,
    })
}

fn parse_address_mode(value: &str) -> Option<TextureAddressMode> {
    use TextureAddressMode as T;
    Some(match value {
        "WRAP" => T::Wrap,
        "MIRROR" => T::Mirror,
        "CLAMP" => T::Clamp,
        "BORDER" => T::Border,
        "MIRROR_ONCE" => T::MirrorOnce,
        _ => return None,
    })
}

fn parse_comparison_func(value: &str) -> Option<ComparisonFunc> {
    use ComparisonFunc as C;
    Some(match value {
        "COMPARISON_NEVER" | "NEVER" => C::Never,
        "COMPARISON_LESS" | "LESS" => C::Less,
        "COMPARISON_EQUAL" | "EQUAL" => C::Equal,
        "COMPARISON_LESS_EQUAL" | "LESS_EQUAL" => C::LessEqual,
        "COMPARISON_GREATER" | "GREATER" => C::Greater,
        "COMPARISON_NOT_EQUAL" | "NOT_EQUAL" => C::NotEqual,
        "COMPARISON_GREATER_EQUAL" | "GREATER_EQUAL" => C::GreaterEqual,
        "COMPARISON_ALWAYS" | "ALWAYS" => C::Always,
        _ => return None,
    })
}
