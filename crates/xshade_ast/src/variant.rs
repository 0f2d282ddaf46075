//! The value type of constant-expression evaluation.

use crate::{DataType, ScalarType};
use std::fmt;
use thiserror::Error;

/// Errors from variant arithmetic.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VariantError {
    #[error("division by zero in constant expression")]
    DivisionByZero,

    #[error("operator '{0}' requires integral operands")]
    NonIntegralOperand(&'static str),

    #[error("invalid literal value '{0}'")]
    InvalidLiteral(String),
}

/// A constant value: boolean, integer, or real.
///
/// Arithmetic promotes to the widest operand type; bools promote to
/// integers, integers to reals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Variant {
    Bool(bool),
    Int(i64),
    Real(f64),
}

impl Variant {
    /// Parses a literal spelling by its lexical category.
    pub fn parse_literal(data_type: DataType, value: &str) -> Result<Variant, VariantError> {
        let invalid = || VariantError::InvalidLiteral(value.to_string());
        match data_type.scalar_type() {
            Some(ScalarType::Bool) => match value {
                "true" => Ok(Variant::Bool(true)),
                "false" => Ok(Variant::Bool(false)),
                _ => Err(invalid()),
            },
            Some(ScalarType::Int) | Some(ScalarType::UInt) => {
                let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16)
                } else {
                    value.parse::<i64>()
                };
                parsed.map(Variant::Int).map_err(|_| invalid())
            }
            Some(_) => value.parse::<f64>().map(Variant::Real).map_err(|_| invalid()),
            None => Err(invalid()),
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            Variant::Bool(b) => b,
            Variant::Int(i) => i != 0,
            Variant::Real(r) => r != 0.0,
        }
    }

    pub fn to_int(self) -> i64 {
        match self {
            Variant::Bool(b) => b as i64,
            Variant::Int(i) => i,
            Variant::Real(r) => r as i64,
        }
    }

    pub fn to_real(self) -> f64 {
        match self {
            Variant::Bool(b) => b as i64 as f64,
            Variant::Int(i) => i as f64,
            Variant::Real(r) => r,
        }
    }

    fn is_real(self) -> bool {
        matches!(self, Variant::Real(_))
    }

    pub fn add(self, rhs: Variant) -> Result<Variant, VariantError> {
        Ok(if self.is_real() || rhs.is_real() {
            Variant::Real(self.to_real() + rhs.to_real())
        } else {
            Variant::Int(self.to_int().wrapping_add(rhs.to_int()))
        })
    }

    pub fn sub(self, rhs: Variant) -> Result<Variant, VariantError> {
        Ok(if self.is_real() || rhs.is_real() {
            Variant::Real(self.to_real() - rhs.to_real())
        } else {
            Variant::Int(self.to_int().wrapping_sub(rhs.to_int()))
        })
    }

    pub fn mul(self, rhs: Variant) -> Result<Variant, VariantError> {
        Ok(if self.is_real() || rhs.is_real() {
            Variant::Real(self.to_real() * rhs.to_real())
        } else {
            Variant::Int(self.to_int().wrapping_mul(rhs.to_int()))
        })
    }

    pub fn div(self, rhs: Variant) -> Result<Variant, VariantError> {
        if self.is_real() || rhs.is_real() {
            let divisor = rhs.to_real();
            if divisor == 0.0 {
                return Err(VariantError::DivisionByZero);
            }
            Ok(Variant::Real(self.to_real() / divisor))
        } else {
            let divisor = rhs.to_int();
            if divisor == 0 {
                return Err(VariantError::DivisionByZero);
            }
            Ok(Variant::Int(self.to_int().wrapping_div(divisor)))
        }
    }

    pub fn rem(self, rhs: Variant) -> Result<Variant, VariantError> {
        if self.is_real() || rhs.is_real() {
            let divisor = rhs.to_real();
            if divisor == 0.0 {
                return Err(VariantError::DivisionByZero);
            }
            Ok(Variant::Real(self.to_real() % divisor))
        } else {
            let divisor = rhs.to_int();
            if divisor == 0 {
                return Err(VariantError::DivisionByZero);
            }
            Ok(Variant::Int(self.to_int().wrapping_rem(divisor)))
        }
    }

    fn integral_pair(self, rhs: Variant, op: &'static str) -> Result<(i64, i64), VariantError> {
        if self.is_real() || rhs.is_real() {
            Err(VariantError::NonIntegralOperand(op))
        } else {
            Ok((self.to_int(), rhs.to_int()))
        }
    }

    pub fn bit_or(self, rhs: Variant) -> Result<Variant, VariantError> {
        let (a, b) = self.integral_pair(rhs, "|")?;
        Ok(Variant::Int(a | b))
    }

    pub fn bit_xor(self, rhs: Variant) -> Result<Variant, VariantError> {
        let (a, b) = self.integral_pair(rhs, "^")?;
        Ok(Variant::Int(a ^ b))
    }

    pub fn bit_and(self, rhs: Variant) -> Result<Variant, VariantError> {
        let (a, b) = self.integral_pair(rhs, "&")?;
        Ok(Variant::Int(a & b))
    }

    pub fn shl(self, rhs: Variant) -> Result<Variant, VariantError> {
        let (a, b) = self.integral_pair(rhs, "<<")?;
        Ok(Variant::Int(a.wrapping_shl(b as u32)))
    }

    pub fn shr(self, rhs: Variant) -> Result<Variant, VariantError> {
        let (a, b) = self.integral_pair(rhs, ">>")?;
        Ok(Variant::Int(a.wrapping_shr(b as u32)))
    }

    pub fn bit_not(self) -> Result<Variant, VariantError> {
        if self.is_real() {
            Err(VariantError::NonIntegralOperand("~"))
        } else {
            Ok(Variant::Int(!self.to_int()))
        }
    }

    pub fn negate(self) -> Variant {
        match self {
            Variant::Real(r) => Variant::Real(-r),
            other => Variant::Int(-other.to_int()),
        }
    }

    pub fn compare(self, rhs: Variant) -> std::cmp::Ordering {
        if self.is_real() || rhs.is_real() {
            self.to_real()
                .partial_cmp(&rhs.to_real())
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            self.to_int().cmp(&rhs.to_int())
        }
    }

    pub fn equals(self, rhs: Variant) -> bool {
        self.compare(rhs) == std::cmp::Ordering::Equal
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(b) => write!(f, "{}", b),
            Variant::Int(i) => write!(f, "{}", i),
            Variant::Real(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion() {
        assert_eq!(
            Variant::Int(1).add(Variant::Real(0.5)).unwrap(),
            Variant::Real(1.5)
        );
        assert_eq!(
            Variant::Bool(true).add(Variant::Int(2)).unwrap(),
            Variant::Int(3)
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            Variant::Int(1).div(Variant::Int(0)),
            Err(VariantError::DivisionByZero)
        );
        assert_eq!(
            Variant::Real(1.0).rem(Variant::Real(0.0)),
            Err(VariantError::DivisionByZero)
        );
    }

    #[test]
    fn bit_ops_reject_reals() {
        assert_eq!(
            Variant::Real(1.0).bit_and(Variant::Int(1)),
            Err(VariantError::NonIntegralOperand("&"))
        );
        assert_eq!(
            Variant::Int(1).shl(Variant::Int(3)).unwrap(),
            Variant::Int(8)
        );
    }

    #[test]
    fn literal_parsing() {
        let int_ty = DataType::Scalar(ScalarType::Int);
        assert_eq!(
            Variant::parse_literal(int_ty, "0xFF").unwrap(),
            Variant::Int(255)
        );
        let bool_ty = DataType::Scalar(ScalarType::Bool);
        assert_eq!(
            Variant::parse_literal(bool_ty, "true").unwrap(),
            Variant::Bool(true)
        );
    }
}
