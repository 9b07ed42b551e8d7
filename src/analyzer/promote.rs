//! Type unification for binary operations
//!
//! `analyze_type_info` applies the typing rule of the operator family
//! (logic, comparison, arithmetic) and, for numeric operand pairs, unifies
//! both sides to their common numeric type. The caller wraps operands in
//! CAST nodes when the unified types differ from the inputs.

use crate::analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::analyzer::ops::BinaryOp;
use crate::catalog::{SqlType, TypeInfo};

/// Compute the result type of `left op right` and the types both operands
/// must be cast to
///
/// Returns `(result, new_left, new_right)`.
pub fn analyze_type_info(
    op: BinaryOp,
    left: &TypeInfo,
    right: &TypeInfo,
) -> AnalyzerResult<(TypeInfo, TypeInfo, TypeInfo)> {
    let mut new_left = *left;
    let mut new_right = *right;

    let result = if op.is_logic() {
        if left.kind != SqlType::Boolean || right.kind != SqlType::Boolean {
            return Err(AnalyzerError::TypeMismatch(
                "non-boolean operands cannot be used in logic operations".to_string(),
            ));
        }
        TypeInfo::plain(SqlType::Boolean)
    } else if op.is_comparison() {
        if left.kind.is_string() != right.kind.is_string() {
            return Err(AnalyzerError::TypeMismatch(
                "cannot compare between string and non-string types".to_string(),
            ));
        }
        if left.kind.is_number() != right.kind.is_number() {
            return Err(AnalyzerError::TypeMismatch(
                "cannot compare between numeric and non-numeric types".to_string(),
            ));
        }
        if left.kind.is_number() && right.kind.is_number() {
            let common = common_numeric_type(left, right)?;
            new_left = common;
            new_right = common;
        }
        TypeInfo::plain(SqlType::Boolean)
    } else if op.is_arithmetic() {
        if !left.kind.is_number() || !right.kind.is_number() {
            return Err(AnalyzerError::TypeMismatch(
                "non-numeric operands in arithmetic operations".to_string(),
            ));
        }
        let common = common_numeric_type(left, right)?;
        new_left = common;
        new_right = common;
        common
    } else {
        return Err(AnalyzerError::InvalidOperator(
            "invalid binary operator type".to_string(),
        ));
    };

    tracing::debug!(op = op.as_str(), %result, "unified binary operand types");
    Ok((result, new_left, new_right))
}

/// The smallest numeric type that losslessly contains both operands
///
/// Commutative over all numeric kind pairs. Non-numeric inputs are an
/// internal invariant violation; callers gate on `is_number`.
pub fn common_numeric_type(a: &TypeInfo, b: &TypeInfo) -> AnalyzerResult<TypeInfo> {
    use SqlType::*;

    if !a.kind.is_number() || !b.kind.is_number() {
        return Err(AnalyzerError::Internal(
            "non-numeric type in the numeric promotion lattice".to_string(),
        ));
    }

    if a.kind == b.kind {
        return Ok(TypeInfo::new(
            a.kind,
            a.dimension.max(b.dimension),
            a.scale.max(b.scale),
        ));
    }

    let common = match (a.kind, b.kind) {
        (SmallInt, Int) | (Int, SmallInt) => TypeInfo::plain(Int),
        (SmallInt, BigInt) | (BigInt, SmallInt) | (Int, BigInt) | (BigInt, Int) => {
            TypeInfo::plain(BigInt)
        }
        (SmallInt, Float) | (Float, SmallInt) | (Int, Float) | (Float, Int) => {
            TypeInfo::plain(Float)
        }
        // a 32-bit float cannot hold BIGINT magnitudes
        (BigInt, Float) | (Float, BigInt) => TypeInfo::plain(Double),
        (Double, _) | (_, Double) => TypeInfo::plain(Double),
        (Float, Numeric) | (Float, Decimal) | (Numeric, Float) | (Decimal, Float) => {
            TypeInfo::plain(Double)
        }
        (k, Numeric) | (k, Decimal) if k.is_integer() => integer_fixed_point_common(k, b),
        (Numeric, k) | (Decimal, k) if k.is_integer() => integer_fixed_point_common(k, a),
        // NUMERIC x DECIMAL: union of the integer parts plus the widest
        // fraction
        (Numeric, Decimal) | (Decimal, Numeric) => {
            let scale = a.scale.max(b.scale);
            let dimension = (a.dimension - a.scale).max(b.dimension - b.scale) + scale;
            TypeInfo::numeric(dimension, scale)
        }
        _ => {
            return Err(AnalyzerError::Internal(
                "unreachable numeric promotion pair".to_string(),
            ))
        }
    };
    Ok(common)
}

/// Common type of an integer kind and a fixed-point operand: NUMERIC with
/// the fixed-point scale and a precision wide enough for the integer's
/// magnitude
fn integer_fixed_point_common(int_kind: SqlType, fixed: &TypeInfo) -> TypeInfo {
    let dimension = match int_kind {
        SqlType::SmallInt => (5 + fixed.scale).max(fixed.dimension),
        SqlType::Int => 19.min(10 + fixed.scale).max(fixed.dimension),
        // maximum precision of BIGINT
        _ => 19,
    };
    TypeInfo::numeric(dimension, fixed.scale)
}
