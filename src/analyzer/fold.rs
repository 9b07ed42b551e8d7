//! Constant cast folding
//!
//! Casting a literal at analysis time removes a per-row cast from the
//! executor. Numeric-to-numeric and string-to-string casts are folded into
//! the payload; any other pairing falls back to a CAST wrapper node.
//! Fixed-point payloads are integers scaled by powers of ten, so rescaling
//! stays exact within the 64-bit range.

use crate::analyzer::datum::Datum;
use crate::analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::analyzer::expr::Expr;
use crate::analyzer::ops::UnaryOp;
use crate::catalog::{SqlType, TypeInfo};

fn pow10(scale: i32) -> i64 {
    10i64.pow(scale.max(0) as u32)
}

/// Fold a cast into a constant where the type pair allows it
///
/// Null constants are merely retyped. Numeric and string pairs fold in
/// place; everything else wraps in a CAST unary operator (or returns the
/// constant unchanged when the target type equals the current one).
pub(crate) fn cast_constant(
    type_info: TypeInfo,
    is_null: bool,
    value: Datum,
    new_type: &TypeInfo,
) -> AnalyzerResult<Expr> {
    if is_null {
        return Ok(Expr::Constant {
            type_info: *new_type,
            is_null: true,
            value,
        });
    }
    if type_info.kind.is_number() && new_type.kind.is_number() {
        return Ok(Expr::Constant {
            type_info: *new_type,
            is_null: false,
            value: cast_number(value, &type_info, new_type)?,
        });
    }
    if type_info.kind.is_string() && new_type.kind.is_string() {
        return Ok(Expr::Constant {
            type_info: *new_type,
            is_null: false,
            value: cast_string(value, new_type)?,
        });
    }
    let constant = Expr::Constant {
        type_info,
        is_null,
        value,
    };
    if type_info == *new_type {
        return Ok(constant);
    }
    Ok(Expr::UOper {
        type_info: *new_type,
        op: UnaryOp::Cast,
        operand: Box::new(constant),
    })
}

/// Convert a numeric payload between numeric kinds
///
/// Integer narrowing truncates two's-complement style; fixed-point targets
/// scale the integer payload by `10^scale`; fixed-point sources divide it
/// back out first.
fn cast_number(value: Datum, from: &TypeInfo, to: &TypeInfo) -> AnalyzerResult<Datum> {
    let out = if from.kind.is_integer() {
        let v = value
            .as_i64()
            .ok_or_else(|| payload_mismatch(from))?;
        match to.kind {
            SqlType::SmallInt => Datum::SmallInt(v as i16),
            SqlType::Int => Datum::Int(v as i32),
            SqlType::BigInt => Datum::BigInt(v),
            SqlType::Float => Datum::Float(v as f32),
            SqlType::Double => Datum::Double(v as f64),
            SqlType::Numeric | SqlType::Decimal => Datum::BigInt(v * pow10(to.scale)),
            _ => return Err(payload_mismatch(to)),
        }
    } else if matches!(from.kind, SqlType::Float | SqlType::Double) {
        let v = value
            .as_f64()
            .ok_or_else(|| payload_mismatch(from))?;
        match to.kind {
            SqlType::SmallInt => Datum::SmallInt(v as i16),
            SqlType::Int => Datum::Int(v as i32),
            SqlType::BigInt => Datum::BigInt(v as i64),
            SqlType::Float => Datum::Float(v as f32),
            SqlType::Double => Datum::Double(v),
            SqlType::Numeric | SqlType::Decimal => {
                Datum::BigInt((v * pow10(to.scale) as f64) as i64)
            }
            _ => return Err(payload_mismatch(to)),
        }
    } else if from.kind.is_fixed_point() {
        let v = match value {
            Datum::BigInt(v) => v,
            _ => return Err(payload_mismatch(from)),
        };
        match to.kind {
            SqlType::SmallInt => Datum::SmallInt((v / pow10(from.scale)) as i16),
            SqlType::Int => Datum::Int((v / pow10(from.scale)) as i32),
            SqlType::BigInt => Datum::BigInt(v / pow10(from.scale)),
            SqlType::Float => Datum::Float(v as f32 / pow10(from.scale) as f32),
            SqlType::Double => Datum::Double(v as f64 / pow10(from.scale) as f64),
            SqlType::Numeric | SqlType::Decimal => {
                if to.scale > from.scale {
                    Datum::BigInt(v * pow10(to.scale - from.scale))
                } else if to.scale < from.scale {
                    Datum::BigInt(v / pow10(from.scale - to.scale))
                } else {
                    Datum::BigInt(v)
                }
            }
            _ => return Err(payload_mismatch(to)),
        }
    } else {
        return Err(payload_mismatch(from));
    };
    Ok(out)
}

/// Truncate a string payload to the target length
///
/// TEXT is unbounded. Truncation backs off to the nearest character
/// boundary so the payload stays valid UTF-8.
fn cast_string(value: Datum, to: &TypeInfo) -> AnalyzerResult<Datum> {
    let mut s = match value {
        Datum::String(s) => s,
        _ => return Err(payload_mismatch(to)),
    };
    let max_len = to.dimension.max(0) as usize;
    if to.kind != SqlType::Text && max_len < s.len() {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    Ok(Datum::String(s))
}

fn payload_mismatch(type_info: &TypeInfo) -> AnalyzerError {
    AnalyzerError::Internal(format!(
        "constant payload does not match its type descriptor {}",
        type_info
    ))
}
