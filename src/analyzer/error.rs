//! Analyzer error types

use thiserror::Error;

/// Errors surfaced during semantic analysis
///
/// None are recovered locally; callers discard the partially built tree.
#[derive(Error, Debug, Clone)]
pub enum AnalyzerError {
    /// Operand types incompatible with the operator
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Binary operator outside the logic/comparison/arithmetic families
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// Non-aggregated column outside GROUP BY
    #[error("{0}")]
    GroupByViolation(String),

    /// Operation not supported on this expression form
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
