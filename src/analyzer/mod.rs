//! Semantic analysis layer - typed expression trees and analysis operations
//!
//! This module provides:
//! - `Expr` / `Query`: the typed expression algebra and query tree
//! - `analyze_type_info`: type unification for binary operations
//! - cast folding on constants (`Expr::add_cast`)
//! - predicate classification (`Expr::group_predicates`) and simple
//!   predicate normalization
//! - target-list rewriting and GROUP BY validation

pub mod datum;
pub mod error;
pub mod expr;
mod fold;
pub mod ops;
mod predicate;
pub mod promote;
pub mod query;
mod rewrite;

pub use datum::Datum;
pub use error::{AnalyzerError, AnalyzerResult};
pub use expr::Expr;
pub use ops::{AggKind, BinaryOp, Qualifier, UnaryOp};
pub use promote::{analyze_type_info, common_numeric_type};
pub use query::{OrderEntry, Query, RangeTblEntry, TargetEntry};
