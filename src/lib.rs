//! sqlsema - semantic analysis for SQL query trees
//!
//! Sits between a SQL parser and a query planner:
//! - typed expression algebra with deep copy and structural visitation
//! - numeric type unification and promotion (integers, floats, fixed-point)
//! - constant cast folding at analysis time
//! - predicate classification into scan / join / constant groups
//! - target-list rewriting and GROUP BY validation

pub mod analyzer;
pub mod catalog;
