//! Predicate classification and normalization
//!
//! Predicates are grouped by how many distinct range-table entries their
//! leaves reference: none (constant), one (pushable into a table scan), or
//! several (join). Simple `column op constant` comparisons are additionally
//! normalized into a canonical orientation for index-lookup selection.

use std::collections::HashSet;

use crate::analyzer::expr::Expr;
use crate::analyzer::ops::BinaryOp;
use crate::catalog::SqlType;

impl Expr {
    /// Partition this predicate among scan, join, and constant groups
    ///
    /// Top-level conjunctions are flattened: each operand of an AND is
    /// classified on its own. A bare column reference counts as a scan
    /// predicate only when it is boolean (`WHERE active` form).
    pub fn group_predicates<'a>(
        &'a self,
        scan_predicates: &mut Vec<&'a Expr>,
        join_predicates: &mut Vec<&'a Expr>,
        const_predicates: &mut Vec<&'a Expr>,
    ) {
        match self {
            Expr::BinOper {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => {
                left.group_predicates(scan_predicates, join_predicates, const_predicates);
                right.group_predicates(scan_predicates, join_predicates, const_predicates);
            }
            Expr::ColumnVar { type_info, .. } => {
                if type_info.kind == SqlType::Boolean {
                    scan_predicates.push(self);
                }
            }
            _ => {
                let mut rte_set = HashSet::new();
                self.collect_rte_idx(&mut rte_set);
                match rte_set.len() {
                    0 => const_predicates.push(self),
                    1 => scan_predicates.push(self),
                    _ => join_predicates.push(self),
                }
            }
        }
    }

    /// Recognize `column op constant` (either orientation) for a comparison
    ///
    /// Returns a fresh copy in the canonical column-on-the-left orientation
    /// together with the column's range-table index; the operator is
    /// commuted when the input was reversed. The input tree is untouched.
    pub fn normalize_simple_predicate(&self) -> Option<(Expr, usize)> {
        let Expr::BinOper {
            type_info,
            op,
            qualifier,
            left,
            right,
        } = self
        else {
            return None;
        };
        if !op.is_comparison() {
            return None;
        }
        match (left.as_ref(), right.as_ref()) {
            (Expr::ColumnVar { rte_idx, .. }, Expr::Constant { .. }) => {
                Some((self.deep_copy().ok()?, *rte_idx))
            }
            (Expr::Constant { .. }, Expr::ColumnVar { rte_idx, .. }) => {
                let normalized = Expr::BinOper {
                    type_info: *type_info,
                    op: op.commute(),
                    qualifier: *qualifier,
                    left: Box::new(right.deep_copy().ok()?),
                    right: Box::new(left.deep_copy().ok()?),
                };
                Some((normalized, *rte_idx))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::datum::Datum;
    use crate::analyzer::ops::Qualifier;
    use crate::catalog::TypeInfo;

    fn int_col(rte_idx: usize, column_id: i32) -> Expr {
        Expr::column_var(TypeInfo::plain(SqlType::Int), rte_idx as i32 + 1, column_id, rte_idx)
    }

    fn int_const(v: i32) -> Expr {
        Expr::constant(TypeInfo::plain(SqlType::Int), Datum::Int(v))
    }

    fn cmp(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::bin_oper(
            TypeInfo::plain(SqlType::Boolean),
            op,
            Qualifier::None,
            left,
            right,
        )
    }

    #[test]
    fn test_normalize_already_canonical() {
        let pred = cmp(BinaryOp::Gt, int_col(0, 2), int_const(5));
        let (normalized, rte_idx) = pred.normalize_simple_predicate().unwrap();
        assert_eq!(rte_idx, 0);
        assert_eq!(normalized, pred);
    }

    #[test]
    fn test_normalize_reversed_commutes_operator() {
        // 5 < t.c2 becomes t.c2 > 5
        let pred = cmp(BinaryOp::Lt, int_const(5), int_col(0, 2));
        let (normalized, rte_idx) = pred.normalize_simple_predicate().unwrap();
        assert_eq!(rte_idx, 0);
        assert_eq!(
            normalized,
            cmp(BinaryOp::Gt, int_col(0, 2), int_const(5))
        );
        // input is unchanged
        assert_eq!(pred, cmp(BinaryOp::Lt, int_const(5), int_col(0, 2)));
    }

    #[test]
    fn test_normalize_rejects_non_simple_shapes() {
        // column op column
        let pred = cmp(BinaryOp::Eq, int_col(0, 1), int_col(1, 2));
        assert!(pred.normalize_simple_predicate().is_none());

        // non-comparison operator
        let pred = Expr::bin_oper(
            TypeInfo::plain(SqlType::Boolean),
            BinaryOp::And,
            Qualifier::None,
            cmp(BinaryOp::Eq, int_col(0, 1), int_const(1)),
            cmp(BinaryOp::Eq, int_col(0, 2), int_const(2)),
        );
        assert!(pred.normalize_simple_predicate().is_none());

        // not a binary operation at all
        assert!(int_const(1).normalize_simple_predicate().is_none());
    }
}
