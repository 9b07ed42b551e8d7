//! Target-list rewriting and GROUP BY validation
//!
//! Once a query's projection is built, predicates evaluated above it
//! (HAVING, ORDER BY) must reference the projection's output expressions
//! rather than base columns or re-computed aggregates. The rewrite returns
//! a fresh tree and leaves its input untouched.

use crate::analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::analyzer::expr::Expr;
use crate::analyzer::query::TargetEntry;

impl Expr {
    /// Rewrite this tree to reference the projection in `tlist`
    ///
    /// Column references are replaced by the first matching non-aggregate
    /// projection of the same column; aggregates are matched by their
    /// aggregate index. A reference with no projection entry is an internal
    /// error: the projection was built from the same query.
    pub fn rewrite_with_targetlist(&self, tlist: &[TargetEntry]) -> AnalyzerResult<Expr> {
        match self {
            Expr::ColumnVar {
                table_id,
                column_id,
                ..
            } => {
                for tle in tlist {
                    if let Expr::ColumnVar {
                        table_id: t,
                        column_id: c,
                        ..
                    } = &tle.expr
                    {
                        if table_id == t && column_id == c {
                            return tle.expr.deep_copy();
                        }
                    }
                }
                Err(AnalyzerError::Internal(
                    "cannot find column variable in targetlist".to_string(),
                ))
            }
            Expr::AggExpr { agg_idx, .. } => {
                for tle in tlist {
                    if let Expr::AggExpr {
                        agg_idx: tle_idx, ..
                    } = &tle.expr
                    {
                        if agg_idx == tle_idx {
                            return tle.expr.deep_copy();
                        }
                    }
                }
                Err(AnalyzerError::Internal(
                    "cannot find aggregate expression in targetlist".to_string(),
                ))
            }
            Expr::UOper {
                type_info,
                op,
                operand,
            } => Ok(Expr::UOper {
                type_info: *type_info,
                op: *op,
                operand: Box::new(operand.rewrite_with_targetlist(tlist)?),
            }),
            Expr::BinOper {
                type_info,
                op,
                qualifier,
                left,
                right,
            } => Ok(Expr::BinOper {
                type_info: *type_info,
                op: *op,
                qualifier: *qualifier,
                left: Box::new(left.rewrite_with_targetlist(tlist)?),
                right: Box::new(right.rewrite_with_targetlist(tlist)?),
            }),
            Expr::InValues {
                type_info,
                arg,
                value_list,
            } => Ok(Expr::InValues {
                type_info: *type_info,
                arg: Box::new(arg.rewrite_with_targetlist(tlist)?),
                value_list: value_list
                    .iter()
                    .map(|v| v.deep_copy())
                    .collect::<AnalyzerResult<Vec<_>>>()?,
            }),
            Expr::LikeExpr {
                type_info,
                arg,
                like,
                escape,
            } => Ok(Expr::LikeExpr {
                type_info: *type_info,
                arg: Box::new(arg.rewrite_with_targetlist(tlist)?),
                like: Box::new(like.rewrite_with_targetlist(tlist)?),
                escape: match escape {
                    Some(e) => Some(Box::new(e.rewrite_with_targetlist(tlist)?)),
                    None => None,
                },
            }),
            Expr::Constant { .. } | Expr::Var { .. } | Expr::Subquery { .. } => self.deep_copy(),
        }
    }

    /// Verify every column outside an aggregate matches a GROUP BY entry
    ///
    /// Composite expressions recurse; aggregate arguments are exempt.
    pub fn check_group_by(&self, groupby: &[Expr]) -> AnalyzerResult<()> {
        match self {
            Expr::ColumnVar {
                table_id,
                column_id,
                ..
            } => {
                for g in groupby {
                    if let Expr::ColumnVar {
                        table_id: t,
                        column_id: c,
                        ..
                    } = g
                    {
                        if table_id == t && column_id == c {
                            return Ok(());
                        }
                    }
                }
                Err(AnalyzerError::GroupByViolation(
                    "expressions in the SELECT or HAVING clause must be an aggregate function \
                     or an expression over GROUP BY columns"
                        .to_string(),
                ))
            }
            Expr::UOper { operand, .. } => operand.check_group_by(groupby),
            Expr::BinOper { left, right, .. } => {
                left.check_group_by(groupby)?;
                right.check_group_by(groupby)
            }
            Expr::InValues {
                arg, value_list, ..
            } => {
                arg.check_group_by(groupby)?;
                for v in value_list {
                    v.check_group_by(groupby)?;
                }
                Ok(())
            }
            Expr::LikeExpr {
                arg, like, escape, ..
            } => {
                arg.check_group_by(groupby)?;
                like.check_group_by(groupby)?;
                if let Some(e) = escape {
                    e.check_group_by(groupby)?;
                }
                Ok(())
            }
            Expr::AggExpr { .. } => Ok(()),
            Expr::Constant { .. } | Expr::Var { .. } | Expr::Subquery { .. } => Ok(()),
        }
    }
}
