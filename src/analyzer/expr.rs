//! Expression algebra
//!
//! A tagged variant tree; every variant carries the `TypeInfo` of the value
//! it produces. Children are exclusively owned by their parent, so dropping
//! a root releases the whole subtree. Operations that produce new trees
//! (`deep_copy`, rewrites) always return freshly owned nodes.

use std::collections::HashSet;
use std::fmt;

use crate::analyzer::datum::Datum;
use crate::analyzer::error::{AnalyzerError, AnalyzerResult};
use crate::analyzer::fold;
use crate::analyzer::ops::{AggKind, BinaryOp, Qualifier, UnaryOp};
use crate::analyzer::query::Query;
use crate::catalog::{ColumnId, TableId, TypeInfo};

/// Expression tree node
#[derive(Debug, PartialEq)]
pub enum Expr {
    /// Reference to a base-table column, bound to a range-table entry
    ColumnVar {
        type_info: TypeInfo,
        table_id: TableId,
        column_id: ColumnId,
        rte_idx: usize,
    },
    /// Reference to a projection output slot
    Var {
        type_info: TypeInfo,
        table_id: TableId,
        column_id: ColumnId,
        is_inner: bool,
        varno: usize,
    },
    /// Literal constant; when `is_null` the payload is unspecified
    Constant {
        type_info: TypeInfo,
        is_null: bool,
        value: Datum,
    },
    /// Unary operation (CAST, NOT, negation, IS NULL)
    UOper {
        type_info: TypeInfo,
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary operation with an optional ANY/ALL qualifier
    BinOper {
        type_info: TypeInfo,
        op: BinaryOp,
        qualifier: Qualifier,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Scalar subquery
    Subquery {
        type_info: TypeInfo,
        parsetree: Box<Query>,
    },
    /// `arg IN (v1, v2, ...)`
    InValues {
        type_info: TypeInfo,
        arg: Box<Expr>,
        value_list: Vec<Expr>,
    },
    /// `arg LIKE pattern [ESCAPE esc]`
    LikeExpr {
        type_info: TypeInfo,
        arg: Box<Expr>,
        like: Box<Expr>,
        escape: Option<Box<Expr>>,
    },
    /// Aggregate function; `arg` is `None` for `COUNT(*)`
    AggExpr {
        type_info: TypeInfo,
        kind: AggKind,
        arg: Option<Box<Expr>>,
        is_distinct: bool,
        agg_idx: usize,
    },
}

impl Expr {
    /// Build a column reference
    pub fn column_var(
        type_info: TypeInfo,
        table_id: TableId,
        column_id: ColumnId,
        rte_idx: usize,
    ) -> Self {
        Expr::ColumnVar {
            type_info,
            table_id,
            column_id,
            rte_idx,
        }
    }

    /// Build a non-null constant
    pub fn constant(type_info: TypeInfo, value: Datum) -> Self {
        Expr::Constant {
            type_info,
            is_null: false,
            value,
        }
    }

    /// Build a typed NULL constant
    pub fn null(type_info: TypeInfo) -> Self {
        Expr::Constant {
            type_info,
            is_null: true,
            value: Datum::Boolean(false),
        }
    }

    /// Build a unary operation
    pub fn un_oper(type_info: TypeInfo, op: UnaryOp, operand: Expr) -> Self {
        Expr::UOper {
            type_info,
            op,
            operand: Box::new(operand),
        }
    }

    /// Build a binary operation
    pub fn bin_oper(
        type_info: TypeInfo,
        op: BinaryOp,
        qualifier: Qualifier,
        left: Expr,
        right: Expr,
    ) -> Self {
        Expr::BinOper {
            type_info,
            op,
            qualifier,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// The type descriptor of the value this expression produces
    pub fn type_info(&self) -> &TypeInfo {
        match self {
            Expr::ColumnVar { type_info, .. }
            | Expr::Var { type_info, .. }
            | Expr::Constant { type_info, .. }
            | Expr::UOper { type_info, .. }
            | Expr::BinOper { type_info, .. }
            | Expr::Subquery { type_info, .. }
            | Expr::InValues { type_info, .. }
            | Expr::LikeExpr { type_info, .. }
            | Expr::AggExpr { type_info, .. } => type_info,
        }
    }

    /// Produce an independent copy of this subtree
    ///
    /// Fails with `Unsupported` on subqueries, which cannot be copied until
    /// the planner extends them.
    pub fn deep_copy(&self) -> AnalyzerResult<Expr> {
        let copy = match self {
            Expr::ColumnVar {
                type_info,
                table_id,
                column_id,
                rte_idx,
            } => Expr::ColumnVar {
                type_info: *type_info,
                table_id: *table_id,
                column_id: *column_id,
                rte_idx: *rte_idx,
            },
            Expr::Var {
                type_info,
                table_id,
                column_id,
                is_inner,
                varno,
            } => Expr::Var {
                type_info: *type_info,
                table_id: *table_id,
                column_id: *column_id,
                is_inner: *is_inner,
                varno: *varno,
            },
            Expr::Constant {
                type_info,
                is_null,
                value,
            } => Expr::Constant {
                type_info: *type_info,
                is_null: *is_null,
                value: value.clone(),
            },
            Expr::UOper {
                type_info,
                op,
                operand,
            } => Expr::UOper {
                type_info: *type_info,
                op: *op,
                operand: Box::new(operand.deep_copy()?),
            },
            Expr::BinOper {
                type_info,
                op,
                qualifier,
                left,
                right,
            } => Expr::BinOper {
                type_info: *type_info,
                op: *op,
                qualifier: *qualifier,
                left: Box::new(left.deep_copy()?),
                right: Box::new(right.deep_copy()?),
            },
            Expr::Subquery { .. } => {
                return Err(AnalyzerError::Unsupported(
                    "deep copy of a subquery expression".to_string(),
                ))
            }
            Expr::InValues {
                type_info,
                arg,
                value_list,
            } => Expr::InValues {
                type_info: *type_info,
                arg: Box::new(arg.deep_copy()?),
                value_list: value_list
                    .iter()
                    .map(|v| v.deep_copy())
                    .collect::<AnalyzerResult<Vec<_>>>()?,
            },
            Expr::LikeExpr {
                type_info,
                arg,
                like,
                escape,
            } => Expr::LikeExpr {
                type_info: *type_info,
                arg: Box::new(arg.deep_copy()?),
                like: Box::new(like.deep_copy()?),
                escape: match escape {
                    Some(e) => Some(Box::new(e.deep_copy()?)),
                    None => None,
                },
            },
            Expr::AggExpr {
                type_info,
                kind,
                arg,
                is_distinct,
                agg_idx,
            } => Expr::AggExpr {
                type_info: *type_info,
                kind: *kind,
                arg: match arg {
                    Some(a) => Some(Box::new(a.deep_copy()?)),
                    None => None,
                },
                is_distinct: *is_distinct,
                agg_idx: *agg_idx,
            },
        };
        Ok(copy)
    }

    /// Collect the range-table indexes referenced by the leaves of this tree
    ///
    /// `Var` nodes bind to projection slots and `Subquery` columns bind to
    /// the subquery's own range table, so neither contributes.
    pub fn collect_rte_idx(&self, set: &mut HashSet<usize>) {
        match self {
            Expr::ColumnVar { rte_idx, .. } => {
                set.insert(*rte_idx);
            }
            Expr::Var { .. } | Expr::Constant { .. } | Expr::Subquery { .. } => {}
            Expr::UOper { operand, .. } => operand.collect_rte_idx(set),
            Expr::BinOper { left, right, .. } => {
                left.collect_rte_idx(set);
                right.collect_rte_idx(set);
            }
            Expr::InValues {
                arg, value_list, ..
            } => {
                arg.collect_rte_idx(set);
                for v in value_list {
                    v.collect_rte_idx(set);
                }
            }
            Expr::LikeExpr {
                arg, like, escape, ..
            } => {
                arg.collect_rte_idx(set);
                like.collect_rte_idx(set);
                if let Some(e) = escape {
                    e.collect_rte_idx(set);
                }
            }
            Expr::AggExpr { arg, .. } => {
                if let Some(a) = arg {
                    a.collect_rte_idx(set);
                }
            }
        }
    }

    /// Cast this expression to `new_type`
    ///
    /// Constants fold the cast into the literal where the type pair allows
    /// it; anything else is wrapped in a CAST unary operator, except when
    /// the target equals the current type (no-op). Subqueries cannot be
    /// cast.
    pub fn add_cast(self, new_type: &TypeInfo) -> AnalyzerResult<Expr> {
        match self {
            Expr::Constant {
                type_info,
                is_null,
                value,
            } => fold::cast_constant(type_info, is_null, value, new_type),
            Expr::Subquery { .. } => Err(AnalyzerError::Unsupported(
                "cast of a subquery expression".to_string(),
            )),
            other => {
                if other.type_info() == new_type {
                    return Ok(other);
                }
                Ok(Expr::UOper {
                    type_info: *new_type,
                    op: UnaryOp::Cast,
                    operand: Box::new(other),
                })
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::ColumnVar {
                table_id,
                column_id,
                ..
            } => write!(f, "t{}.c{}", table_id, column_id),
            Expr::Var { varno, .. } => write!(f, "${}", varno),
            Expr::Constant { is_null: true, .. } => write!(f, "NULL"),
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::UOper {
                op: UnaryOp::Cast,
                type_info,
                operand,
            } => write!(f, "CAST({} AS {})", operand, type_info),
            Expr::UOper {
                op: UnaryOp::IsNull,
                operand,
                ..
            } => write!(f, "({} IS NULL)", operand),
            Expr::UOper { op, operand, .. } => write!(f, "({} {})", op.as_str(), operand),
            Expr::BinOper {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.as_str(), right),
            Expr::Subquery { .. } => write!(f, "(subquery)"),
            Expr::InValues {
                arg, value_list, ..
            } => {
                write!(f, "{} IN (", arg)?;
                for (i, v) in value_list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            Expr::LikeExpr {
                arg, like, escape, ..
            } => {
                write!(f, "({} LIKE {}", arg, like)?;
                if let Some(e) = escape {
                    write!(f, " ESCAPE {}", e)?;
                }
                write!(f, ")")
            }
            Expr::AggExpr {
                kind,
                arg,
                is_distinct,
                ..
            } => match arg {
                Some(a) if *is_distinct => write!(f, "{}(DISTINCT {})", kind.as_str(), a),
                Some(a) => write!(f, "{}({})", kind.as_str(), a),
                None => write!(f, "{}(*)", kind.as_str()),
            },
        }
    }
}
