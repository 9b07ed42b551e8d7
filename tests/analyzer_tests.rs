//! Analyzer integration tests

use std::collections::HashSet;

use sqlsema::analyzer::{
    analyze_type_info, AggKind, BinaryOp, Datum, Expr, OrderEntry, Qualifier, Query,
    RangeTblEntry, TargetEntry,
};
use sqlsema::catalog::{Catalog, SqlType, TableDescriptor, TypeInfo};

/// Create a test catalog with sample tables
fn test_catalog() -> (Catalog, TableDescriptor, TableDescriptor) {
    let mut catalog = Catalog::new();

    let users = catalog.create_table(
        "users",
        vec![
            ("id", TypeInfo::plain(SqlType::Int)),
            ("name", TypeInfo::varchar(100)),
            ("age", TypeInfo::plain(SqlType::Int)),
            ("active", TypeInfo::plain(SqlType::Boolean)),
        ],
    );

    let orders = catalog.create_table(
        "orders",
        vec![
            ("id", TypeInfo::plain(SqlType::Int)),
            ("user_id", TypeInfo::plain(SqlType::Int)),
            ("total", TypeInfo::numeric(12, 2)),
        ],
    );

    (catalog, users, orders)
}

/// Build `FROM users u, orders o` and expand `u.*` into the target list
fn two_table_query() -> Query {
    let (catalog, users, orders) = test_catalog();
    let mut query = Query::new();

    let u_idx = query.add_rte(RangeTblEntry::new("u", users));
    let o_idx = query.add_rte(RangeTblEntry::new("o", orders));
    assert_eq!((u_idx, o_idx), (0, 1));

    let mut tlist = Vec::new();
    query.rangetable[u_idx].expand_star_in_targetlist(&catalog, &mut tlist, u_idx);
    query.targetlist = tlist;
    query
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

fn and(left: Expr, right: Expr) -> Expr {
    Expr::bin_oper(
        TypeInfo::plain(SqlType::Boolean),
        BinaryOp::And,
        Qualifier::None,
        left,
        right,
    )
}

// ============ Range table and star expansion ============

#[test]
fn test_star_expansion_builds_targetlist() {
    let query = two_table_query();
    assert_eq!(query.targetlist.len(), 4);
    assert_eq!(query.targetlist[0].name, "id");
    assert_eq!(query.targetlist[3].name, "active");
    for (i, tle) in query.targetlist.iter().enumerate() {
        match &tle.expr {
            Expr::ColumnVar {
                column_id, rte_idx, ..
            } => {
                assert_eq!(*column_id, i as i32);
                assert_eq!(*rte_idx, 0);
            }
            other => panic!("expected column variable, got {:?}", other),
        }
    }
}

#[test]
fn test_rte_lookup_by_alias() {
    let query = two_table_query();
    assert_eq!(query.get_rte_idx("u"), Some(0));
    assert_eq!(query.get_rte_idx("o"), Some(1));
    assert_eq!(query.get_rte_idx("missing"), None);
}

#[test]
fn test_column_lookup_through_rte_cache() {
    let (catalog, users, _) = test_catalog();
    let mut rte = RangeTblEntry::new("u", users);

    let age = rte.get_column_desc(&catalog, "age").unwrap();
    assert_eq!(age.column_type, TypeInfo::plain(SqlType::Int));
    assert_eq!(rte.column_descs.len(), 1);

    // cache hit keeps the descriptor list stable
    rte.get_column_desc(&catalog, "age").unwrap();
    assert_eq!(rte.column_descs.len(), 1);
}

// ============ Cast insertion (parser/planner handshake) ============

#[test]
fn test_comparison_unification_inserts_casts() {
    // u.age = o.total: INT x NUMERIC(12,2) compares as NUMERIC(12,2)
    let query = two_table_query();
    let age = Expr::column_var(TypeInfo::plain(SqlType::Int), query.rangetable[0].table_id(), 2, 0);
    let total = Expr::column_var(TypeInfo::numeric(12, 2), query.rangetable[1].table_id(), 2, 1);

    let (result, new_left, new_right) =
        analyze_type_info(BinaryOp::Eq, age.type_info(), total.type_info()).unwrap();
    assert_eq!(result.kind, SqlType::Boolean);
    assert_eq!(new_left, TypeInfo::numeric(12, 2));
    assert_eq!(new_right, TypeInfo::numeric(12, 2));

    // the caller wraps operands whose type changed
    let cast_age = age.add_cast(&new_left).unwrap();
    assert!(matches!(cast_age, Expr::UOper { .. }));
    let total = total.add_cast(&new_right).unwrap();
    assert!(matches!(total, Expr::ColumnVar { .. }));
}

#[test]
fn test_constant_comparison_folds_instead_of_casting() {
    // age > 5 with unification to NUMERIC: the literal folds, no CAST node
    let (_, new_left, new_right) =
        analyze_type_info(BinaryOp::Gt, &TypeInfo::plain(SqlType::Int), &TypeInfo::numeric(10, 3))
            .unwrap();
    assert_eq!(new_left, TypeInfo::numeric(14, 3));

    let folded = int_const(5).add_cast(&new_right).unwrap();
    match folded {
        Expr::Constant {
            type_info, value, ..
        } => {
            assert_eq!(type_info, TypeInfo::numeric(14, 3));
            assert_eq!(value, Datum::BigInt(5000));
        }
        other => panic!("expected folded constant, got {:?}", other),
    }
}

// ============ Predicate classification ============

#[test]
fn test_group_predicates_partitions_conjuncts() {
    // t1.a = t2.b AND t1.c > 5 AND 1 = 1
    let query = two_table_query();
    let t1 = query.rangetable[0].table_id();
    let t2 = query.rangetable[1].table_id();

    let join_pred = cmp(
        BinaryOp::Eq,
        Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 0, 0),
        Expr::column_var(TypeInfo::plain(SqlType::Int), t2, 1, 1),
    );
    let scan_pred = cmp(
        BinaryOp::Gt,
        Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 2, 0),
        int_const(5),
    );
    let const_pred = cmp(BinaryOp::Eq, int_const(1), int_const(1));

    let predicate = and(
        and(join_pred, scan_pred),
        const_pred,
    );

    let mut scan = Vec::new();
    let mut join = Vec::new();
    let mut constant = Vec::new();
    predicate.group_predicates(&mut scan, &mut join, &mut constant);

    assert_eq!(scan.len(), 1);
    assert_eq!(join.len(), 1);
    assert_eq!(constant.len(), 1);

    let mut rte_set = HashSet::new();
    join[0].collect_rte_idx(&mut rte_set);
    assert_eq!(rte_set.len(), 2);

    let mut rte_set = HashSet::new();
    scan[0].collect_rte_idx(&mut rte_set);
    assert_eq!(rte_set.len(), 1);
}

#[test]
fn test_bare_boolean_column_is_scan_predicate() {
    let query = two_table_query();
    let active = Expr::column_var(
        TypeInfo::plain(SqlType::Boolean),
        query.rangetable[0].table_id(),
        3,
        0,
    );

    let mut scan = Vec::new();
    let mut join = Vec::new();
    let mut constant = Vec::new();
    active.group_predicates(&mut scan, &mut join, &mut constant);
    assert_eq!(scan.len(), 1);
    assert!(join.is_empty());
    assert!(constant.is_empty());
}

#[test]
fn test_disjunction_is_classified_whole() {
    // t1.c > 5 OR t2.b = 1 references two RTEs: one join predicate
    let query = two_table_query();
    let t1 = query.rangetable[0].table_id();
    let t2 = query.rangetable[1].table_id();
    let predicate = Expr::bin_oper(
        TypeInfo::plain(SqlType::Boolean),
        BinaryOp::Or,
        Qualifier::None,
        cmp(
            BinaryOp::Gt,
            Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 2, 0),
            int_const(5),
        ),
        cmp(
            BinaryOp::Eq,
            Expr::column_var(TypeInfo::plain(SqlType::Int), t2, 1, 1),
            int_const(1),
        ),
    );

    let mut scan = Vec::new();
    let mut join = Vec::new();
    let mut constant = Vec::new();
    predicate.group_predicates(&mut scan, &mut join, &mut constant);
    assert!(scan.is_empty());
    assert_eq!(join.len(), 1);
    assert!(constant.is_empty());
}

// ============ Simple-predicate normalization ============

#[test]
fn test_normalize_reversed_simple_predicate() {
    // 5 < u.age normalizes to u.age > 5 against rte 0
    let query = two_table_query();
    let age = Expr::column_var(TypeInfo::plain(SqlType::Int), query.rangetable[0].table_id(), 2, 0);
    let pred = cmp(BinaryOp::Lt, int_const(5), age.deep_copy().unwrap());

    let (normalized, rte_idx) = pred.normalize_simple_predicate().unwrap();
    assert_eq!(rte_idx, 0);
    assert_eq!(normalized, cmp(BinaryOp::Gt, age, int_const(5)));
}

// ============ Target-list rewriting and GROUP BY ============

#[test]
fn test_having_rewrite_against_projection() {
    // SELECT u.id, SUM(o.total) ... GROUP BY u.id HAVING SUM(o.total) > 100
    let query = two_table_query();
    let t1 = query.rangetable[0].table_id();
    let t2 = query.rangetable[1].table_id();

    let group_col = Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 0, 0);
    let sum_total = Expr::AggExpr {
        type_info: TypeInfo::numeric(12, 2),
        kind: AggKind::Sum,
        arg: Some(Box::new(Expr::column_var(TypeInfo::numeric(12, 2), t2, 2, 1))),
        is_distinct: false,
        agg_idx: 0,
    };
    let tlist = vec![
        TargetEntry::new("id", group_col.deep_copy().unwrap()),
        TargetEntry::new("total", sum_total.deep_copy().unwrap()),
    ];

    // SELECT list must be an aggregate or grouped column
    let groupby = vec![group_col.deep_copy().unwrap()];
    for tle in &tlist {
        tle.expr.check_group_by(&groupby).unwrap();
    }

    let having = cmp(
        BinaryOp::Gt,
        Expr::AggExpr {
            type_info: TypeInfo::numeric(12, 2),
            kind: AggKind::Sum,
            arg: None,
            is_distinct: false,
            agg_idx: 0,
        },
        int_const(100),
    );
    let rewritten = having.rewrite_with_targetlist(&tlist).unwrap();
    match rewritten {
        Expr::BinOper { left, .. } => assert_eq!(*left, sum_total),
        other => panic!("expected comparison, got {:?}", other),
    }
}

#[test]
fn test_group_by_violation_surfaces() {
    let query = two_table_query();
    let t1 = query.rangetable[0].table_id();

    let grouped = Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 0, 0);
    let ungrouped = Expr::column_var(TypeInfo::plain(SqlType::Int), t1, 2, 0);
    let groupby = vec![grouped];

    assert!(ungrouped.check_group_by(&groupby).is_err());
}

// ============ Query bookkeeping ============

#[test]
fn test_order_by_limit_and_aggregate_bookkeeping() {
    // SELECT DISTINCT ... ORDER BY 1 DESC LIMIT 10 OFFSET 5
    let mut query = two_table_query();
    query.is_distinct = true;
    query.order_by = Some(vec![OrderEntry {
        tle_idx: 0,
        is_desc: true,
        nulls_first: false,
    }]);
    query.limit = Some(10);
    query.offset = 5;
    query.num_aggs = 0;

    let order = query.order_by.as_ref().unwrap();
    assert_eq!(order[0].tle_idx, 0);
    assert!(order[0].is_desc);
    assert!(query.is_distinct);
    assert_eq!(query.limit, Some(10));
    assert_eq!(query.offset, 5);
}

// ============ Query chaining ============

#[test]
fn test_set_operation_chains_queries() {
    let mut first = two_table_query();
    let second = two_table_query();
    first.next_query = Some(Box::new(second));

    let next = first.next_query.as_ref().unwrap();
    assert_eq!(next.targetlist.len(), first.targetlist.len());
    assert!(next.next_query.is_none());
}
