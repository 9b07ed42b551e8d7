//! Query tree and range-table bookkeeping
//!
//! A `Query` owns its projection, range table, and predicate trees
//! outright; dropping the query releases the whole analysis result.
//! Range-table entries cache the column descriptors they have resolved so
//! repeated lookups stay off the catalog.

use crate::analyzer::expr::Expr;
use crate::catalog::{CatalogReader, ColumnDescriptor, TableDescriptor, TableId};

/// One output column of a query: its name and the projected expression
#[derive(Debug, PartialEq)]
pub struct TargetEntry {
    pub name: String,
    pub expr: Expr,
}

impl TargetEntry {
    /// Create a new target entry
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// ORDER BY item, referencing a target-list slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderEntry {
    pub tle_idx: usize,
    pub is_desc: bool,
    pub nulls_first: bool,
}

/// Range-table entry: binds a range variable (table alias) to a catalog
/// table, or to a view's sub-query
#[derive(Debug, PartialEq)]
pub struct RangeTblEntry {
    pub rangevar: String,
    pub table_desc: TableDescriptor,
    /// Column descriptors resolved so far, in resolution order
    pub column_descs: Vec<ColumnDescriptor>,
    pub view_query: Option<Query>,
}

impl RangeTblEntry {
    /// Create an entry binding `rangevar` to a base table
    pub fn new(rangevar: impl Into<String>, table_desc: TableDescriptor) -> Self {
        Self {
            rangevar: rangevar.into(),
            table_desc,
            column_descs: Vec::new(),
            view_query: None,
        }
    }

    /// The bound table's id
    pub fn table_id(&self) -> TableId {
        self.table_desc.table_id
    }

    /// Fill the descriptor cache with every column of the table
    pub fn add_all_column_descs(&mut self, catalog: &dyn CatalogReader) {
        self.column_descs = catalog.get_all_columns(self.table_id());
    }

    /// Append one target entry per table column to `tlist` (SELECT *)
    pub fn expand_star_in_targetlist(
        &mut self,
        catalog: &dyn CatalogReader,
        tlist: &mut Vec<TargetEntry>,
        rte_idx: usize,
    ) {
        self.column_descs = catalog.get_all_columns(self.table_id());
        for cd in &self.column_descs {
            let cv = Expr::column_var(cd.column_type, self.table_id(), cd.column_id, rte_idx);
            tlist.push(TargetEntry::new(cd.column_name.clone(), cv));
        }
        tracing::debug!(
            rangevar = %self.rangevar,
            columns = self.column_descs.len(),
            "expanded star into targetlist"
        );
    }

    /// Look up a column by name, consulting the cache first
    ///
    /// A catalog hit is appended to the cache before it is returned.
    pub fn get_column_desc(
        &mut self,
        catalog: &dyn CatalogReader,
        name: &str,
    ) -> Option<&ColumnDescriptor> {
        if let Some(pos) = self
            .column_descs
            .iter()
            .position(|cd| cd.column_name == name)
        {
            return Some(&self.column_descs[pos]);
        }
        if let Some(cd) = catalog.get_column(self.table_id(), name) {
            self.column_descs.push(cd);
            return self.column_descs.last();
        }
        None
    }
}

/// A fully analyzed query: projection, range table, predicates, grouping,
/// ordering, and an optional chained set-operation query
#[derive(Debug, Default, PartialEq)]
pub struct Query {
    pub is_distinct: bool,
    pub targetlist: Vec<TargetEntry>,
    pub rangetable: Vec<RangeTblEntry>,
    pub where_predicate: Option<Expr>,
    pub group_by: Option<Vec<Expr>>,
    pub having_predicate: Option<Expr>,
    pub order_by: Option<Vec<OrderEntry>>,
    pub next_query: Option<Box<Query>>,
    pub limit: Option<u64>,
    pub offset: u64,
    /// Number of aggregate expressions in the target list and HAVING clause
    pub num_aggs: usize,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a range-table entry, returning its index
    pub fn add_rte(&mut self, rte: RangeTblEntry) -> usize {
        self.rangetable.push(rte);
        self.rangetable.len() - 1
    }

    /// Find the range-table index bound to `name`
    pub fn get_rte_idx(&self, name: &str) -> Option<usize> {
        self.rangetable.iter().position(|rte| rte.rangevar == name)
    }
}
