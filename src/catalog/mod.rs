//! Catalog - schema metadata consumed by the analyzer
//!
//! Type descriptors (`SqlType`, `TypeInfo`), table and column descriptors,
//! and the narrow read-only lookup interface (`CatalogReader`) the analyzer
//! uses to resolve columns. An in-memory `Catalog` implementation is
//! provided for tests and embedding front-ends; production catalogs live
//! behind the same trait.

use std::collections::HashMap;
use std::fmt;

/// Table identifier assigned by the catalog
pub type TableId = i32;

/// Column identifier, 0-based within a table
pub type ColumnId = i32;

/// SQL type kinds supported by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// Boolean (true/false)
    Boolean,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Fixed-point decimal (precision, scale)
    Numeric,
    /// Fixed-point decimal, NUMERIC synonym with distinct declaration syntax
    Decimal,
    /// Fixed-length string
    Char,
    /// Variable-length string with max length
    Varchar,
    /// Unlimited text
    Text,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time
    Timestamp,
}

impl SqlType {
    /// Check if this type is numeric
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            SqlType::SmallInt
                | SqlType::Int
                | SqlType::BigInt
                | SqlType::Float
                | SqlType::Double
                | SqlType::Numeric
                | SqlType::Decimal
        )
    }

    /// Check if this type is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, SqlType::SmallInt | SqlType::Int | SqlType::BigInt)
    }

    /// Check if this type is fixed-point (NUMERIC/DECIMAL)
    pub fn is_fixed_point(&self) -> bool {
        matches!(self, SqlType::Numeric | SqlType::Decimal)
    }

    /// Check if this type is a string type
    pub fn is_string(&self) -> bool {
        matches!(self, SqlType::Char | SqlType::Varchar | SqlType::Text)
    }
}

/// Full type descriptor: kind plus precision/length and scale
///
/// `dimension` is the precision for NUMERIC/DECIMAL and the maximum length
/// for string types; `scale` is the count of fractional digits for
/// NUMERIC/DECIMAL. Both are zero for all other kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub kind: SqlType,
    pub dimension: i32,
    pub scale: i32,
}

impl TypeInfo {
    /// Create a type descriptor with explicit dimension and scale
    pub fn new(kind: SqlType, dimension: i32, scale: i32) -> Self {
        Self {
            kind,
            dimension,
            scale,
        }
    }

    /// Create a type descriptor with no dimension or scale
    pub fn plain(kind: SqlType) -> Self {
        Self::new(kind, 0, 0)
    }

    /// NUMERIC with the given precision and scale
    pub fn numeric(dimension: i32, scale: i32) -> Self {
        Self::new(SqlType::Numeric, dimension, scale)
    }

    /// VARCHAR with the given maximum length
    pub fn varchar(len: i32) -> Self {
        Self::new(SqlType::Varchar, len, 0)
    }

    /// CHAR with the given length
    pub fn char(len: i32) -> Self {
        Self::new(SqlType::Char, len, 0)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SqlType::Boolean => write!(f, "BOOLEAN"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Int => write!(f, "INT"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::Double => write!(f, "DOUBLE"),
            SqlType::Numeric => write!(f, "NUMERIC({},{})", self.dimension, self.scale),
            SqlType::Decimal => write!(f, "DECIMAL({},{})", self.dimension, self.scale),
            SqlType::Char => write!(f, "CHAR({})", self.dimension),
            SqlType::Varchar => write!(f, "VARCHAR({})", self.dimension),
            SqlType::Text => write!(f, "TEXT"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Table descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub table_id: TableId,
    pub table_name: String,
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub column_id: ColumnId,
    pub column_name: String,
    pub column_type: TypeInfo,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(column_id: ColumnId, column_name: impl Into<String>, column_type: TypeInfo) -> Self {
        Self {
            column_id,
            column_name: column_name.into(),
            column_type,
        }
    }
}

/// Read-only catalog lookup interface consumed by the analyzer
///
/// Descriptors are returned by value; the analyzer never mutates the
/// catalog.
pub trait CatalogReader {
    /// All column descriptors of a table, in column order
    fn get_all_columns(&self, table_id: TableId) -> Vec<ColumnDescriptor>;

    /// Look up a single column by name
    fn get_column(&self, table_id: TableId, name: &str) -> Option<ColumnDescriptor>;
}

/// In-memory catalog - stores schema metadata
#[derive(Debug, Default)]
pub struct Catalog {
    /// Tables by id
    tables: HashMap<TableId, TableEntry>,
    /// Table ids by name
    names: HashMap<String, TableId>,
    next_table_id: TableId,
}

#[derive(Debug)]
struct TableEntry {
    desc: TableDescriptor,
    columns: Vec<ColumnDescriptor>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from (name, type) column pairs, returning its descriptor
    ///
    /// Column ids are assigned in declaration order, starting at 0.
    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        columns: Vec<(&str, TypeInfo)>,
    ) -> TableDescriptor {
        let name = name.into();
        let table_id = self.next_table_id;
        self.next_table_id += 1;

        let desc = TableDescriptor {
            table_id,
            table_name: name.clone(),
        };
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, (col_name, col_type))| {
                ColumnDescriptor::new(i as ColumnId, col_name, col_type)
            })
            .collect();

        self.names.insert(name, table_id);
        self.tables.insert(
            table_id,
            TableEntry {
                desc: desc.clone(),
                columns,
            },
        );
        desc
    }

    /// Get a table descriptor by name
    pub fn get_table(&self, name: &str) -> Option<&TableDescriptor> {
        self.names
            .get(name)
            .and_then(|id| self.tables.get(id))
            .map(|entry| &entry.desc)
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }
}

impl CatalogReader for Catalog {
    fn get_all_columns(&self, table_id: TableId) -> Vec<ColumnDescriptor> {
        self.tables
            .get(&table_id)
            .map(|entry| entry.columns.clone())
            .unwrap_or_default()
    }

    fn get_column(&self, table_id: TableId, name: &str) -> Option<ColumnDescriptor> {
        self.tables
            .get(&table_id)?
            .columns
            .iter()
            .find(|c| c.column_name == name)
            .cloned()
    }
}
