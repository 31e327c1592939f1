//! Result tables produced by evaluating a query subtree.

use crate::error::{Error, Result};
use crate::row::Row;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Lifecycle of a result table.
///
/// A blank table handed out by a cache starts as `Uncomputed`. Only the
/// operator that fills it marks it `Computed`, so a computed table with zero
/// rows is distinguishable from a slot nobody has filled yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResultStatus {
    #[default]
    Uncomputed,
    Computed,
}

/// Output of one query subtree: column bindings plus rows.
///
/// Rows sit behind an `Arc`, so cloning a table out of a cache shares its
/// rows instead of copying them. Appending to a shared table copies the rows
/// first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Arc<Vec<Row>>,
    sorted_by: Option<usize>,
    status: ResultStatus,
}

impl ResultTable {
    /// Creates an empty, uncomputed table with the given column bindings.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Creates a computed table from columns and rows.
    pub fn computed(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        table.mark_computed();
        Ok(table)
    }

    /// Appends a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::invalid_operation(format!(
                "row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        Arc::make_mut(&mut self.rows).push(row);
        Ok(())
    }

    /// Column bindings, in row order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column binding.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns true if both tables hold the same row storage.
    pub fn shares_rows(&self, other: &ResultTable) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column the rows are sorted by, if known.
    pub fn sorted_by(&self) -> Option<usize> {
        self.sorted_by
    }

    pub fn set_sorted_by(&mut self, column: Option<usize>) {
        self.sorted_by = column;
    }

    pub fn status(&self) -> ResultStatus {
        self.status
    }

    #[inline]
    pub fn is_computed(&self) -> bool {
        self.status == ResultStatus::Computed
    }

    /// Marks the table as fully computed.
    pub fn mark_computed(&mut self) {
        self.status = ResultStatus::Computed;
    }
}
