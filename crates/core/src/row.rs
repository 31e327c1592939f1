//! Result rows.

use crate::value::Value;
use alloc::vec::Vec;

/// A row of a result table, one value per column binding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from its values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Gets the value at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value at the given column index.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
            true
        } else {
            false
        }
    }

    /// Appends a value, widening the row by one column.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns the number of values in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
