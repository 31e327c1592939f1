//! Sift Core - Core types for the Sift query execution layer.
//!
//! This crate provides the types shared by the cache and the execution context:
//!
//! - `Value`: a single binding in a result row (vocabulary term, literal, or unbound)
//! - `Row`: one row of a result table
//! - `ResultTable`: the output of evaluating a query subtree
//! - `Error`: Error types for cache and execution operations
//!
//! # Example
//!
//! ```rust
//! use sift_core::{ResultTable, Row, Value};
//!
//! let table = ResultTable::computed(
//!     vec!["?person".into(), "?name".into()],
//!     vec![Row::new(vec![Value::Term(1), Value::Text("Alice".into())])],
//! )
//! .unwrap();
//!
//! assert!(table.is_computed());
//! assert_eq!(table.row_count(), 1);
//! assert_eq!(table.column_index("?name"), Some(1));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod result;
mod row;
mod value;

pub use error::{Error, Result};
pub use result::{ResultStatus, ResultTable};
pub use row::Row;
pub use value::{TermId, Value};
