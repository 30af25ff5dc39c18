//! Predicate selectivity estimation over tabular datasets.

pub mod data;
pub mod error;
pub mod selectivity;

pub use data::model::{Dataset, Row, Value, ValueType};
pub use error::{Result, SelectivityError};
