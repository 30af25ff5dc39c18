//! Predicate evaluation and selectivity estimation.
//!
//! A [`Predicate`] is evaluated over a dataset in one linear pass into a
//! [`Mask`]; masks combine element-wise and the [`Estimator`] turns a mask
//! into `true_count / len`.

pub mod estimator;
pub mod mask;
pub mod predicate;

pub use estimator::{
    mask_selectivity, selectivity, EmptyPolicy, Estimator, ReportEntry, SelectivityReport,
};
pub use mask::{combine, BoolOp, Mask};
pub use predicate::{CmpOp, Predicate};
