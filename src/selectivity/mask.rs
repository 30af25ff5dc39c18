use std::fmt;

use arrow::array::BooleanArray;
use arrow::compute::kernels::boolean;

use crate::data::model::{Dataset, Row};
use crate::error::{Result, SelectivityError};

/// Element-wise operator for [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
        }
    }
}

/// One boolean per dataset row, `true` where the predicate holds.
///
/// Backed by a null-free Arrow [`BooleanArray`] so combination runs through
/// the Arrow boolean kernels.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    bits: BooleanArray,
}

impl Mask {
    pub fn from_bools(bits: Vec<bool>) -> Self {
        Mask {
            bits: BooleanArray::from(bits),
        }
    }

    /// Evaluate a row function once per dataset row.
    pub fn from_fn<F>(dataset: &Dataset, f: F) -> Self
    where
        F: Fn(&Row) -> bool,
    {
        Mask {
            bits: dataset.rows().iter().map(|row| Some(f(row))).collect(),
        }
    }

    /// A mask with every row set to `value`.
    pub fn constant(len: usize, value: bool) -> Self {
        Self::from_bools(vec![value; len])
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of rows where the mask is set.
    pub fn true_count(&self) -> usize {
        self.bits.true_count()
    }

    pub fn get(&self, row: usize) -> Option<bool> {
        (row < self.len()).then(|| self.bits.value(row))
    }

    pub fn not(&self) -> Result<Mask> {
        Ok(Mask {
            bits: boolean::not(&self.bits)?,
        })
    }

    pub fn as_array(&self) -> &BooleanArray {
        &self.bits
    }
}

/// Combine two row-aligned masks element-wise.
pub fn combine(a: &Mask, b: &Mask, op: BoolOp) -> Result<Mask> {
    if a.len() != b.len() {
        return Err(SelectivityError::MaskLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let bits = match op {
        BoolOp::And => boolean::and(&a.bits, &b.bits)?,
        BoolOp::Or => boolean::or(&a.bits, &b.bits)?,
    };
    Ok(Mask { bits })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_or() {
        let a = Mask::from_bools(vec![true, true, false, false]);
        let b = Mask::from_bools(vec![true, false, true, false]);

        let and = combine(&a, &b, BoolOp::And).unwrap();
        let or = combine(&a, &b, BoolOp::Or).unwrap();
        assert_eq!(and, Mask::from_bools(vec![true, false, false, false]));
        assert_eq!(or, Mask::from_bools(vec![true, true, true, false]));
        assert_eq!(and.true_count(), 1);
        assert_eq!(or.true_count(), 3);
    }

    #[test]
    fn combine_rejects_misaligned_masks() {
        let a = Mask::from_bools(vec![true; 3]);
        let b = Mask::from_bools(vec![true; 4]);
        let err = combine(&a, &b, BoolOp::Or).unwrap_err();
        assert!(matches!(
            err,
            SelectivityError::MaskLengthMismatch { left: 3, right: 4 }
        ));
    }

    #[test]
    fn not_flips_every_row() {
        let m = Mask::from_bools(vec![true, false, false]).not().unwrap();
        assert_eq!(m, Mask::from_bools(vec![false, true, true]));
    }

    #[test]
    fn from_fn_follows_row_order() {
        let ds = Dataset::from_columns(vec![("A", vec![3i64, 1, 2])]).unwrap();
        let m = Mask::from_fn(&ds, |row| row.get("A").and_then(|v| v.as_f64()) > Some(1.5));
        assert_eq!(m.get(0), Some(true));
        assert_eq!(m.get(1), Some(false));
        assert_eq!(m.get(2), Some(true));
        assert_eq!(m.get(3), None);
    }

    #[test]
    fn empty_masks_combine() {
        let a = Mask::constant(0, true);
        let and = combine(&a, &a, BoolOp::And).unwrap();
        assert!(and.is_empty());
        assert_eq!(and.true_count(), 0);
    }
}
