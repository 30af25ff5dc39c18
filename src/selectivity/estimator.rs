use std::fmt;

use serde::Serialize;

use super::mask::{combine, BoolOp, Mask};
use super::predicate::Predicate;
use crate::data::model::Dataset;
use crate::error::{Result, SelectivityError};

/// What to report when the dataset has no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Fail with [`SelectivityError::EmptyDataset`].
    #[default]
    Error,
    /// Report a selectivity of `0.0`.
    Zero,
}

/// Computes selectivities under a fixed [`EmptyPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Estimator {
    pub empty_policy: EmptyPolicy,
}

impl Estimator {
    pub fn new(empty_policy: EmptyPolicy) -> Self {
        Estimator { empty_policy }
    }

    /// Fraction of set rows in `mask`.
    pub fn mask_selectivity(&self, mask: &Mask) -> Result<f64> {
        if mask.is_empty() {
            return match self.empty_policy {
                EmptyPolicy::Error => Err(SelectivityError::EmptyDataset),
                EmptyPolicy::Zero => Ok(0.0),
            };
        }
        Ok(mask.true_count() as f64 / mask.len() as f64)
    }

    /// Fraction of rows of `dataset` satisfying `predicate`.
    pub fn selectivity(&self, dataset: &Dataset, predicate: &Predicate) -> Result<f64> {
        let mask = predicate.evaluate(dataset)?;
        log::debug!(
            "{predicate}: {} of {} rows match",
            mask.true_count(),
            mask.len()
        );
        self.mask_selectivity(&mask)
    }

    /// Selectivity of two named predicates, alone and combined.
    ///
    /// Each predicate is scanned once; the AND and OR figures come from
    /// combining the two masks.
    pub fn report(
        &self,
        dataset: &Dataset,
        (name_a, a): (&str, &Predicate),
        (name_b, b): (&str, &Predicate),
    ) -> Result<SelectivityReport> {
        let mask_a = a.evaluate(dataset)?;
        let mask_b = b.evaluate(dataset)?;
        let mask_and = combine(&mask_a, &mask_b, BoolOp::And)?;
        let mask_or = combine(&mask_a, &mask_b, BoolOp::Or)?;
        log::debug!(
            "{name_a}={}, {name_b}={}, and={}, or={} of {} rows",
            mask_a.true_count(),
            mask_b.true_count(),
            mask_and.true_count(),
            mask_or.true_count(),
            dataset.len()
        );

        let entry = |name: String, mask: &Mask| -> Result<ReportEntry> {
            Ok(ReportEntry {
                selectivity: self.mask_selectivity(mask)?,
                name,
            })
        };
        Ok(SelectivityReport {
            entries: vec![
                entry(name_a.to_string(), &mask_a)?,
                entry(name_b.to_string(), &mask_b)?,
                entry(format!("{name_a} {} {name_b}", BoolOp::And), &mask_and)?,
                entry(format!("{name_a} {} {name_b}", BoolOp::Or), &mask_or)?,
            ],
        })
    }
}

/// [`Estimator::selectivity`] under the default policy.
pub fn selectivity(dataset: &Dataset, predicate: &Predicate) -> Result<f64> {
    Estimator::default().selectivity(dataset, predicate)
}

/// [`Estimator::mask_selectivity`] under the default policy.
pub fn mask_selectivity(mask: &Mask) -> Result<f64> {
    Estimator::default().mask_selectivity(mask)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub selectivity: f64,
}

/// Selectivities of `A`, `B`, `A AND B` and `A OR B`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectivityReport {
    pub entries: Vec<ReportEntry>,
}

impl SelectivityReport {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.selectivity)
    }
}

impl fmt::Display for SelectivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            // `{:?}` keeps the trailing `.0` on whole numbers
            writeln!(
                f,
                "Selectivity of condition {}: {:?}",
                entry.name, entry.selectivity
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::sample_dataset;

    #[test]
    fn empty_mask_follows_policy() {
        let empty = Mask::constant(0, true);
        assert!(matches!(
            mask_selectivity(&empty),
            Err(SelectivityError::EmptyDataset)
        ));
        assert_eq!(
            Estimator::new(EmptyPolicy::Zero)
                .mask_selectivity(&empty)
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn constants_give_bounds() {
        let ds = sample_dataset().unwrap();
        assert_eq!(selectivity(&ds, &Predicate::Const(true)).unwrap(), 1.0);
        assert_eq!(selectivity(&ds, &Predicate::Const(false)).unwrap(), 0.0);
    }

    #[test]
    fn report_formats_like_float_literals() {
        let report = SelectivityReport {
            entries: vec![
                ReportEntry {
                    name: "A".into(),
                    selectivity: 1.0,
                },
                ReportEntry {
                    name: "A OR B".into(),
                    selectivity: 0.25,
                },
            ],
        };
        assert_eq!(
            report.to_string(),
            "Selectivity of condition A: 1.0\nSelectivity of condition A OR B: 0.25\n"
        );
        assert_eq!(report.get("A OR B"), Some(0.25));
        assert_eq!(report.get("B"), None);
    }

    #[test]
    fn report_serializes_entries() {
        let report = SelectivityReport {
            entries: vec![ReportEntry {
                name: "A".into(),
                selectivity: 0.5,
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"entries":[{"name":"A","selectivity":0.5}]}"#);
    }
}
