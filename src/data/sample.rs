use super::model::Dataset;
use crate::error::Result;

/// The ten-row toy table the estimator reports on when no input file is
/// given.
pub fn sample_dataset() -> Result<Dataset> {
    Dataset::from_columns(vec![
        ("A", (1..=10).collect::<Vec<i64>>()),
        ("B", vec![5, 5, 6, 6, 7, 7, 8, 8, 9, 10]),
    ])
}
