use std::collections::HashSet;
use std::fmt;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Cleaning steps
// ---------------------------------------------------------------------------

/// One of the canned cleaning operations a user can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningStep {
    RemoveDuplicates,
    FillMissingWithMean,
}

impl fmt::Display for CleaningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningStep::RemoveDuplicates => write!(f, "Duplicates Removed"),
            CleaningStep::FillMissingWithMean => write!(f, "Null Values Replaced With Mean"),
        }
    }
}

/// What one application of a step changed.
#[derive(Debug, Clone, PartialEq)]
pub enum StepReport {
    Deduplicated { removed: usize },
    Filled(Vec<FilledColumn>),
}

impl CleaningStep {
    /// Apply the step to `table` in place.
    pub fn apply(self, table: &mut Table) -> StepReport {
        match self {
            CleaningStep::RemoveDuplicates => StepReport::Deduplicated {
                removed: remove_duplicates(table),
            },
            CleaningStep::FillMissingWithMean => {
                StepReport::Filled(fill_missing_with_mean(table))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Duplicate removal
// ---------------------------------------------------------------------------

/// Drop every row that equals an earlier row in all columns, keeping the
/// first occurrence. Returns the number of rows removed.
pub fn remove_duplicates(table: &mut Table) -> usize {
    let before = table.len();
    let keep: Vec<usize> = {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(before);
        (0..before).filter(|&i| seen.insert(table.row(i))).collect()
    };
    let removed = before - keep.len();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    log::debug!("remove_duplicates: {removed} of {before} rows dropped");
    removed
}

// ---------------------------------------------------------------------------
// Mean imputation
// ---------------------------------------------------------------------------

/// A numeric column whose gaps were filled.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledColumn {
    pub column: String,
    pub mean: f64,
    pub filled: usize,
}

/// Replace missing entries of every numeric column with the mean of that
/// column's present values.
///
/// Filled columns become all-`Float`. A numeric column with no present
/// values has no mean and is left missing. Non-numeric columns are never
/// touched.
pub fn fill_missing_with_mean(table: &mut Table) -> Vec<FilledColumn> {
    let mut report = Vec::new();

    for column in table.columns_mut() {
        if !column.is_numeric() {
            continue;
        }
        let missing = column.missing_count();
        if missing == 0 {
            continue;
        }

        let present: Vec<f64> = column.values.iter().filter_map(CellValue::as_f64).collect();
        if present.is_empty() {
            log::debug!("fill_missing_with_mean: '{}' has no values, left missing", column.name);
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        for value in &mut column.values {
            *value = match value {
                CellValue::Missing => CellValue::Float(mean),
                CellValue::Int(i) => CellValue::Float(*i as f64),
                _ => continue,
            };
        }

        log::debug!(
            "fill_missing_with_mean: '{}' filled {missing} cells with {mean}",
            column.name
        );
        report.push(FilledColumn {
            column: column.name.clone(),
            mean,
            filled: missing,
        });
    }

    report
}
