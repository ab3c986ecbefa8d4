use crate::analysis::summary::quantile;
use crate::domain::Dataset;
use crate::errors::ScoringError;

/// Median of the non-`NaN` values
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut present: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);
    Some(quantile(&present, 0.5))
}

/// Replace nulls with the column median; returns the median used
pub fn fill_with_median(dataset: &mut Dataset, column: &str) -> Result<Option<f64>, ScoringError> {
    dataset.require_column(column)?;
    let Some(fill) = median(dataset.records().iter().map(|r| r.value_or_nan(column))) else {
        return Ok(None);
    };
    fill_missing(dataset, column, fill);
    Ok(Some(fill))
}

/// Replace nulls with 0; returns how many cells were filled
pub fn fill_with_zero(dataset: &mut Dataset, column: &str) -> Result<usize, ScoringError> {
    dataset.require_column(column)?;
    Ok(fill_missing(dataset, column, 0.0))
}

fn fill_missing(dataset: &mut Dataset, column: &str, fill: f64) -> usize {
    let mut filled = 0;
    for record in dataset.records_mut() {
        if record.value_or_nan(column).is_nan() {
            record.set(column, fill);
            filled += 1;
        }
    }
    filled
}

/// "Zip Code: 94110" -> "94110"
pub fn strip_region_prefix(dataset: &mut Dataset, prefix: &str) {
    for record in dataset.records_mut() {
        if let Some(stripped) = record.region.strip_prefix(prefix) {
            record.region = stripped.trim().to_string();
        }
    }
}
