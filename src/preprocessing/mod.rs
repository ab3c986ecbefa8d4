pub mod cleaning;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info};

use crate::config::PreprocessingSettings;
use crate::domain::columns::{PERIOD_BEGIN, PERIOD_END, REGION, STATE_CODE};
use crate::domain::{Dataset, Diagnostic};
use crate::errors::ScoringError;
use crate::io::{RawTable, dataset_from_table};

/// Cleaned batch ready for scoring
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub dataset: Dataset,
    pub diagnostics: Vec<Diagnostic>,
    pub rows_read: usize,
}

/// Turns a raw market-tracker export into a scoring batch
pub struct Preprocessor {
    settings: PreprocessingSettings,
}

impl Preprocessor {
    pub fn new(settings: PreprocessingSettings) -> Self {
        Self { settings }
    }

    pub fn run(&self, table: &RawTable) -> Result<PreprocessOutcome, ScoringError> {
        // Step 1: Keep the requested state and reporting period
        let filtered = self.filter_rows(table)?;
        info!(
            "  → Kept {} of {} rows for {} between {} and {}",
            filtered.len(),
            table.len(),
            self.settings.state_code,
            self.settings.period_begin,
            self.settings.period_end
        );

        // Step 2: Select useful columns, coerce to numbers
        let (mut dataset, diagnostics) =
            dataset_from_table(&filtered, &self.value_columns(), self.settings.strict)?;

        // Step 3: Impute gaps
        self.impute(&mut dataset)?;

        // Step 4: Clean region keys
        cleaning::strip_region_prefix(&mut dataset, &self.settings.region_prefix);

        Ok(PreprocessOutcome {
            dataset,
            diagnostics,
            rows_read: table.len(),
        })
    }

    fn value_columns(&self) -> Vec<String> {
        self.settings
            .useful_columns
            .iter()
            .filter(|c| c.as_str() != REGION)
            .cloned()
            .collect()
    }

    fn filter_rows(&self, table: &RawTable) -> Result<RawTable, ScoringError> {
        let begin_idx = table.column_index(PERIOD_BEGIN)?;
        let end_idx = table.column_index(PERIOD_END)?;
        let state_idx = table.column_index(STATE_CODE)?;
        let region_idx = table.column_index(REGION)?;

        let mut rows = Vec::new();
        for row in &table.rows {
            let region = cell(row, region_idx);
            let begin = parse_period_date(cell(row, begin_idx))
                .ok_or_else(|| ScoringError::invalid_value(PERIOD_BEGIN, region, cell(row, begin_idx)))?;
            let end = parse_period_date(cell(row, end_idx))
                .ok_or_else(|| ScoringError::invalid_value(PERIOD_END, region, cell(row, end_idx)))?;

            if self.in_period(begin, end) && self.in_state(cell(row, state_idx)) {
                rows.push(row.clone());
            }
        }

        Ok(RawTable {
            headers: table.headers.clone(),
            rows,
        })
    }

    fn in_period(&self, begin: NaiveDate, end: NaiveDate) -> bool {
        begin >= self.settings.period_begin && end <= self.settings.period_end
    }

    fn in_state(&self, state_code: &str) -> bool {
        state_code.trim().eq_ignore_ascii_case(&self.settings.state_code)
    }

    fn impute(&self, dataset: &mut Dataset) -> Result<(), ScoringError> {
        for column in &self.settings.continuous_columns {
            if let Some(fill) = cleaning::fill_with_median(dataset, column)? {
                debug!("Imputed {column} gaps with median {fill}");
            }
        }
        for column in &self.settings.zero_fill_columns {
            let filled = cleaning::fill_with_zero(dataset, column)?;
            debug!("Zero-filled {filled} {column} gaps");
        }
        Ok(())
    }
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or_default().trim()
}

fn parse_period_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    None
}
