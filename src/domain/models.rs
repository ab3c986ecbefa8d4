use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::errors::ScoringError;

/// One row of the batch: a region key plus its numeric features.
///
/// Missing values are stored as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub region: String,
    values: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: f64) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Value of a column, `NaN` when absent
    pub fn value_or_nan(&self, column: &str) -> f64 {
        self.get(column).unwrap_or(f64::NAN)
    }

    pub fn set(&mut self, column: &str, value: f64) {
        self.values.insert(column.to_string(), value);
    }

    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}

/// Ordered batch of records with a stable column order.
///
/// `columns` lists the numeric columns only; the region key is implicit
/// and always written first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn require_column(&self, column: &str) -> Result<(), ScoringError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ScoringError::missing_column(column))
        }
    }

    /// Append a column name if not yet present
    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    /// All values of one column in record order, `NaN` where missing
    pub fn column_values(&self, column: &str) -> Result<Array1<f64>, ScoringError> {
        self.require_column(column)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.value_or_nan(column))
            .collect())
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.region.as_str())
    }

    /// Apply a record transformation independently to every record
    pub fn map_records<F>(self, f: F) -> Self
    where
        F: FnMut(Record) -> Record,
    {
        Self {
            columns: self.columns,
            records: self.records.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_missing_value_is_nan() {
        let record = Record::new("94110").with("MEDIAN_DOM", 12.0);
        assert_eq!(record.get("MEDIAN_DOM"), Some(12.0));
        assert!(record.value_or_nan("INVENTORY").is_nan());
    }

    #[test]
    fn test_add_column_keeps_order_and_skips_duplicates() {
        let mut dataset = Dataset::new(vec!["A".to_string(), "B".to_string()]);
        dataset.add_column("C");
        dataset.add_column("A");
        assert_eq!(dataset.columns(), ["A", "B", "C"]);
    }

    #[test]
    fn test_column_values_requires_column() {
        let dataset = Dataset::new(vec!["A".to_string()]);
        let err = dataset.column_values("B").unwrap_err();
        assert!(matches!(err, ScoringError::MissingColumn { column } if column == "B"));
    }

    #[test]
    fn test_column_values_in_record_order() {
        let dataset = Dataset::from_records(
            vec!["A".to_string()],
            vec![
                Record::new("1").with("A", 3.0),
                Record::new("2"),
                Record::new("3").with("A", 1.0),
            ],
        );
        let values = dataset.column_values("A").unwrap();
        assert_eq!(values[0], 3.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 1.0);
    }
}
