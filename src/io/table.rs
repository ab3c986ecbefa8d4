use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::info;

use super::coercion::{Coerced, coerce_numeric};
use crate::analysis::CorrelationTable;
use crate::domain::columns::{ADJUSTED_LTV, MARKET_SCORE, REGION, REQUIRED_FEATURES};
use crate::domain::{Dataset, Diagnostic, DiagnosticKind, Record};
use crate::errors::{ScoringError, read_context, write_context};

/// Untyped rows exactly as read from disk
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Result<usize, ScoringError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ScoringError::missing_column(column))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tab for `.tsv`/`.tab` files, comma otherwise
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .flexible(true)
        .from_path(path)
        .with_context(|| read_context(path))?;

    let headers = reader
        .headers()
        .with_context(|| read_context(path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| read_context(path))?;

    info!("Read {} rows from {}", rows.len(), path.display());
    Ok(RawTable { headers, rows })
}

/// Load the numeric columns of a table, keyed by region.
///
/// Text-only columns (a city name, a metro label) are skipped. Scoring
/// features and derived columns are always loaded, so bad cells there are
/// coerced with a diagnostic instead of silently dropping the column.
pub fn read_dataset(path: &Path, strict: bool) -> Result<(Dataset, Vec<Diagnostic>)> {
    let table = read_raw_table(path)?;
    let columns = numeric_columns(&table);

    dataset_from_table(&table, &columns, strict)
        .with_context(|| format!("Failed to load dataset from {}", path.display()))
}

fn numeric_columns(table: &RawTable) -> Vec<String> {
    let mut columns = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        if header == REGION {
            continue;
        }
        if !always_numeric(header) && is_text_column(table, idx) {
            info!("Skipping non-numeric column {header}");
            continue;
        }
        columns.push(header.clone());
    }
    columns
}

fn always_numeric(column: &str) -> bool {
    REQUIRED_FEATURES.iter().any(|f| *f == column) || column == MARKET_SCORE || column == ADJUSTED_LTV
}

/// Some text and not a single numeric cell
fn is_text_column(table: &RawTable, idx: usize) -> bool {
    let mut saw_text = false;
    for row in &table.rows {
        match coerce_numeric(row.get(idx).unwrap_or_default()) {
            Coerced::Value(_) => return false,
            Coerced::Invalid => saw_text = true,
            Coerced::Null => {}
        }
    }
    saw_text
}

/// Build records from `columns` of a raw table, keyed by the region column.
///
/// Unparseable cells become `NaN` with an `InvalidValue` diagnostic, or
/// abort when `strict` is set.
pub fn dataset_from_table(
    table: &RawTable,
    columns: &[String],
    strict: bool,
) -> Result<(Dataset, Vec<Diagnostic>), ScoringError> {
    let region_idx = table.column_index(REGION)?;
    let indices = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut dataset = Dataset::new(columns.to_vec());
    let mut diagnostics = Vec::new();

    for row in &table.rows {
        let region = row.get(region_idx).unwrap_or_default().trim();
        let mut record = Record::new(region);

        for (column, &idx) in columns.iter().zip(&indices) {
            let raw = row.get(idx).unwrap_or_default();
            let coerced = coerce_numeric(raw);
            if coerced == Coerced::Invalid {
                if strict {
                    return Err(ScoringError::invalid_value(column, region, raw));
                }
                diagnostics.push(Diagnostic::record(
                    DiagnosticKind::InvalidValue,
                    column,
                    region,
                    format!("'{raw}' is not numeric, coerced to null"),
                ));
            }
            record.set(column, coerced.or_nan());
        }

        dataset.push(record);
    }

    Ok((dataset, diagnostics))
}

pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)
        .with_context(|| write_context(path))?;

    let header = std::iter::once(REGION).chain(dataset.columns().iter().map(String::as_str));
    writer.write_record(header).with_context(|| write_context(path))?;

    for record in dataset.records() {
        let cells = std::iter::once(record.region.clone()).chain(
            dataset
                .columns()
                .iter()
                .map(|c| format_cell(record.value_or_nan(c))),
        );
        writer.write_record(cells).with_context(|| write_context(path))?;
    }

    writer.flush().with_context(|| write_context(path))?;
    info!("Wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

/// `feature,pearson,spearman`, undefined correlations written as `NaN`
pub fn write_correlations(path: &Path, table: &CorrelationTable) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)
        .with_context(|| write_context(path))?;

    writer
        .write_record(["feature", "pearson", "spearman"])
        .with_context(|| write_context(path))?;
    for row in &table.rows {
        writer
            .write_record([
                row.feature.clone(),
                row.pearson.to_string(),
                row.spearman.to_string(),
            ])
            .with_context(|| write_context(path))?;
    }

    writer.flush().with_context(|| write_context(path))?;
    info!("Wrote {} correlations to {}", table.len(), path.display());
    Ok(())
}

fn format_cell(value: f64) -> String {
    if value.is_nan() { String::new() } else { value.to_string() }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(delimiter_for(Path::new("data/raw.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("out.csv")), b',');
        assert_eq!(delimiter_for(Path::new("noext")), b',');
    }

    #[test]
    fn test_invalid_cell_coerced_with_diagnostic() {
        let raw = table(&["REGION", "X"], &[&["94110", "1.5"], &["94016", "oops"]]);
        let (dataset, diagnostics) = dataset_from_table(&raw, &["X".to_string()], false).unwrap();

        assert_eq!(dataset.records()[0].get("X"), Some(1.5));
        assert!(dataset.records()[1].value_or_nan("X").is_nan());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].record.as_deref(), Some("94016"));
    }

    #[test]
    fn test_invalid_cell_fatal_when_strict() {
        let raw = table(&["REGION", "X"], &[&["94016", "oops"]]);
        let err = dataset_from_table(&raw, &["X".to_string()], true).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidValue { column, .. } if column == "X"));
    }

    #[test]
    fn test_missing_region_column() {
        let raw = table(&["ZIP", "X"], &[&["94016", "1"]]);
        let err = dataset_from_table(&raw, &["X".to_string()], false).unwrap_err();
        assert!(matches!(err, ScoringError::MissingColumn { column } if column == REGION));
    }

    #[test]
    fn test_text_columns_skipped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.csv");
        std::fs::write(
            &path,
            "REGION,CITY,EMPTY,SOLD_ABOVE_LIST,MARKET_SCORE\n\
             94110,San Francisco,,0.9,90\n\
             94016,Daly City,,oops,40\n",
        )
        .unwrap();

        let (dataset, diagnostics) = read_dataset(&path, false).unwrap();

        assert_eq!(dataset.columns(), ["EMPTY", "SOLD_ABOVE_LIST", "MARKET_SCORE"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].column, "SOLD_ABOVE_LIST");
    }

    #[test]
    fn test_text_only_feature_is_still_loaded() {
        let raw = table(
            &["REGION", "CITY", "MEDIAN_DOM"],
            &[&["94110", "San Francisco", "n/a days"], &["94016", "Daly City", "soon"]],
        );
        assert_eq!(numeric_columns(&raw), vec!["MEDIAN_DOM".to_string()]);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(80.0), "80");
        assert_eq!(format_cell(0.25), "0.25");
        assert_eq!(format_cell(f64::NAN), "");
    }
}
