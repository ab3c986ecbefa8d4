use thiserror::Error;

/// Structural failures that abort a batch.
///
/// Per-record numeric problems never end up here; they are reported as
/// [`crate::domain::Diagnostic`] values and resolved to safe defaults.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("invalid value '{value}' in column '{column}' for record '{record}'")]
    InvalidValue {
        column: String,
        record: String,
        value: String,
    },

    #[error("invalid weight {weight} for feature '{feature}': weights must be finite and non-negative")]
    InvalidWeight { feature: String, weight: f64 },

    #[error("unknown normalization fallback policy '{0}' (expected 'zero' or 'midpoint')")]
    UnknownFallbackPolicy(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScoringError {
    pub fn missing_column(column: &str) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
        }
    }

    pub fn invalid_value(column: &str, record: &str, value: impl ToString) -> Self {
        Self::InvalidValue {
            column: column.to_string(),
            record: record.to_string(),
            value: value.to_string(),
        }
    }
}

/// Add context to read errors
pub fn read_context(path: &std::path::Path) -> String {
    format!("Failed to read from: {}", path.display())
}

/// Add context to write errors
pub fn write_context(path: &std::path::Path) -> String {
    format!("Failed to write to: {}", path.display())
}
