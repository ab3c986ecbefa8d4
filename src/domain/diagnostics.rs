use std::fmt;

use log::warn;
use serde::Serialize;

/// Non-fatal conditions raised while processing a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Feature had `max == min` over the batch; fallback value applied
    DegenerateNormalization,
    /// Zero-variance column; correlation reported as `NaN`
    UndefinedCorrelation,
    /// Weighted sum was not finite; score resolved to the safe default
    NonFiniteScore,
    /// Non-numeric cell coerced to null
    InvalidValue,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticKind::DegenerateNormalization => "degenerate_normalization",
            DiagnosticKind::UndefinedCorrelation => "undefined_correlation",
            DiagnosticKind::NonFiniteScore => "non_finite_score",
            DiagnosticKind::InvalidValue => "invalid_value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub column: String,
    /// Region key of the offending record, `None` for column-level issues
    pub record: Option<String>,
    pub detail: String,
}

impl Diagnostic {
    pub fn column(kind: DiagnosticKind, column: &str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            column: column.to_string(),
            record: None,
            detail: detail.into(),
        }
    }

    pub fn record(
        kind: DiagnosticKind,
        column: &str,
        record: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            column: column.to_string(),
            record: Some(record.to_string()),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(record) => write!(
                f,
                "[{}] column '{}', record '{}': {}",
                self.kind.as_str(),
                self.column,
                record,
                self.detail
            ),
            None => write!(
                f,
                "[{}] column '{}': {}",
                self.kind.as_str(),
                self.column,
                self.detail
            ),
        }
    }
}

/// Log every diagnostic as a warning, collapsing long runs of one kind
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    const MAX_LOGGED: usize = 20;

    for diagnostic in diagnostics.iter().take(MAX_LOGGED) {
        warn!("{}", diagnostic);
    }

    if diagnostics.len() > MAX_LOGGED {
        warn!("... and {} more diagnostics", diagnostics.len() - MAX_LOGGED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_record_when_present() {
        let diagnostic = Diagnostic::record(
            DiagnosticKind::NonFiniteScore,
            "MEDIAN_DOM",
            "90210",
            "value is NaN",
        );
        assert_eq!(
            diagnostic.to_string(),
            "[non_finite_score] column 'MEDIAN_DOM', record '90210': value is NaN"
        );
    }

    #[test]
    fn test_display_column_level() {
        let diagnostic = Diagnostic::column(
            DiagnosticKind::DegenerateNormalization,
            "SOLD_ABOVE_LIST",
            "min == max == 0.5",
        );
        assert!(diagnostic.to_string().starts_with("[degenerate_normalization]"));
    }
}
