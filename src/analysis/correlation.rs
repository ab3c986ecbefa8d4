use log::info;
use ndarray::{Array1, ArrayView1};
use serde::Serialize;

use super::ranks::average_ranks;
use crate::domain::{Dataset, Diagnostic, DiagnosticKind};
use crate::errors::ScoringError;

/// Linear and rank correlation of one feature against the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub feature: String,
    pub pearson: f64,
    pub spearman: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationTable {
    pub target: String,
    pub rows: Vec<CorrelationRow>,
}

impl CorrelationTable {
    pub fn get(&self, feature: &str) -> Option<&CorrelationRow> {
        self.rows.iter().find(|row| row.feature == feature)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Correlate every numeric column except `target` against `target`.
///
/// Rows with a `NaN` on either side are dropped pairwise. Zero-variance
/// columns yield `NaN` and an `UndefinedCorrelation` diagnostic.
pub fn analyze_correlations(
    dataset: &Dataset,
    target: &str,
) -> Result<(CorrelationTable, Vec<Diagnostic>), ScoringError> {
    let target_values = dataset.column_values(target)?;
    info!(
        "Correlating {} columns against {target}",
        dataset.columns().len().saturating_sub(1)
    );

    let mut rows = Vec::new();
    let mut diagnostics = Vec::new();

    for feature in dataset.columns().iter().filter(|c| *c != target) {
        let values = dataset.column_values(feature)?;
        let (x, y) = complete_pairs(values.view(), target_values.view());

        let row = CorrelationRow {
            feature: feature.clone(),
            pearson: pearson(x.view(), y.view()),
            spearman: spearman(x.view(), y.view()),
        };

        if row.pearson.is_nan() || row.spearman.is_nan() {
            diagnostics.push(Diagnostic::column(
                DiagnosticKind::UndefinedCorrelation,
                feature,
                format!("zero variance or fewer than two complete pairs against {target}"),
            ));
        }
        rows.push(row);
    }

    let table = CorrelationTable {
        target: target.to_string(),
        rows,
    };
    Ok((table, diagnostics))
}

/// Pearson product-moment correlation, `NaN` when either side is constant
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let dx = centered(x);
    let dy = centered(y);
    let var_x = dx.dot(&dx);
    let var_y = dy.dot(&dy);

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }

    let r = dx.dot(&dy) / (var_x * var_y).sqrt();
    r.clamp(-1.0, 1.0)
}

/// Spearman rank correlation: Pearson over average ranks
pub fn spearman(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let rx = Array1::from(average_ranks(&x.to_vec()));
    let ry = Array1::from(average_ranks(&y.to_vec()));
    pearson(rx.view(), ry.view())
}

fn centered(values: ArrayView1<f64>) -> Array1<f64> {
    let mean = values.mean().unwrap_or(0.0);
    values.mapv(|v| v - mean)
}

/// Keep only the positions where both sides are present
pub fn complete_pairs(x: ArrayView1<f64>, y: ArrayView1<f64>) -> (Array1<f64>, Array1<f64>) {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .map(|(&a, &b)| (a, b))
        .unzip();
    (Array1::from(xs), Array1::from(ys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use ndarray::array;

    #[test]
    fn test_self_correlation_is_one() {
        let x = array![0.3, 1.7, -2.2, 5.1, 0.9, 0.9];
        assert_eq!(pearson(x.view(), x.view()), 1.0);
        assert_eq!(spearman(x.view(), x.view()), 1.0);
    }

    #[test]
    fn test_perfect_negative() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![8.0, 6.0, 4.0, 2.0];
        assert!((pearson(x.view(), y.view()) + 1.0).abs() < 1e-12);
        assert!((spearman(x.view(), y.view()) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_monotone_nonlinear() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = x.mapv(|v: f64| v.powi(3));
        assert!((spearman(x.view(), y.view()) - 1.0).abs() < 1e-12);
        assert!(pearson(x.view(), y.view()) < 1.0);
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let x = array![2.0, 2.0, 2.0];
        let y = array![1.0, 2.0, 3.0];
        assert!(pearson(x.view(), y.view()).is_nan());
        assert!(spearman(x.view(), y.view()).is_nan());
    }

    #[test]
    fn test_known_pearson_value() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![2.0, 4.0, 5.0, 4.0, 5.0];
        // cov = 6, var_x = 10, var_y = 6
        let expected = 6.0 / (60.0_f64).sqrt();
        assert!((pearson(x.view(), y.view()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_reports_each_column_and_flags_constant() {
        let records = (0..5_i32)
            .map(|i| {
                let v = f64::from(i);
                Record::new(format!("z{i}"))
                    .with("MARKET_SCORE", v * 10.0)
                    .with("LINEAR", v)
                    .with("CONSTANT", 1.0)
            })
            .collect();
        let dataset = Dataset::from_records(
            vec!["LINEAR".to_string(), "CONSTANT".to_string(), "MARKET_SCORE".to_string()],
            records,
        );

        let (table, diagnostics) = analyze_correlations(&dataset, "MARKET_SCORE").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].feature, "LINEAR");
        assert!((table.get("LINEAR").unwrap().pearson - 1.0).abs() < 1e-12);
        assert!(table.get("CONSTANT").unwrap().pearson.is_nan());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UndefinedCorrelation);
        assert_eq!(diagnostics[0].column, "CONSTANT");
    }

    #[test]
    fn test_missing_values_dropped_pairwise() {
        let dataset = Dataset::from_records(
            vec!["X".to_string(), "T".to_string()],
            vec![
                Record::new("a").with("X", 1.0).with("T", 1.0),
                Record::new("b").with("X", f64::NAN).with("T", 100.0),
                Record::new("c").with("X", 2.0).with("T", 2.0),
                Record::new("d").with("X", 3.0).with("T", 3.0),
            ],
        );
        let (table, diagnostics) = analyze_correlations(&dataset, "T").unwrap();
        assert!((table.get("X").unwrap().pearson - 1.0).abs() < 1e-12);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_target_is_error() {
        let dataset = Dataset::new(vec!["X".to_string()]);
        assert!(analyze_correlations(&dataset, "MARKET_SCORE").is_err());
    }
}
