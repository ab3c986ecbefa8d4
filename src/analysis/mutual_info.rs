use std::cmp::Ordering;

use log::info;
use ndarray::{Array1, ArrayView1};
use serde::Serialize;

use super::correlation::complete_pairs;
use crate::domain::Dataset;
use crate::errors::ScoringError;

pub const DEFAULT_NEIGHBORS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub mutual_information: f64,
}

/// Rank `features` by mutual information with `target`, highest first.
///
/// Ties (and `NaN` estimates, which sort last) are ordered by feature name.
pub fn feature_importance(
    dataset: &Dataset,
    features: &[String],
    target: &str,
    neighbors: usize,
) -> Result<Vec<FeatureImportance>, ScoringError> {
    let target_values = dataset.column_values(target)?;
    info!(
        "Estimating mutual information of {} features with {target} (k = {neighbors})",
        features.len()
    );

    let mut importances = features
        .iter()
        .map(|feature| {
            let values = dataset.column_values(feature)?;
            let (x, y) = complete_pairs(values.view(), target_values.view());
            Ok(FeatureImportance {
                feature: feature.clone(),
                mutual_information: mutual_information(x.view(), y.view(), neighbors),
            })
        })
        .collect::<Result<Vec<_>, ScoringError>>()?;

    importances.sort_by(compare_importance);
    Ok(importances)
}

fn compare_importance(a: &FeatureImportance, b: &FeatureImportance) -> Ordering {
    let by_value = match (a.mutual_information.is_nan(), b.mutual_information.is_nan()) {
        (false, false) => b.mutual_information.total_cmp(&a.mutual_information),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    };
    by_value.then_with(|| a.feature.cmp(&b.feature))
}

/// Kraskov-Stögbauer-Grassberger estimate of I(X; Y) in nats.
///
/// Both variables are scaled to unit variance first, distances in the
/// joint space use the max norm. No random jitter is added, so the
/// estimate is deterministic. Negative estimates are clamped to 0; fewer
/// than `k + 1` samples give `NaN`.
pub fn mutual_information(x: ArrayView1<f64>, y: ArrayView1<f64>, k: usize) -> f64 {
    let n = x.len();
    if k == 0 || n != y.len() || n <= k {
        return f64::NAN;
    }

    let x = unit_scaled(x);
    let y = unit_scaled(y);
    let sorted_x = sorted(&x);
    let sorted_y = sorted(&y);

    let mut marginal_digamma = 0.0;
    for i in 0..n {
        let radius = kth_neighbor_distance(&x, &y, i, k);
        let nx = count_within(&sorted_x, x[i], radius);
        let ny = count_within(&sorted_y, y[i], radius);
        marginal_digamma += digamma((nx + 1) as f64) + digamma((ny + 1) as f64);
    }

    let mi = digamma(n as f64) + digamma(k as f64) - marginal_digamma / n as f64;
    mi.max(0.0)
}

fn unit_scaled(values: ArrayView1<f64>) -> Array1<f64> {
    let std = values.std(0.0);
    if std > 0.0 {
        values.mapv(|v| v / std)
    } else {
        values.to_owned()
    }
}

fn sorted(values: &Array1<f64>) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Max-norm distance from point `i` to its k-th nearest other point
fn kth_neighbor_distance(x: &Array1<f64>, y: &Array1<f64>, i: usize, k: usize) -> f64 {
    let mut distances: Vec<f64> = (0..x.len())
        .filter(|&j| j != i)
        .map(|j| (x[j] - x[i]).abs().max((y[j] - y[i]).abs()))
        .collect();
    distances.select_nth_unstable_by(k - 1, f64::total_cmp);
    distances[k - 1]
}

/// Other points strictly closer than `radius` in one marginal
fn count_within(sorted: &[f64], center: f64, radius: f64) -> usize {
    let lower = sorted.partition_point(|&v| v <= center - radius);
    let upper = sorted.partition_point(|&v| v < center + radius);
    // the point itself always falls inside the open interval
    upper.saturating_sub(lower).saturating_sub(1)
}

/// ψ(x) for x > 0 via the recurrence and the asymptotic series
pub fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    let series = f
        * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))));
    result + x.ln() - 0.5 / x - series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use ndarray::Array1;

    const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

    #[test]
    fn test_digamma_known_values() {
        assert!((digamma(1.0) + EULER_MASCHERONI).abs() < 1e-10);
        assert!((digamma(2.0) - (1.0 - EULER_MASCHERONI)).abs() < 1e-10);
        assert!((digamma(10.0) - 2.251_752_589_066_721).abs() < 1e-10);
    }

    #[test]
    fn test_count_within_excludes_self_and_boundary() {
        let sorted = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(count_within(&sorted, 2.0, 1.0), 0);
        assert_eq!(count_within(&sorted, 2.0, 1.5), 2);
    }

    #[test]
    fn test_dependent_beats_independent() {
        let x: Array1<f64> = (0..60_i32).map(|i| f64::from(i) * 0.1).collect();
        let dependent = x.mapv(|v| v.sin() * 3.0 + v);
        // deterministic scramble with no relation to x
        let noise: Array1<f64> = (0..60_i32).map(|i| f64::from((i * 37) % 61)).collect();

        let strong = mutual_information(x.view(), dependent.view(), DEFAULT_NEIGHBORS);
        let weak = mutual_information(x.view(), noise.view(), DEFAULT_NEIGHBORS);
        assert!(strong > weak, "strong {strong} weak {weak}");
        assert!(strong > 0.5);
    }

    #[test]
    fn test_too_few_samples_is_nan() {
        let x = ndarray::array![1.0, 2.0, 3.0];
        assert!(mutual_information(x.view(), x.view(), 3).is_nan());
    }

    #[test]
    fn test_deterministic() {
        let x: Array1<f64> = (0..40_i32).map(|i| f64::from((i * 7) % 13)).collect();
        let y = x.mapv(|v| v * v);
        let a = mutual_information(x.view(), y.view(), 3);
        let b = mutual_information(x.view(), y.view(), 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_importance_sorted_descending() {
        let records = (0..40_i32)
            .map(|i| {
                let v = f64::from(i);
                Record::new(i.to_string())
                    .with("TARGET", v * 2.0)
                    .with("SIGNAL", v)
                    .with("NOISE", f64::from((i * 17) % 41))
            })
            .collect();
        let dataset = Dataset::from_records(
            vec!["SIGNAL".to_string(), "NOISE".to_string(), "TARGET".to_string()],
            records,
        );

        let ranked = feature_importance(
            &dataset,
            &["NOISE".to_string(), "SIGNAL".to_string()],
            "TARGET",
            DEFAULT_NEIGHBORS,
        )
        .unwrap();

        assert_eq!(ranked[0].feature, "SIGNAL");
        assert_eq!(ranked[1].feature, "NOISE");
        assert!(ranked[0].mutual_information >= ranked[1].mutual_information);
    }

    #[test]
    fn test_importance_missing_feature_is_error() {
        let dataset = Dataset::new(vec!["TARGET".to_string()]);
        let err = feature_importance(&dataset, &["NOPE".to_string()], "TARGET", 3).unwrap_err();
        assert!(matches!(err, ScoringError::MissingColumn { column } if column == "NOPE"));
    }

    #[test]
    fn test_nan_sorts_last_then_by_name() {
        let mut rows = vec![
            FeatureImportance { feature: "B".into(), mutual_information: f64::NAN },
            FeatureImportance { feature: "C".into(), mutual_information: 0.2 },
            FeatureImportance { feature: "A".into(), mutual_information: 0.2 },
            FeatureImportance { feature: "D".into(), mutual_information: 0.9 },
        ];
        rows.sort_by(compare_importance);
        let names: Vec<&str> = rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(names, vec!["D", "A", "C", "B"]);
    }
}
