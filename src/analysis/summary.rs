use std::cmp::Ordering;

use ndarray::Array1;
use serde::Serialize;

use crate::domain::columns::{ADJUSTED_LTV, MARKET_SCORE};
use crate::domain::Dataset;
use crate::errors::ScoringError;
use crate::scoring::MarketTier;
use crate::scoring::calculator::MISSING_LTV;

/// Descriptive statistics of one column, `NaN` values excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegion {
    pub region: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: MarketTier,
    pub adjusted_ltv: Option<f64>,
    pub count: usize,
}

/// Data behind the distribution visuals of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub column: String,
    pub summary: ColumnSummary,
    pub histogram: Vec<HistogramBin>,
    pub top: Vec<RankedRegion>,
    pub bottom: Vec<RankedRegion>,
    /// Present when both derived columns exist
    pub tiers: Option<Vec<TierCount>>,
}

pub fn distribution_report(
    dataset: &Dataset,
    column: &str,
    bins: usize,
    top_n: usize,
) -> Result<DistributionReport, ScoringError> {
    let values = present_values(&dataset.column_values(column)?);

    Ok(DistributionReport {
        column: column.to_string(),
        summary: summarize(&values),
        histogram: histogram(&values, bins),
        top: rank_regions(dataset, column, top_n, Ordering::Greater),
        bottom: rank_regions(dataset, column, top_n, Ordering::Less),
        tiers: tier_counts(dataset),
    })
}

fn present_values(values: &Array1<f64>) -> Array1<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

pub fn summarize(values: &Array1<f64>) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let std = if values.len() > 1 { values.std(1.0) } else { f64::NAN };

    ColumnSummary {
        count: values.len(),
        mean: values.mean().unwrap_or(f64::NAN),
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Equal-width bins over [min, max]; the last bin is closed on the right
pub fn histogram(values: &Array1<f64>, bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut min, mut max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Highest (`Ordering::Greater`) or lowest regions by `column`, ties by region key
fn rank_regions(dataset: &Dataset, column: &str, n: usize, direction: Ordering) -> Vec<RankedRegion> {
    let mut ranked: Vec<RankedRegion> = dataset
        .records()
        .iter()
        .filter_map(|r| {
            r.get(column).filter(|v| !v.is_nan()).map(|value| RankedRegion {
                region: r.region.clone(),
                value,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        let by_value = a.value.total_cmp(&b.value);
        let by_value = if direction == Ordering::Greater { by_value.reverse() } else { by_value };
        by_value.then_with(|| a.region.cmp(&b.region))
    });
    ranked.truncate(n);
    ranked
}

fn tier_counts(dataset: &Dataset) -> Option<Vec<TierCount>> {
    if !dataset.has_column(MARKET_SCORE) || !dataset.has_column(ADJUSTED_LTV) {
        return None;
    }

    let counts = MarketTier::ALL
        .iter()
        .map(|&tier| {
            let members: Vec<f64> = dataset
                .records()
                .iter()
                .filter(|r| {
                    let score = r.value_or_nan(MARKET_SCORE);
                    !score.is_nan() && MarketTier::from_score(score) == tier
                })
                .map(|r| r.value_or_nan(ADJUSTED_LTV))
                .collect();
            TierCount {
                tier,
                adjusted_ltv: members.iter().copied().find(|&ltv| ltv != f64::from(MISSING_LTV)),
                count: members.len(),
            }
        })
        .collect();

    Some(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use ndarray::array;

    #[test]
    fn test_summary_matches_describe() {
        let values = array![1.0, 2.0, 3.0, 4.0];
        let summary = summarize(&values);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 2.5);
        assert!((summary.std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q25, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q75, 3.25);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_summary_of_empty_is_nan() {
        let summary = summarize(&Array1::from(Vec::<f64>::new()));
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
        assert!(summary.median.is_nan());
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = array![0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[4].upper, 10.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&array![7.0, 7.0], 2);
        assert_eq!(bins[0].lower, 6.5);
        assert_eq!(bins[1].upper, 7.5);
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn test_report_ranks_and_tiers() {
        let dataset = Dataset::from_records(
            vec![MARKET_SCORE.to_string(), ADJUSTED_LTV.to_string()],
            vec![
                Record::new("94110").with(MARKET_SCORE, 95.0).with(ADJUSTED_LTV, 80.0),
                Record::new("94016").with(MARKET_SCORE, 95.0).with(ADJUSTED_LTV, 80.0),
                Record::new("93001").with(MARKET_SCORE, 45.0).with(ADJUSTED_LTV, 70.0),
                Record::new("91001").with(MARKET_SCORE, 0.0).with(ADJUSTED_LTV, 0.0),
                Record::new("92001").with(MARKET_SCORE, 10.0).with(ADJUSTED_LTV, 60.0),
            ],
        );

        let report = distribution_report(&dataset, MARKET_SCORE, 10, 2).unwrap();

        let top: Vec<&str> = report.top.iter().map(|r| r.region.as_str()).collect();
        let bottom: Vec<&str> = report.bottom.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(top, vec!["94016", "94110"]);
        assert_eq!(bottom, vec!["91001", "92001"]);

        let tiers = report.tiers.unwrap();
        let extreme = tiers.iter().find(|t| t.tier == MarketTier::Extreme).unwrap();
        assert_eq!(extreme.count, 2);
        assert_eq!(extreme.adjusted_ltv, Some(80.0));
        let low = tiers.iter().find(|t| t.tier == MarketTier::Low).unwrap();
        assert_eq!(low.count, 2);
        assert_eq!(low.adjusted_ltv, Some(60.0));
        let very_high = tiers.iter().find(|t| t.tier == MarketTier::VeryHigh).unwrap();
        assert_eq!(very_high.count, 0);
        assert_eq!(very_high.adjusted_ltv, None);
    }
}
