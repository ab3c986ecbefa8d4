use log::debug;

use super::types::{FallbackPolicy, FeatureName, ScoringConfig};
use crate::domain::{Dataset, Diagnostic, DiagnosticKind};
use crate::errors::ScoringError;

/// Observed bounds of one feature across a batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// Bounds over the non-`NaN` values, `None` if there are none
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Rescale into [0, 1]; `NaN` passes through untouched
    pub fn scale(&self, value: f64, fallback: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        if self.is_degenerate() {
            return fallback;
        }
        (value - self.min) / (self.max - self.min)
    }
}

/// Per-feature bounds for one batch. Never persisted or reused across batches.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationState {
    ranges: Vec<(FeatureName, Option<FeatureRange>)>,
}

impl NormalizationState {
    pub fn range(&self, feature: &str) -> Option<FeatureRange> {
        self.ranges
            .iter()
            .find(|(name, _)| name == feature)
            .and_then(|(_, range)| *range)
    }

    /// Features with `max == min`, or with no values at all
    pub fn degenerate_features(&self) -> impl Iterator<Item = &str> {
        self.ranges
            .iter()
            .filter(|(_, range)| range.is_none_or(|r| r.is_degenerate()))
            .map(|(name, _)| name.as_str())
    }
}

/// Batch-relative min-max rescaler with inversion of "lower is better" features
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    features: Vec<FeatureName>,
    inverted: Vec<FeatureName>,
    fallback: FallbackPolicy,
}

impl Normalizer {
    pub fn new(features: Vec<FeatureName>, inverted: Vec<FeatureName>, fallback: FallbackPolicy) -> Self {
        Self {
            features,
            inverted,
            fallback,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(
            config.weights.features().map(str::to_string).collect(),
            config.inverted_features.clone(),
            config.fallback,
        )
    }

    pub fn features(&self) -> &[FeatureName] {
        &self.features
    }

    /// Compute min/max of every feature over the whole batch
    pub fn fit(&self, dataset: &Dataset) -> Result<NormalizationState, ScoringError> {
        let mut ranges = Vec::with_capacity(self.features.len());

        for feature in &self.features {
            dataset.require_column(feature)?;
            check_finite_or_null(dataset, feature)?;
            let range = FeatureRange::fit(dataset.records().iter().map(|r| r.value_or_nan(feature)));
            debug!("Fitted {feature}: {range:?}");
            ranges.push((feature.clone(), range));
        }

        Ok(NormalizationState { ranges })
    }

    /// Rescale every feature into [0, 1] without inverting anything
    pub fn rescale(&self, dataset: &mut Dataset) -> Result<Vec<Diagnostic>, ScoringError> {
        let state = self.fit(dataset)?;
        let diagnostics = degenerate_diagnostics(&state, self.fallback);
        let fallback = self.fallback.value();

        for feature in &self.features {
            let Some(range) = state.range(feature) else {
                continue;
            };
            for record in dataset.records_mut() {
                let scaled = range.scale(record.value_or_nan(feature), fallback);
                record.set(feature, scaled);
            }
        }

        Ok(diagnostics)
    }

    /// Rescale, then flip the features where a lower raw value is better
    pub fn normalize(&self, dataset: &mut Dataset) -> Result<Vec<Diagnostic>, ScoringError> {
        let diagnostics = self.rescale(dataset)?;
        self.apply_inversion(dataset);
        Ok(diagnostics)
    }

    fn apply_inversion(&self, dataset: &mut Dataset) {
        for feature in self.inverted.iter().filter(|f| self.features.contains(f)) {
            for record in dataset.records_mut() {
                let inverted = invert(record.value_or_nan(feature));
                record.set(feature, inverted);
            }
        }
    }
}

fn invert(scaled: f64) -> f64 {
    1.0 - scaled
}

/// Guard for datasets built in memory; file input never carries infinities
fn check_finite_or_null(dataset: &Dataset, feature: &str) -> Result<(), ScoringError> {
    match dataset
        .records()
        .iter()
        .find(|r| r.value_or_nan(feature).is_infinite())
    {
        Some(record) => Err(ScoringError::invalid_value(
            feature,
            &record.region,
            record.value_or_nan(feature),
        )),
        None => Ok(()),
    }
}

fn degenerate_diagnostics(state: &NormalizationState, fallback: FallbackPolicy) -> Vec<Diagnostic> {
    state
        .degenerate_features()
        .map(|feature| {
            let detail = match state.range(feature) {
                Some(range) => format!(
                    "min == max == {}, using {} fallback ({})",
                    range.min,
                    fallback.as_str(),
                    fallback.value()
                ),
                None => "no values in batch".to_string(),
            };
            Diagnostic::column(DiagnosticKind::DegenerateNormalization, feature, detail)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::domain::columns::{MEDIAN_DOM, SOLD_ABOVE_LIST};

    fn normalizer(fallback: FallbackPolicy) -> Normalizer {
        Normalizer::new(
            vec![SOLD_ABOVE_LIST.to_string(), MEDIAN_DOM.to_string()],
            vec![MEDIAN_DOM.to_string()],
            fallback,
        )
    }

    fn dataset(rows: &[(f64, f64)]) -> Dataset {
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, &(sold, dom))| {
                Record::new(format!("9000{i}"))
                    .with(SOLD_ABOVE_LIST, sold)
                    .with(MEDIAN_DOM, dom)
            })
            .collect();
        Dataset::from_records(vec![SOLD_ABOVE_LIST.to_string(), MEDIAN_DOM.to_string()], records)
    }

    #[test]
    fn test_fit_skips_nan() {
        let range = FeatureRange::fit([f64::NAN, 3.0, 1.0, 7.0]).unwrap();
        assert_eq!(range, FeatureRange { min: 1.0, max: 7.0 });
        assert!(FeatureRange::fit([f64::NAN]).is_none());
    }

    #[test]
    fn test_normalize_rescales_and_inverts_days_on_market() {
        let mut data = dataset(&[(0.0, 10.0), (0.5, 35.0), (1.0, 60.0)]);
        let diagnostics = normalizer(FallbackPolicy::Midpoint).normalize(&mut data).unwrap();

        assert!(diagnostics.is_empty());
        let sold: Vec<f64> = data.records().iter().map(|r| r.value_or_nan(SOLD_ABOVE_LIST)).collect();
        let dom: Vec<f64> = data.records().iter().map(|r| r.value_or_nan(MEDIAN_DOM)).collect();
        assert_eq!(sold, vec![0.0, 0.5, 1.0]);
        assert_eq!(dom, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_rescale_is_idempotent() {
        let mut data = dataset(&[(0.2, 14.0), (0.9, 21.0), (0.4, 90.0), (0.7, 30.0)]);
        let norm = normalizer(FallbackPolicy::Midpoint);
        norm.rescale(&mut data).unwrap();
        let once = data.clone();
        norm.rescale(&mut data).unwrap();
        assert_eq!(once, data);
    }

    #[test]
    fn test_degenerate_feature_uses_fallback_consistently() {
        let mut data = dataset(&[(0.3, 10.0), (0.3, 20.0), (0.3, 30.0)]);
        let diagnostics = normalizer(FallbackPolicy::Midpoint).normalize(&mut data).unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DegenerateNormalization);
        assert_eq!(diagnostics[0].column, SOLD_ABOVE_LIST);
        assert!(data.records().iter().all(|r| r.get(SOLD_ABOVE_LIST) == Some(0.5)));
    }

    #[test]
    fn test_single_record_batch_does_not_fail() {
        let mut data = dataset(&[(0.8, 25.0)]);
        let diagnostics = normalizer(FallbackPolicy::Zero).normalize(&mut data).unwrap();

        assert_eq!(diagnostics.len(), 2);
        let record = &data.records()[0];
        assert_eq!(record.get(SOLD_ABOVE_LIST), Some(0.0));
        // fallback is applied before inversion
        assert_eq!(record.get(MEDIAN_DOM), Some(1.0));
    }

    #[test]
    fn test_nan_is_preserved() {
        let mut data = dataset(&[(f64::NAN, 10.0), (0.5, 20.0), (1.0, 30.0)]);
        normalizer(FallbackPolicy::Midpoint).normalize(&mut data).unwrap();
        assert!(data.records()[0].value_or_nan(SOLD_ABOVE_LIST).is_nan());
        assert_eq!(data.records()[1].get(SOLD_ABOVE_LIST), Some(0.0));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut data = Dataset::from_records(
            vec![SOLD_ABOVE_LIST.to_string()],
            vec![Record::new("1").with(SOLD_ABOVE_LIST, 0.1)],
        );
        let err = normalizer(FallbackPolicy::Midpoint).normalize(&mut data).unwrap_err();
        assert!(matches!(err, ScoringError::MissingColumn { column } if column == MEDIAN_DOM));
    }

    #[test]
    fn test_infinite_value_is_invalid() {
        let mut data = dataset(&[(0.1, 10.0), (f64::INFINITY, 20.0)]);
        let err = normalizer(FallbackPolicy::Midpoint).normalize(&mut data).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::InvalidValue { column, record, .. } if column == SOLD_ABOVE_LIST && record == "90001"
        ));
    }
}
