use log::info;

use super::ltv::adjust_ltv;
use super::normalization::Normalizer;
use super::types::ScoringConfig;
use crate::domain::columns::{ADJUSTED_LTV, MARKET_SCORE};
use crate::domain::{Dataset, Diagnostic, DiagnosticKind, Record};
use crate::errors::ScoringError;

/// Maps the theoretical [0, 1] weighted sum onto roughly [0, 110]
pub const SCORE_SCALE: f64 = 110.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// LTV written for records whose score could not be computed
pub const MISSING_LTV: i32 = 0;

/// Scored batch plus every non-fatal issue met along the way
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub dataset: Dataset,
    pub diagnostics: Vec<Diagnostic>,
}

/// Weighted composite scoring over normalized features
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: ScoringConfig,
    normalizer: Normalizer,
}

impl ScoreCalculator {
    pub fn new(config: ScoringConfig) -> Self {
        let normalizer = Normalizer::from_config(&config);
        Self { config, normalizer }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Normalize the batch, then score every record independently.
    ///
    /// Only structural problems (missing or invalid feature columns) abort
    /// the batch.
    pub fn score_batch(&self, mut dataset: Dataset) -> Result<ScoredBatch, ScoringError> {
        info!("Scoring {} records", dataset.len());

        // 1. Batch-relative normalization
        let mut diagnostics = self.normalizer.normalize(&mut dataset)?;

        // 2. Per-record score and LTV
        dataset.add_column(MARKET_SCORE);
        dataset.add_column(ADJUSTED_LTV);

        let mut record_issues = Vec::new();
        let dataset = dataset.map_records(|record| {
            let (scored, issue) = self.score_record(record);
            record_issues.extend(issue);
            scored
        });

        info!(
            "Scored {} records ({} with non-finite inputs)",
            dataset.len(),
            record_issues.len()
        );
        diagnostics.append(&mut record_issues);

        Ok(ScoredBatch {
            dataset,
            diagnostics,
        })
    }

    /// Add `MARKET_SCORE` and `ADJUSTED_LTV` to an already normalized record
    pub fn score_record(&self, mut record: Record) -> (Record, Option<Diagnostic>) {
        let raw = self.weighted_sum(&record);
        let issue = (!raw.is_finite()).then(|| self.non_finite_diagnostic(&record));

        let score = market_score(raw);
        let ltv = if raw.is_finite() {
            adjust_ltv(f64::from(score), self.config.base_ltv)
        } else {
            MISSING_LTV
        };

        record.set(MARKET_SCORE, f64::from(score));
        record.set(ADJUSTED_LTV, f64::from(ltv));
        (record, issue)
    }

    pub fn weighted_sum(&self, record: &Record) -> f64 {
        self.active_weights()
            .map(|(feature, weight)| weight * record.value_or_nan(feature))
            .sum()
    }

    fn active_weights(&self) -> impl Iterator<Item = (&str, f64)> {
        self.config.weights.iter().filter(|(_, weight)| *weight > 0.0)
    }

    fn non_finite_diagnostic(&self, record: &Record) -> Diagnostic {
        let column = self
            .active_weights()
            .map(|(feature, _)| feature)
            .find(|feature| !record.value_or_nan(feature).is_finite())
            .unwrap_or(MARKET_SCORE);

        Diagnostic::record(
            DiagnosticKind::NonFiniteScore,
            column,
            &record.region,
            format!(
                "feature value is missing, {MARKET_SCORE} set to {MIN_SCORE} and {ADJUSTED_LTV} to {MISSING_LTV}"
            ),
        )
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

/// Scale, clamp to [0, 100] and round half away from zero
pub fn market_score(weighted_sum: f64) -> u8 {
    let scaled = weighted_sum * SCORE_SCALE;
    if !scaled.is_finite() {
        return MIN_SCORE as u8;
    }
    scaled.clamp(MIN_SCORE, MAX_SCORE).round() as u8
}
