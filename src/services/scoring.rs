use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::ScoringSettings;
use crate::domain::columns::{ADJUSTED_LTV, MARKET_SCORE};
use crate::domain::{Dataset, log_diagnostics};
use crate::io;
use crate::scoring::{ScoreCalculator, ScoredBatch};

pub struct ScoringService {
    calculator: ScoreCalculator,
}

impl ScoringService {
    pub fn new(settings: &ScoringSettings) -> Result<Self> {
        let config = settings.to_config()?;
        info!(
            "Scoring with base LTV {}, {} fallback for degenerate features",
            config.base_ltv,
            config.fallback.as_str()
        );
        Ok(Self {
            calculator: ScoreCalculator::new(config),
        })
    }

    pub fn run(&self, input: &Path, output: &Path) -> Result<Dataset> {
        info!("=== Starting Scoring ===\n");

        let (dataset, load_issues) = io::read_dataset(input, false)?;
        log_diagnostics(&load_issues);
        info!("  → Loaded {} records from {}\n", dataset.len(), input.display());

        let batch = self.score(dataset)?;

        io::write_dataset(output, &batch.dataset)?;
        info!("  → Saved scored batch to {}\n", output.display());

        info!("=== Scoring Complete ===");
        Ok(batch.dataset)
    }

    pub fn score(&self, dataset: Dataset) -> Result<ScoredBatch> {
        let batch = self
            .calculator
            .score_batch(dataset)
            .context("Failed to score batch")?;
        log_diagnostics(&batch.diagnostics);
        log_score_summary(&batch.dataset);
        Ok(batch)
    }
}

fn log_score_summary(dataset: &Dataset) {
    let Ok(scores) = dataset.column_values(MARKET_SCORE) else {
        return;
    };
    let (min, max) = scores
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let mean = scores.mean().unwrap_or(f64::NAN);

    info!("  → {MARKET_SCORE}: min {min}, mean {mean:.1}, max {max}");
    if let Ok(ltv) = dataset.column_values(ADJUSTED_LTV) {
        info!("  → {ADJUSTED_LTV}: mean {:.1}", ltv.mean().unwrap_or(f64::NAN));
    }
}
