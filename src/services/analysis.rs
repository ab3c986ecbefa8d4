use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::analysis::{CorrelationTable, FeatureImportance, analyze_correlations, feature_importance};
use crate::config::AnalysisSettings;
use crate::domain::{Dataset, log_diagnostics};
use crate::io;

pub const IMPORTANCE_FILE: &str = "feature_importance.json";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub correlations: CorrelationTable,
    pub importance: Option<Vec<FeatureImportance>>,
}

pub struct AnalysisService {
    settings: AnalysisSettings,
}

impl AnalysisService {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn run(&self, input: &Path, output: &Path, with_importance: bool) -> Result<AnalysisOutcome> {
        info!("=== Starting Correlation Analysis ===\n");

        let (dataset, load_issues) = io::read_dataset(input, false)?;
        log_diagnostics(&load_issues);
        info!("  → Loaded {} scored records\n", dataset.len());

        let outcome = self.analyze(&dataset, with_importance)?;
        self.save(&outcome, output)?;

        info!("=== Analysis Complete ===");
        Ok(outcome)
    }

    /// Diagnostic only: the dataset is never modified
    pub fn analyze(&self, dataset: &Dataset, with_importance: bool) -> Result<AnalysisOutcome> {
        let (correlations, diagnostics) = analyze_correlations(dataset, &self.settings.target)
            .context("Failed to compute correlations")?;
        log_diagnostics(&diagnostics);
        log_correlations(&correlations);

        let importance = if with_importance {
            let ranked = feature_importance(
                dataset,
                &self.settings.importance_features,
                &self.settings.importance_target,
                self.settings.neighbors,
            )
            .context("Failed to compute feature importance")?;
            for item in &ranked {
                info!("    {:<24} MI {:.4}", item.feature, item.mutual_information);
            }
            Some(ranked)
        } else {
            None
        };

        Ok(AnalysisOutcome {
            correlations,
            importance,
        })
    }

    /// Correlations to `output`, importance (if any) next to it
    pub fn save(&self, outcome: &AnalysisOutcome, output: &Path) -> Result<()> {
        io::write_correlations(output, &outcome.correlations)?;
        info!("  → Saved correlation table to {}", output.display());

        if let Some(importance) = &outcome.importance {
            let path = output.with_file_name(IMPORTANCE_FILE);
            io::write_json(&path, importance)?;
        }
        Ok(())
    }
}

fn log_correlations(table: &CorrelationTable) {
    info!("  Correlations with {}:", table.target);
    for row in &table.rows {
        info!(
            "    {:<24} pearson {:>7.3}  spearman {:>7.3}",
            row.feature, row.pearson, row.spearman
        );
    }
}
