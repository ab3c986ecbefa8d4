use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use super::analysis::{AnalysisService, IMPORTANCE_FILE};
use super::preprocessing::PreprocessingService;
use super::reporting::ReportingService;
use super::scoring::ScoringService;
use crate::config::AppConfig;
use crate::domain::{Diagnostic, log_diagnostics};
use crate::io;

pub const CLEANED_FILE: &str = "cleaned_data.csv";
pub const SCORED_FILE: &str = "scored_data.csv";
pub const CORRELATION_FILE: &str = "correlation_analysis.csv";
pub const SUMMARY_FILE: &str = "run_summary.json";
pub const REPORTS_DIR: &str = "reports";

/// What one end-to-end run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub input: PathBuf,
    pub records: usize,
    pub base_ltv: f64,
    pub outputs: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Score → correlate → report, all against one batch
pub struct PipelineService {
    config: AppConfig,
}

impl PipelineService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, input: &Path, output_dir: &Path, raw_input: bool) -> Result<RunSummary> {
        info!("=== Starting Market Score Pipeline ===\n");
        let mut outputs = Vec::new();

        // Step 1: Load (and clean, for raw exports)
        let (dataset, mut diagnostics) = if raw_input {
            let cleaned_path = output_dir.join(CLEANED_FILE);
            let dataset = PreprocessingService::new(self.config.preprocessing.clone())
                .run(input, &cleaned_path)?;
            outputs.push(cleaned_path);
            (dataset, Vec::new())
        } else {
            let (dataset, load_issues) = io::read_dataset(input, false)?;
            log_diagnostics(&load_issues);
            (dataset, load_issues)
        };
        info!("  → {} records in batch\n", dataset.len());

        // Step 2: Score
        let scoring = ScoringService::new(&self.config.scoring)?;
        let mut batch = scoring.score(dataset)?;
        let scored_path = output_dir.join(SCORED_FILE);
        io::write_dataset(&scored_path, &batch.dataset)?;
        outputs.push(scored_path);
        diagnostics.append(&mut batch.diagnostics);
        info!("  → Scored batch saved\n");

        // Step 3: Correlation analysis and feature importance
        let analysis = AnalysisService::new(self.config.analysis.clone());
        let outcome = analysis.analyze(&batch.dataset, true)?;
        let correlation_path = output_dir.join(CORRELATION_FILE);
        analysis.save(&outcome, &correlation_path)?;
        outputs.push(correlation_path);
        outputs.push(output_dir.join(IMPORTANCE_FILE));
        info!("  → Analysis saved\n");

        // Step 4: Distribution reports
        let reporting = ReportingService::new(self.config.report.clone());
        outputs.extend(reporting.write_reports(&batch.dataset, &output_dir.join(REPORTS_DIR))?);
        info!("  → Reports saved\n");

        let summary = RunSummary {
            generated_at: Utc::now(),
            input: input.to_path_buf(),
            records: batch.dataset.len(),
            base_ltv: self.config.scoring.base_ltv,
            outputs,
            diagnostics,
        };
        io::write_json(&output_dir.join(SUMMARY_FILE), &summary)?;

        if !summary.diagnostics.is_empty() {
            info!("{} diagnostics recorded in {SUMMARY_FILE}", summary.diagnostics.len());
        }

        info!("=== Pipeline Complete ===");
        Ok(summary)
    }
}
