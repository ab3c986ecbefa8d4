use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};

use crate::analysis::{DistributionReport, distribution_report};
use crate::config::ReportSettings;
use crate::domain::{Dataset, log_diagnostics};
use crate::io;

pub struct ReportingService {
    settings: ReportSettings,
}

impl ReportingService {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn run(&self, input: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        info!("=== Starting Report Generation ===\n");

        let (dataset, load_issues) = io::read_dataset(input, false)?;
        log_diagnostics(&load_issues);

        let written = self.write_reports(&dataset, output_dir)?;

        info!("=== Reports Complete ({} files) ===", written.len());
        Ok(written)
    }

    pub fn reports(&self, dataset: &Dataset) -> Result<Vec<DistributionReport>> {
        let mut reports = Vec::new();
        for column in &self.settings.columns {
            if !dataset.has_column(column) {
                warn!("Skipping report for {column}: column not present");
                continue;
            }
            reports.push(distribution_report(
                dataset,
                column,
                self.settings.histogram_bins,
                self.settings.top_n,
            )?);
        }
        Ok(reports)
    }

    pub fn write_reports(&self, dataset: &Dataset, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for report in self.reports(dataset)? {
            let path = report_path(output_dir, &report.column);
            io::write_json(&path, &report)?;
            info!(
                "  → {}: {} values, mean {:.2}",
                report.column, report.summary.count, report.summary.mean
            );
            written.push(path);
        }
        Ok(written)
    }
}

pub fn report_path(output_dir: &Path, column: &str) -> PathBuf {
    output_dir.join(format!("{column}_report.json"))
}
