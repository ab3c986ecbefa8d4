use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::PreprocessingSettings;
use crate::domain::{Dataset, log_diagnostics};
use crate::io;
use crate::preprocessing::Preprocessor;

pub struct PreprocessingService {
    preprocessor: Preprocessor,
}

impl PreprocessingService {
    pub fn new(settings: PreprocessingSettings) -> Self {
        Self {
            preprocessor: Preprocessor::new(settings),
        }
    }

    pub fn run(&self, input: &Path, output: &Path) -> Result<Dataset> {
        info!("=== Starting Preprocessing ===\n");

        let dataset = self.clean(input)?;

        io::write_dataset(output, &dataset)?;
        info!("  → Saved cleaned batch to {}\n", output.display());

        info!("=== Preprocessing Complete ===");
        Ok(dataset)
    }

    /// Read and clean without writing anything
    pub fn clean(&self, input: &Path) -> Result<Dataset> {
        let table = io::read_raw_table(input)?;
        info!("  → Loaded {} raw rows from {}", table.len(), input.display());

        let outcome = self
            .preprocessor
            .run(&table)
            .with_context(|| format!("Failed to preprocess {}", input.display()))?;
        log_diagnostics(&outcome.diagnostics);

        info!(
            "  → {} of {} rows kept after filtering and cleaning",
            outcome.dataset.len(),
            outcome.rows_read
        );
        Ok(outcome.dataset)
    }
}
