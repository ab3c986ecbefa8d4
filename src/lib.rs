pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod io;
pub mod preprocessing;
pub mod scoring;
pub mod services;

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use cli::Cli;

use crate::config::settings::AppConfig;
use crate::scoring::FallbackPolicy;
use crate::services::analysis::AnalysisService;
use crate::services::pipeline::PipelineService;
use crate::services::preprocessing::PreprocessingService;
use crate::services::reporting::ReportingService;
use crate::services::scoring::ScoringService;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load_or_default(path)
}

pub fn handle_preprocess(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    state: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    strict: bool,
) -> Result<()> {
    if let Some(state) = state {
        config.preprocessing.state_code = state.to_string();
    }
    if let Some(from) = from {
        config.preprocessing.period_begin = from;
    }
    if let Some(to) = to {
        config.preprocessing.period_end = to;
    }
    config.preprocessing.strict |= strict;

    let service = PreprocessingService::new(config.preprocessing);
    service.run(input, output)?;
    Ok(())
}

pub fn handle_score(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    base_ltv: Option<f64>,
    fallback: Option<FallbackPolicy>,
) -> Result<()> {
    if let Some(base_ltv) = base_ltv {
        config.scoring.base_ltv = base_ltv;
    }
    if let Some(fallback) = fallback {
        config.scoring.normalization_fallback_policy = fallback;
    }

    let service = ScoringService::new(&config.scoring)?;
    service.run(input, output)?;
    Ok(())
}

pub fn handle_analyze(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    target: Option<&str>,
    importance: bool,
) -> Result<()> {
    if let Some(target) = target {
        config.analysis.target = target.to_string();
    }

    let service = AnalysisService::new(config.analysis);
    service.run(input, output, importance)?;
    Ok(())
}

pub fn handle_report(
    mut config: AppConfig,
    input: &Path,
    output_dir: &Path,
    columns: &[String],
) -> Result<()> {
    if !columns.is_empty() {
        config.report.columns = columns.to_vec();
    }

    let service = ReportingService::new(config.report);
    service.run(input, output_dir)?;
    Ok(())
}

pub fn handle_run(config: AppConfig, input: &Path, output_dir: &Path, raw: bool) -> Result<()> {
    let service = PipelineService::new(config);
    service.run(input, output_dir, raw)?;
    Ok(())
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
