use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::scoring::FallbackPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about = "ZIP-level market competitiveness scoring")]
pub struct Cli {
    /// JSON config file (every field optional)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Filter and clean a raw market tracker export
    Preprocess {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// State code to keep (defaults to CA)
        #[arg(long)]
        state: Option<String>,
        /// First period start to keep, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last period end to keep, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Fail on non-numeric values instead of nulling them
        #[arg(long)]
        strict: bool,
    },
    /// Normalize features and compute MARKET_SCORE and ADJUSTED_LTV
    Score {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Base loan-to-value (defaults to 70)
        #[arg(long)]
        base_ltv: Option<f64>,
        /// Value for features with max == min: zero or midpoint
        #[arg(long)]
        fallback: Option<FallbackPolicy>,
    },
    /// Correlate every numeric column with the target
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Target column (defaults to MARKET_SCORE)
        #[arg(long)]
        target: Option<String>,
        /// Also rank features by mutual information
        #[arg(long)]
        importance: bool,
    },
    /// Write distribution reports for scored columns
    Report {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
        /// Columns to report on (defaults to MARKET_SCORE and ADJUSTED_LTV)
        #[arg(long)]
        column: Vec<String>,
    },
    /// Score, analyze and report in one go
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short = 'd', long)]
        output_dir: PathBuf,
        /// Input is a raw export that needs preprocessing first
        #[arg(long)]
        raw: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}
