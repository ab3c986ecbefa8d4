use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::mutual_info::DEFAULT_NEIGHBORS;
use crate::domain::columns::{
    ADJUSTED_LTV, AVG_SALE_TO_LIST, HOMES_SOLD, HOMES_SOLD_YOY, INVENTORY, INVENTORY_YOY,
    INVERTED_FEATURES, MARKET_SCORE, MEDIAN_DOM, MEDIAN_SALE_PRICE, MEDIAN_SALE_PRICE_YOY,
    PENDING_SALES, PENDING_SALES_YOY, REGION, REQUIRED_FEATURES, SOLD_ABOVE_LIST,
};
use crate::errors::read_context;
use crate::scoring::types::{DEFAULT_BASE_LTV, FallbackPolicy, ScoringConfig, WeightSet};

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub weights: BTreeMap<String, f64>,
    pub base_ltv: f64,
    pub normalization_fallback_policy: FallbackPolicy,
    pub inverted_features: Vec<String>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightSet::default_weights(),
            base_ltv: DEFAULT_BASE_LTV,
            normalization_fallback_policy: FallbackPolicy::default(),
            inverted_features: owned(&INVERTED_FEATURES),
        }
    }
}

impl ScoringSettings {
    /// Validate into the immutable config the calculator is built from
    pub fn to_config(&self) -> Result<ScoringConfig> {
        let weights = WeightSet::new(self.weights.clone()).context("Invalid scoring weights")?;
        Ok(ScoringConfig {
            weights,
            base_ltv: self.base_ltv,
            fallback: self.normalization_fallback_policy,
            inverted_features: self.inverted_features.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingSettings {
    pub state_code: String,
    pub period_begin: NaiveDate,
    pub period_end: NaiveDate,
    /// Fail on unparseable numbers instead of coercing them to null
    pub strict: bool,
    pub region_prefix: String,
    pub useful_columns: Vec<String>,
    /// Nulls replaced by the column median
    pub continuous_columns: Vec<String>,
    /// Nulls replaced by 0 (missing means no activity)
    pub zero_fill_columns: Vec<String>,
}

impl Default for PreprocessingSettings {
    fn default() -> Self {
        Self {
            state_code: "CA".to_string(),
            period_begin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            strict: false,
            region_prefix: "Zip Code: ".to_string(),
            useful_columns: owned(&[
                REGION,
                MEDIAN_SALE_PRICE,
                HOMES_SOLD,
                HOMES_SOLD_YOY,
                MEDIAN_SALE_PRICE_YOY,
                PENDING_SALES,
                PENDING_SALES_YOY,
                MEDIAN_DOM,
                INVENTORY,
                INVENTORY_YOY,
                AVG_SALE_TO_LIST,
                SOLD_ABOVE_LIST,
            ]),
            continuous_columns: owned(&[
                MEDIAN_SALE_PRICE_YOY,
                HOMES_SOLD_YOY,
                PENDING_SALES_YOY,
                INVENTORY,
                INVENTORY_YOY,
                MEDIAN_DOM,
                AVG_SALE_TO_LIST,
            ]),
            zero_fill_columns: owned(&[PENDING_SALES, HOMES_SOLD]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub target: String,
    pub importance_features: Vec<String>,
    pub importance_target: String,
    pub neighbors: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            target: MARKET_SCORE.to_string(),
            importance_features: owned(&REQUIRED_FEATURES),
            importance_target: MARKET_SCORE.to_string(),
            neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub columns: Vec<String>,
    pub histogram_bins: usize,
    pub top_n: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            columns: owned(&[MARKET_SCORE, ADJUSTED_LTV]),
            histogram_bins: 30,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringSettings,
    pub preprocessing: PreprocessingSettings,
    pub analysis: AnalysisSettings,
    pub report: ReportSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| read_context(path))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::new()),
        }
    }
}
