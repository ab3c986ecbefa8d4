pub mod calculator;
pub mod ltv;
pub mod normalization;
pub mod types;

pub use calculator::{ScoreCalculator, ScoredBatch, market_score};
pub use ltv::adjust_ltv;
pub use normalization::{FeatureRange, NormalizationState, Normalizer};
pub use types::{FallbackPolicy, MarketTier, ScoringConfig, WeightSet};
