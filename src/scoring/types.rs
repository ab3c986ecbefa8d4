use std::collections::BTreeMap;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::columns::{
    AVG_SALE_TO_LIST, INVERTED_FEATURES, MEDIAN_DOM, PENDING_SALES_YOY, SOLD_ABOVE_LIST,
};
use crate::errors::ScoringError;

pub type FeatureName = String;
pub type WeightValue = f64;

pub const DEFAULT_BASE_LTV: f64 = 70.0;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Immutable feature → weight mapping used by the score calculator
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    weights: BTreeMap<FeatureName, WeightValue>,
}

impl WeightSet {
    pub fn new(weights: BTreeMap<FeatureName, WeightValue>) -> Result<Self, ScoringError> {
        for (feature, &weight) in &weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScoringError::InvalidWeight {
                    feature: feature.clone(),
                    weight,
                });
            }
        }

        let set = Self { weights };
        let sum = set.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!("Weights sum to {sum:.4}, scores will not span the full 0-100 range as intended");
        }
        Ok(set)
    }

    pub fn default_weights() -> BTreeMap<FeatureName, WeightValue> {
        BTreeMap::from([
            (SOLD_ABOVE_LIST.to_string(), 0.3),
            (PENDING_SALES_YOY.to_string(), 0.2),
            (AVG_SALE_TO_LIST.to_string(), 0.3),
            (MEDIAN_DOM.to_string(), 0.2),
        ])
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn get(&self, feature: &str) -> Option<WeightValue> {
        self.weights.get(feature).copied()
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, WeightValue)> {
        self.weights.iter().map(|(f, &w)| (f.as_str(), w))
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            weights: Self::default_weights(),
        }
    }
}

/// Value assigned when a feature has `max == min` across the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    Zero,
    #[default]
    Midpoint,
}

impl FallbackPolicy {
    pub fn value(&self) -> f64 {
        match self {
            FallbackPolicy::Zero => 0.0,
            FallbackPolicy::Midpoint => 0.5,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FallbackPolicy::Zero => "zero",
            FallbackPolicy::Midpoint => "midpoint",
        }
    }
}

impl FromStr for FallbackPolicy {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(FallbackPolicy::Zero),
            "midpoint" | "mid" => Ok(FallbackPolicy::Midpoint),
            other => Err(ScoringError::UnknownFallbackPolicy(other.to_string())),
        }
    }
}

/// Everything the score calculator needs, fixed at construction time
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub weights: WeightSet,
    pub base_ltv: f64,
    pub fallback: FallbackPolicy,
    pub inverted_features: Vec<FeatureName>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: WeightSet::default(),
            base_ltv: DEFAULT_BASE_LTV,
            fallback: FallbackPolicy::default(),
            inverted_features: INVERTED_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Competitiveness band of a market score; drives the LTV adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketTier {
    Low,        // < 20
    MediumLow,  // 20-39
    Medium,     // 40-59
    MediumHigh, // 60-79
    VeryHigh,   // 80-89
    Extreme,    // >= 90
}

impl MarketTier {
    pub const ALL: [MarketTier; 6] = [
        MarketTier::Extreme,
        MarketTier::VeryHigh,
        MarketTier::MediumHigh,
        MarketTier::Medium,
        MarketTier::MediumLow,
        MarketTier::Low,
    ];

    /// First matching band, checked from the top down
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            MarketTier::Extreme
        } else if score >= 80.0 {
            MarketTier::VeryHigh
        } else if score >= 60.0 {
            MarketTier::MediumHigh
        } else if score >= 40.0 {
            MarketTier::Medium
        } else if score >= 20.0 {
            MarketTier::MediumLow
        } else {
            MarketTier::Low
        }
    }

    /// LTV points added to (or removed from) the base
    pub fn adjustment(&self) -> f64 {
        match self {
            MarketTier::Extreme => 10.0,
            MarketTier::VeryHigh => 7.0,
            MarketTier::MediumHigh => 3.0,
            MarketTier::Medium => 0.0,
            MarketTier::MediumLow => -5.0,
            MarketTier::Low => -10.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarketTier::Extreme => "extreme",
            MarketTier::VeryHigh => "very_high",
            MarketTier::MediumHigh => "medium_high",
            MarketTier::Medium => "medium",
            MarketTier::MediumLow => "medium_low",
            MarketTier::Low => "low",
        }
    }
}
