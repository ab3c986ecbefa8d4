pub mod correlation;
pub mod mutual_info;
mod ranks;
pub mod summary;

pub use correlation::{CorrelationRow, CorrelationTable, analyze_correlations, pearson, spearman};
pub use mutual_info::{FeatureImportance, feature_importance, mutual_information};
pub use summary::{DistributionReport, distribution_report};
