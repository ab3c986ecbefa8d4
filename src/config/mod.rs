pub mod settings;

pub use settings::{AnalysisSettings, AppConfig, PreprocessingSettings, ReportSettings, ScoringSettings};
