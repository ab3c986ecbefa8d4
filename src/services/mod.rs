pub mod analysis;
pub mod pipeline;
pub mod preprocessing;
pub mod reporting;
pub mod scoring;
