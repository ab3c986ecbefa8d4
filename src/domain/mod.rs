pub mod columns;
pub mod diagnostics;
pub mod models;

pub use diagnostics::{Diagnostic, DiagnosticKind, log_diagnostics};
pub use models::{Dataset, Record};
