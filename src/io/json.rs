use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use super::table::ensure_parent;
use crate::errors::write_context;

/// Pretty-printed JSON, parent directories created as needed
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
    fs::write(path, json).with_context(|| write_context(path))?;
    info!("Saved JSON report: {}", path.display());
    Ok(())
}
