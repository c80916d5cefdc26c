//! Command implementations for sdcm-cli

pub mod products;
pub mod submissions;
pub mod upload;
pub mod wait;

pub use products::{create_product, product, products};
pub use submissions::{commit, create_submission, status, submission};
pub use upload::upload;
pub use wait::wait;

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Read a JSON request body from disk
fn read_json_body(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read body file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Body file is not valid JSON: {}", path.display()))
}
