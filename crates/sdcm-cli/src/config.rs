//! Configuration file handling for sdcm-cli

use anyhow::{Context, Result};
use sdcm_client::SdcmConfig;
use std::path::Path;
use tracing::debug;

/// Load the client configuration, falling back to defaults when no file is given
pub fn load(path: Option<&Path>) -> Result<SdcmConfig> {
    match path {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            SdcmConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))
        }
        None => Ok(SdcmConfig::default()),
    }
}
