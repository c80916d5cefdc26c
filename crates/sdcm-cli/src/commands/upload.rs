//! Upload command - package transfer to a pre-signed URL

use anyhow::{bail, Context, Result};
use sdcm_client::SdcmClient;
use std::path::Path;

use crate::output::OutputContext;

/// Upload a package file
pub async fn upload(
    client: &SdcmClient,
    file_path: &Path,
    url: &str,
    ctx: &OutputContext,
) -> Result<()> {
    ctx.info(&format!("Uploading {}...", file_path.display()));

    let status = client
        .upload_file(file_path, url)
        .await
        .with_context(|| format!("Failed to upload {}", file_path.display()))?;

    if !(200..300).contains(&status) {
        bail!("Upload rejected with HTTP {}", status);
    }

    ctx.success(&format!("Upload complete (HTTP {})", status));
    Ok(())
}
