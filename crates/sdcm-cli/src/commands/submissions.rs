//! Submission commands

use anyhow::{Context, Result};
use sdcm_client::SdcmClient;
use std::path::Path;

use crate::output::OutputContext;

/// Show a submission
pub async fn submission(
    client: &SdcmClient,
    product_id: &str,
    submission_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let submission = client
        .get_submission(product_id, submission_id)
        .await
        .with_context(|| format!("Failed to get submission {}/{}", product_id, submission_id))?;

    ctx.print_json(&submission);
    Ok(())
}

/// Show only the workflow status and downloads of a submission
pub async fn status(
    client: &SdcmClient,
    product_id: &str,
    submission_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let submission = client
        .get_product_submission_status(product_id, submission_id)
        .await
        .with_context(|| format!("Failed to get status of {}/{}", product_id, submission_id))?;

    let summary = serde_json::json!({
        "workflowStatus": submission.get("workflowStatus"),
        "downloads": submission.get("downloads"),
    });
    ctx.print_json(&summary);
    Ok(())
}

/// Create a submission from a JSON body file
pub async fn create_submission(
    client: &SdcmClient,
    product_id: &str,
    body: &Path,
    ctx: &OutputContext,
) -> Result<()> {
    let body = super::read_json_body(body)?;
    let submission = client
        .create_submission(product_id, &body)
        .await
        .with_context(|| format!("Failed to create submission for product {}", product_id))?;

    if let Some(id) = submission.get("id") {
        ctx.success(&format!("Created submission {}", id));
    }
    ctx.print_json(&submission);
    Ok(())
}

/// Commit a submission
pub async fn commit(
    client: &SdcmClient,
    product_id: &str,
    submission_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client
        .commit_submission(product_id, submission_id)
        .await
        .with_context(|| format!("Failed to commit {}/{}", product_id, submission_id))?;

    ctx.success(&format!("Committed submission {}", submission_id));
    if response.as_object().is_some_and(|o| !o.is_empty()) {
        ctx.print_json(&response);
    }
    Ok(())
}
