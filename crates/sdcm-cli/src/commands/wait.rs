//! Wait command - poll until the signed package is ready

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sdcm_client::SdcmClient;
use std::time::Duration;

use crate::output::OutputContext;

/// Wait for a submission to finish, printing the signed package URL
///
/// Ctrl-C abandons the wait without touching the submission.
pub async fn wait(
    client: &SdcmClient,
    product_id: &str,
    submission_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let pb = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Waiting for status...");

    let progress = |status: &sdcm_client::WorkflowStatus| {
        pb.set_message(format!("{} {}", status.current_step, status.state));
    };

    let outcome = tokio::select! {
        result = client.wait_with_progress(product_id, submission_id, progress) => result
            .with_context(|| format!("Failed while waiting for {}/{}", product_id, submission_id))?,
        _ = tokio::signal::ctrl_c() => {
            pb.abandon_with_message("Interrupted");
            return Err(anyhow!("Interrupted while waiting for {}/{}", product_id, submission_id));
        }
    };

    match outcome {
        Some(url) => {
            pb.finish_with_message("Signed package ready");
            ctx.success(&format!("Submission {} completed", submission_id));
            println!("{}", url);
            Ok(())
        }
        None => {
            pb.finish_with_message("Submission failed");
            ctx.error(&format!("Submission {} failed", submission_id));
            Err(anyhow!("Submission {}/{} failed", product_id, submission_id))
        }
    }
}
