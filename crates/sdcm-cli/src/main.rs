//! SDCM CLI - Command-line tool for Hardware Dev Center Manager submissions
//!
//! Wraps every operation of the `sdcm-client` library: product and submission
//! management, package upload, commit, and waiting for the signed package.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdcm_client::SdcmClient;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::OutputContext;

#[derive(Parser)]
#[command(name = "sdcm-cli")]
#[command(author, version, about = "Hardware Dev Center Manager CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Azure AD tenant ID
    #[arg(long, env = "SDCM_TENANT_ID")]
    tenant_id: String,

    /// Azure AD application (client) ID
    #[arg(long, env = "SDCM_CLIENT_ID")]
    client_id: String,

    /// Azure AD application secret
    #[arg(long, env = "SDCM_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Client configuration file (YAML)
    #[arg(short, long, env = "SDCM_CONFIG")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Continuation link returned by a previous listing
        #[arg(long)]
        continuation: Option<String>,
    },

    /// Show a product
    Product {
        /// Product ID
        product_id: String,
    },

    /// Create a product from a JSON file
    CreateProduct {
        /// Path to the product JSON body
        body: PathBuf,
    },

    /// Show a submission
    Submission {
        /// Product ID
        product_id: String,

        /// Submission ID
        submission_id: String,
    },

    /// Show the workflow status of a submission
    Status {
        /// Product ID
        product_id: String,

        /// Submission ID
        submission_id: String,
    },

    /// Create a submission from a JSON file
    CreateSubmission {
        /// Product ID
        product_id: String,

        /// Path to the submission JSON body
        body: PathBuf,
    },

    /// Upload a package to a pre-signed URL
    Upload {
        /// Package file path
        file: PathBuf,

        /// Pre-signed upload URL from the submission
        url: String,
    },

    /// Commit a submission for processing
    Commit {
        /// Product ID
        product_id: String,

        /// Submission ID
        submission_id: String,
    },

    /// Wait until the signed package is available
    Wait {
        /// Product ID
        product_id: String,

        /// Submission ID
        submission_id: String,

        /// Give up after this many seconds (default: wait indefinitely)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = config::load(cli.config.as_deref())?;
    if let Commands::Wait {
        timeout_secs: Some(secs),
        ..
    } = &cli.command
    {
        config.poll.wait_timeout_ms = Some(secs.saturating_mul(1_000));
    }

    let ctx = OutputContext::new(cli.no_color, cli.quiet);

    let credentials =
        sdcm_client::Credentials::new(&cli.tenant_id, &cli.client_id, &cli.client_secret);
    let mut client =
        SdcmClient::with_config(credentials, config).context("Failed to create SDCM client")?;

    // Uploads go to a pre-signed URL and need no token
    if !matches!(cli.command, Commands::Upload { .. }) {
        client
            .setup_access_token()
            .await
            .context("Failed to acquire access token")?;
    }

    match &cli.command {
        Commands::Products { continuation } => {
            commands::products(&client, continuation.as_deref(), &ctx).await?;
        }

        Commands::Product { product_id } => {
            commands::product(&client, product_id, &ctx).await?;
        }

        Commands::CreateProduct { body } => {
            commands::create_product(&client, body, &ctx).await?;
        }

        Commands::Submission {
            product_id,
            submission_id,
        } => {
            commands::submission(&client, product_id, submission_id, &ctx).await?;
        }

        Commands::Status {
            product_id,
            submission_id,
        } => {
            commands::status(&client, product_id, submission_id, &ctx).await?;
        }

        Commands::CreateSubmission { product_id, body } => {
            commands::create_submission(&client, product_id, body, &ctx).await?;
        }

        Commands::Upload { file, url } => {
            commands::upload(&client, file, url, &ctx).await?;
        }

        Commands::Commit {
            product_id,
            submission_id,
        } => {
            commands::commit(&client, product_id, submission_id, &ctx).await?;
        }

        Commands::Wait {
            product_id,
            submission_id,
            ..
        } => {
            commands::wait(&client, product_id, submission_id, &ctx).await?;
        }
    }

    Ok(())
}
