//! SDCM Client Library
//!
//! Typed async client for the Hardware Dev Center Manager REST API: product
//! registration, driver submission, package upload, commit and status polling.
//!
//! # Example
//!
//! ```rust,no_run
//! use sdcm_client::SdcmClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut client = SdcmClient::new("contoso.onmicrosoft.com", "client-id", "client-secret")?;
//!     client.setup_access_token().await?;
//!
//!     let product = client
//!         .create_product(&json!({"productName": "Contoso Touchpad", "testHarness": "Attestation"}))
//!         .await?;
//!     let product_id = product["id"].to_string();
//!
//!     let submission = client
//!         .create_submission(&product_id, &json!({"name": "touchpad-1.2", "type": "initial"}))
//!         .await?;
//!     let submission_id = submission["id"].as_str().unwrap_or_default().to_string();
//!     let upload_url = submission["downloads"]["items"][0]["url"].as_str().unwrap_or_default();
//!
//!     client.upload_file("touchpad.hlkx", upload_url).await?;
//!     client.commit_submission(&product_id, &submission_id).await?;
//!
//!     match client.wait(&product_id, &submission_id, true).await? {
//!         Some(url) => println!("signed package: {}", url),
//!         None => println!("submission failed"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module starts a local axum server that stands in for both the
//! identity endpoint and the management API:
//!
//! ```rust,ignore
//! use sdcm_client::testing::TestServer;
//!
//! let mut server = TestServer::start(mock_router()).await?;
//! server.client.setup_access_token().await?;
//! let products = server.client.get_products().await?;
//! ```

mod auth;
mod client;
mod config;
mod error;
pub mod template;
pub mod testing;
mod types;

pub use auth::TokenProvider;
pub use client::{SdcmClient, API_VERSION, TENANT_SEGMENT};
pub use config::{
    ConfigError, ConnectionConfig, PollConfig, SdcmConfig, SdcmConfigBuilder, TimeoutsConfig,
};
pub use error::{Result, SdcmClientError};
pub use template::UrlTemplate;
pub use types::{
    AccessToken, ApiResponse, Credentials, SubmissionStatus, WorkflowStatus, FAILED_STATE,
    SIGNED_PACKAGE_TYPE,
};

// Re-export for callers building requests with `make_request`
pub use reqwest::Method;
