//! Error types for SDCM client operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for SDCM client operations
pub type Result<T> = std::result::Result<T, SdcmClientError>;

/// Errors that can occur during SDCM client operations
#[derive(Error, Debug)]
pub enum SdcmClientError {
    /// Token acquisition against the identity endpoint failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection, timeout or transfer failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The file handed to an upload could not be opened or read
    #[error("Failed to read upload file {}: {source}", .path.display())]
    UploadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body was not valid JSON, or lacked an expected key
    #[error("Failed to parse response: {0}")]
    ResponseParse(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// URL template referenced a slot with no value
    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),

    /// Token or user agent is not a legal header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Opt-in wait bound exceeded
    #[error("Timed out waiting for submission {submission_id} of product {product_id}")]
    WaitTimeout {
        product_id: String,
        submission_id: String,
    },
}

impl SdcmClientError {
    /// Create an authentication error from any displayable reason
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication(reason.into())
    }

    /// Whether this error came from moving bytes (network or upload source)
    /// rather than from the content of a response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::UploadFile { .. } | Self::Io(_)
        )
    }
}
