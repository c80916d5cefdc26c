//! SDCM API types

use serde::{Deserialize, Serialize};

use crate::error::{Result, SdcmClientError};

/// Download item type that marks the signed artifact of a finished workflow
pub const SIGNED_PACKAGE_TYPE: &str = "signedpackage";

/// Workflow state the server reports for a failed submission
pub const FAILED_STATE: &str = "failed";

// =============================================================================
// Credentials
// =============================================================================

/// Tenant/client credentials for the client-credentials grant
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token returned by the identity endpoint
///
/// Opaque: never parsed or validated locally.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(<{} bytes>)", self.0.len())
    }
}

/// Token endpoint response (only the field we need)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

// =============================================================================
// Responses
// =============================================================================

/// Parsed response together with its HTTP status code
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

/// Submission status as consumed by the wait loop
///
/// Only `workflowStatus` is required. The downloads list is read leniently:
/// a missing or null `downloads`, and items with missing or non-string
/// fields, never make the status unreadable.
#[derive(Debug, Clone)]
pub struct SubmissionStatus {
    pub workflow_status: WorkflowStatus,
    body: serde_json::Value,
}

/// Server-side workflow progress
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default)]
    pub current_step: String,
    pub state: String,
}

impl WorkflowStatus {
    pub fn is_failed(&self) -> bool {
        self.state == FAILED_STATE
    }
}

impl SubmissionStatus {
    /// Read a status body, failing only when `workflowStatus` is unusable
    pub fn from_value(body: serde_json::Value) -> Result<Self> {
        let workflow_status = body
            .get("workflowStatus")
            .map(WorkflowStatus::deserialize)
            .transpose()
            .map_err(|e| SdcmClientError::ResponseParse(format!("workflowStatus: {}", e)))?
            .ok_or_else(|| SdcmClientError::ResponseParse("missing workflowStatus".into()))?;

        Ok(Self {
            workflow_status,
            body,
        })
    }

    /// Download items; empty when `downloads.items` is absent or not a list
    pub fn download_items(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.body
            .get("downloads")
            .and_then(|d| d.get("items"))
            .and_then(serde_json::Value::as_array)
            .into_iter()
            .flatten()
    }

    /// URL of the first download whose type is `signedpackage` (any case)
    ///
    /// Items after the first match are not inspected. A matching item without
    /// a string `url` is a parse error.
    pub fn signed_package_url(&self) -> Result<Option<&str>> {
        let Some(item) = self.download_items().find(|item| is_signed_package(item)) else {
            return Ok(None);
        };
        item.get("url")
            .and_then(serde_json::Value::as_str)
            .map(Some)
            .ok_or_else(|| {
                SdcmClientError::ResponseParse("signed package item has no url".into())
            })
    }
}

fn is_signed_package(item: &serde_json::Value) -> bool {
    item.get("type")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|t| t.eq_ignore_ascii_case(SIGNED_PACKAGE_TYPE))
}
