//! SDCM HTTP client implementation

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::auth::TokenProvider;
use crate::config::SdcmConfig;
use crate::error::{Result, SdcmClientError};
use crate::template::{self, UrlTemplate};
use crate::types::*;

/// API version substituted into slot `{0}` of every template
pub const API_VERSION: &str = "1.0";
/// Tenant path segment substituted into slot `{1}` of every template
pub const TENANT_SEGMENT: &str = "my";

/// Header that marks a blob upload as a single block blob
const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";

/// SDCM REST API client
///
/// Holds the credentials and the current bearer token. Call
/// [`setup_access_token`](Self::setup_access_token) before any API operation;
/// requests sent without a token carry no `Authorization` header and are
/// expected to be rejected by the server.
#[derive(Debug, Clone)]
pub struct SdcmClient {
    client: Client,
    api_url: Url,
    user_agent: HeaderValue,
    token_provider: TokenProvider,
    credentials: Credentials,
    config: SdcmConfig,
    access_token: Option<AccessToken>,
}

impl SdcmClient {
    /// Create a client for the public service
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(
            Credentials::new(tenant_id, client_id, client_secret),
            SdcmConfig::default(),
        )
    }

    /// Create a client with custom configuration
    ///
    /// Does not touch the network.
    pub fn with_config(credentials: Credentials, config: SdcmConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = config.timeouts.request_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = config.timeouts.connect_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        let api_url = template::parse_base_url(&config.connection.api_url)?;
        let token_provider = TokenProvider::new(client.clone(), &config.connection.login_url)?;
        let user_agent = HeaderValue::from_str(&config.connection.user_agent)
            .map_err(|e| SdcmClientError::InvalidHeader(format!("user agent: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            user_agent,
            token_provider,
            credentials,
            config,
            access_token: None,
        })
    }

    /// Get the management API base URL
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Get the configuration
    pub fn config(&self) -> &SdcmConfig {
        &self.config
    }

    /// Get the credentials this client authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // =========================================================================
    // Token Management
    // =========================================================================

    /// Acquire a fresh bearer token and store it
    ///
    /// Safe to call again to refresh. On failure the previously stored token
    /// is kept.
    #[instrument(skip(self))]
    pub async fn setup_access_token(&mut self) -> Result<()> {
        let token = self
            .token_provider
            .acquire_token(&self.credentials, &self.config.connection.resource)
            .await?;
        self.access_token = Some(token);
        info!("Access token established");
        Ok(())
    }

    /// The current bearer token, if one has been established
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Use a token obtained elsewhere
    pub fn set_access_token(&mut self, token: AccessToken) {
        self.access_token = Some(token);
    }

    // =========================================================================
    // Generic Requests
    // =========================================================================

    /// Resolve a template against the fixed version and tenant segment
    pub fn render_path(&self, template: UrlTemplate, params: &[&str]) -> Result<String> {
        let mut args = Vec::with_capacity(params.len() + 2);
        args.push(API_VERSION);
        args.push(TENANT_SEGMENT);
        args.extend_from_slice(params);
        template.render(&args)
    }

    /// Issue an API request and return the parsed body
    ///
    /// An empty body yields an empty JSON object. The HTTP status is not
    /// interpreted; see [`make_request_with_status`](Self::make_request_with_status).
    pub async fn make_request(
        &self,
        method: Method,
        template: UrlTemplate,
        params: &[&str],
        body: Option<&Value>,
    ) -> Result<Value> {
        self.make_request_with_status(method, template, params, body)
            .await
            .map(|r| r.body)
    }

    /// Issue an API request and return the status code with the parsed body
    #[instrument(skip(self, template, body), fields(template = %template))]
    pub async fn make_request_with_status(
        &self,
        method: Method,
        template: UrlTemplate,
        params: &[&str],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let path = self.render_path(template, params)?;
        let url = template::join_base(&self.api_url, &path)?;
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, self.user_agent.clone());
        request = self.add_auth_header(request)?;

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Response {} ({} bytes)", status, text.len());

        Ok(ApiResponse {
            status: status.as_u16(),
            body: parse_body(&text)?,
        })
    }

    // =========================================================================
    // Product Operations
    // =========================================================================

    /// List products
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Value> {
        self.make_request(Method::GET, template::PRODUCTS, &[], None)
            .await
    }

    /// Fetch the next page of a product listing
    ///
    /// `continuation` is the relative link the API returns alongside a page,
    /// e.g. `hardware/products?continuationToken=...`.
    #[instrument(skip(self))]
    pub async fn get_products_page(&self, continuation: &str) -> Result<Value> {
        let continuation = continuation.trim_start_matches('/');
        self.make_request(
            Method::GET,
            template::PRODUCTS_CONTINUATION,
            &[continuation],
            None,
        )
        .await
    }

    /// Get a single product
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &str) -> Result<Value> {
        self.make_request(Method::GET, template::PRODUCT, &[product_id], None)
            .await
    }

    /// Create a product from a JSON body
    #[instrument(skip(self, body))]
    pub async fn create_product(&self, body: &Value) -> Result<Value> {
        self.make_request(Method::POST, template::PRODUCTS, &[], Some(body))
            .await
    }

    // =========================================================================
    // Submission Operations
    // =========================================================================

    /// Get a submission
    #[instrument(skip(self))]
    pub async fn get_submission(&self, product_id: &str, submission_id: &str) -> Result<Value> {
        self.make_request(
            Method::GET,
            template::SUBMISSION,
            &[product_id, submission_id],
            None,
        )
        .await
    }

    /// Create a submission for a product
    #[instrument(skip(self, body))]
    pub async fn create_submission(&self, product_id: &str, body: &Value) -> Result<Value> {
        self.make_request(
            Method::POST,
            template::SUBMISSIONS,
            &[product_id],
            Some(body),
        )
        .await
    }

    /// Commit a submission so the server starts processing it
    #[instrument(skip(self))]
    pub async fn commit_submission(&self, product_id: &str, submission_id: &str) -> Result<Value> {
        let response = self
            .make_request_with_status(
                Method::POST,
                template::COMMIT_SUBMISSION,
                &[product_id, submission_id],
                None,
            )
            .await?;
        info!("Commit of {}/{} returned {}", product_id, submission_id, response.status);
        Ok(response.body)
    }

    /// Get the processing status of a submission
    #[instrument(skip(self))]
    pub async fn get_product_submission_status(
        &self,
        product_id: &str,
        submission_id: &str,
    ) -> Result<Value> {
        self.make_request(
            Method::GET,
            template::SUBMISSION,
            &[product_id, submission_id],
            None,
        )
        .await
    }

    // =========================================================================
    // Package Upload
    // =========================================================================

    /// Upload a file to a pre-signed blob URL
    ///
    /// Returns the HTTP status code of the `PUT`. The bearer token is not
    /// sent; the URL is used as given, without re-encoding.
    pub async fn upload_file(&self, file_path: impl AsRef<Path>, upload_url: &str) -> Result<u16> {
        self.upload_path(file_path.as_ref(), upload_url).await
    }

    #[instrument(skip(self, path, upload_url), fields(path = %path.display()))]
    async fn upload_path(&self, path: &Path, upload_url: &str) -> Result<u16> {
        let url = Url::parse(upload_url)?;

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| SdcmClientError::UploadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let len = file
            .metadata()
            .await
            .map_err(|source| SdcmClientError::UploadFile {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        // The signature lives in the query string; keep it out of the logs.
        info!(
            "Uploading {} bytes to {}",
            len,
            url.host_str().unwrap_or("<no host>")
        );

        let response = self
            .client
            .put(url)
            .header(BLOB_TYPE_HEADER, "BlockBlob")
            .header(CONTENT_LENGTH, len)
            .body(reqwest::Body::from(file))
            .send()
            .await?;

        let status = response.status();
        debug!("Upload returned {}", status);
        Ok(status.as_u16())
    }

    // =========================================================================
    // Status Polling
    // =========================================================================

    /// Poll a submission until its signed package is available or it fails
    ///
    /// Returns `Some(url)` of the first download whose type is
    /// `signedpackage` (any case), or `None` when the workflow state is
    /// `failed`. A failed state wins over any downloads in the same body.
    ///
    /// With `verbose`, every observed step and state is emitted as a `tracing`
    /// event at info level (debug otherwise). Nothing is printed directly, so
    /// the caller needs a subscriber installed to see progress.
    ///
    /// The loop has no bound unless `poll.wait_timeout_ms` is configured.
    /// Dropping the returned future cancels it.
    pub async fn wait(
        &self,
        product_id: &str,
        submission_id: &str,
        verbose: bool,
    ) -> Result<Option<String>> {
        self.wait_with_progress(product_id, submission_id, |status| {
            if verbose {
                info!("{} {}", status.current_step, status.state);
            } else {
                debug!("{} {}", status.current_step, status.state);
            }
        })
        .await
    }

    /// Same as [`wait`](Self::wait), handing each observed workflow status to
    /// `on_status`
    #[instrument(skip(self, on_status))]
    pub async fn wait_with_progress<F>(
        &self,
        product_id: &str,
        submission_id: &str,
        mut on_status: F,
    ) -> Result<Option<String>>
    where
        F: FnMut(&WorkflowStatus),
    {
        let poll_interval = self.config.poll.interval();
        let timeout = self.config.poll.wait_timeout();
        let start = tokio::time::Instant::now();

        loop {
            let body = self
                .get_product_submission_status(product_id, submission_id)
                .await?;
            let status = SubmissionStatus::from_value(body)?;

            on_status(&status.workflow_status);

            if status.workflow_status.is_failed() {
                warn!(
                    "Submission {}/{} failed at step {}",
                    product_id, submission_id, status.workflow_status.current_step
                );
                return Ok(None);
            }

            if let Some(url) = status.signed_package_url()? {
                info!("Submission {}/{} produced a signed package", product_id, submission_id);
                return Ok(Some(url.to_string()));
            }

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout {
                    return Err(SdcmClientError::WaitTimeout {
                        product_id: product_id.to_string(),
                        submission_id: submission_id.to_string(),
                    });
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.access_token {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|e| SdcmClientError::InvalidHeader(format!("access token: {}", e)))?;
                Ok(request.header(AUTHORIZATION, value))
            }
            None => {
                warn!("No access token established; sending unauthenticated request");
                Ok(request)
            }
        }
    }
}

/// Parse a response body, treating blank bodies as an empty object
fn parse_body(text: &str) -> Result<Value> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text).map_err(|e| SdcmClientError::ResponseParse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SdcmClient {
        SdcmClient::new("tenant", "client", "secret").unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(
            client.api_url().as_str(),
            "https://manage.devcenter.microsoft.com/"
        );
        assert!(client.access_token().is_none());
    }

    #[test]
    fn test_invalid_api_url() {
        let config = SdcmConfig::builder().api_url("not a url").build();
        let result = SdcmClient::with_config(Credentials::new("t", "c", "s"), config);
        assert!(matches!(result, Err(SdcmClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_invalid_user_agent() {
        let config = SdcmConfig::builder().user_agent("bad\nagent").build();
        let result = SdcmClient::with_config(Credentials::new("t", "c", "s"), config);
        assert!(matches!(result, Err(SdcmClientError::InvalidHeader(_))));
    }

    #[test]
    fn test_render_path() {
        let client = client();
        assert_eq!(
            client
                .render_path(template::COMMIT_SUBMISSION, &["P1", "S1"])
                .unwrap(),
            "/v1.0/my/hardware/products/P1/submissions/S1/commit"
        );
        assert_eq!(
            client.render_path(template::PRODUCTS, &[]).unwrap(),
            "/v1.0/my/hardware/products"
        );
    }

    #[test]
    fn test_set_access_token() {
        let mut client = client();
        client.set_access_token(AccessToken::new("abc"));
        assert_eq!(client.access_token().map(AccessToken::as_str), Some("abc"));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body("  \r\n").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body(r#"{"id": 7}"#).unwrap(), serde_json::json!({"id": 7}));
        assert!(matches!(
            parse_body("<html>502</html>"),
            Err(SdcmClientError::ResponseParse(_))
        ));
    }
}
