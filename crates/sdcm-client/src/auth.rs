//! OAuth2 client-credentials token acquisition

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{Result, SdcmClientError};
use crate::template;
use crate::types::{AccessToken, Credentials, TokenResponse};

/// Exchanges tenant/client credentials for a bearer token
///
/// Holds no token state; every call performs a fresh grant.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: Client,
    login_url: Url,
}

impl TokenProvider {
    /// Create a provider that reuses an existing HTTP client
    pub fn new(client: Client, login_url: &str) -> Result<Self> {
        let login_url = template::parse_base_url(login_url)?;
        Ok(Self { client, login_url })
    }

    /// Token endpoint for a tenant: `{login_url}/{tenant_id}/oauth2/token`
    pub fn token_url(&self, tenant_id: &str) -> Result<Url> {
        template::join_base(&self.login_url, &format!("{}/oauth2/token", tenant_id))
    }

    /// Run a client-credentials grant for `resource`
    ///
    /// Any failure, including transport errors and non-success statuses, is
    /// reported as [`SdcmClientError::Authentication`].
    #[instrument(skip(self, credentials), fields(tenant_id = %credentials.tenant_id))]
    pub async fn acquire_token(
        &self,
        credentials: &Credentials,
        resource: &str,
    ) -> Result<AccessToken> {
        let url = self.token_url(&credentials.tenant_id)?;
        debug!("Requesting token from {}", url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("resource", resource),
        ];

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SdcmClientError::authentication(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            SdcmClientError::authentication(format!("failed to read token response: {}", e))
        })?;

        let parsed: Option<TokenResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|r| r.error_description.or(r.error))
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(SdcmClientError::authentication(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let parsed = parsed.ok_or_else(|| {
            SdcmClientError::authentication("token response is not valid JSON")
        })?;

        match parsed.access_token {
            Some(token) => {
                debug!("Token acquired");
                Ok(AccessToken::new(token))
            }
            None => Err(SdcmClientError::authentication(
                "token response has no access_token",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        let provider =
            TokenProvider::new(Client::new(), "https://login.microsoftonline.com").unwrap();
        let url = provider.token_url("contoso.onmicrosoft.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/token"
        );
    }

    #[test]
    fn test_token_url_keeps_login_path_prefix() {
        let provider = TokenProvider::new(Client::new(), "http://sts.local/adfs").unwrap();
        let url = provider.token_url("test-tenant").unwrap();
        assert_eq!(url.as_str(), "http://sts.local/adfs/test-tenant/oauth2/token");
    }

    #[test]
    fn test_invalid_login_url() {
        assert!(TokenProvider::new(Client::new(), "not a url").is_err());
    }
}
