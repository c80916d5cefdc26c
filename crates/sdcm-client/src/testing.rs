//! Test utilities for sdcm-client
//!
//! Runs an axum router on an ephemeral local port and hands back a client
//! whose identity and management endpoints both point at it.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::SdcmConfigBuilder;
use crate::{Credentials, Result, SdcmClient, SdcmConfig};

/// Tenant id the test client authenticates as
pub const TEST_TENANT_ID: &str = "test-tenant";
/// Client id the test client authenticates as
pub const TEST_CLIENT_ID: &str = "test-client";
/// Client secret the test client authenticates with
pub const TEST_CLIENT_SECRET: &str = "test-secret";

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: SdcmClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a server with a client that polls every 10ms
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::post, Json, Router};
    /// use sdcm_client::testing::TestServer;
    ///
    /// let router = Router::new().route(
    ///     "/{tenant}/oauth2/token",
    ///     post(|| async { Json(serde_json::json!({"access_token": "t"})) }),
    /// );
    /// let mut server = TestServer::start(router).await?;
    /// server.client.setup_access_token().await?;
    /// ```
    pub async fn start<S>(router: axum::Router<S>) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        Self::start_with_config(router, SdcmConfig::builder().poll_interval_ms(10)).await
    }

    /// Start a server; endpoint URLs in `config` are replaced with the
    /// server's own address
    pub async fn start_with_config<S>(
        router: axum::Router<S>,
        config: SdcmConfigBuilder,
    ) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let config = config
            .login_url(base_url.clone())
            .api_url(base_url)
            .build();
        let client = SdcmClient::with_config(
            Credentials::new(TEST_TENANT_ID, TEST_CLIENT_ID, TEST_CLIENT_SECRET),
            config,
        )?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
