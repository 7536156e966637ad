//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use tracing::{debug, trace};

use super::session::{login, Credentials, SessionCredential};
use super::{Transport, TransportRequest, TransportResponse};
use crate::config::ProviderSettings;
use crate::errors::{Error, Result};

/// Authenticated HTTP client for the policy server
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    session: SessionCredential,
}

impl HttpTransport {
    /// Build the client from settings and log in once
    pub async fn connect(settings: &ProviderSettings) -> Result<Self> {
        let client = build_client(settings)?;
        let credentials =
            Credentials { username: settings.user.clone(), password: settings.password.clone() };
        let session = login(&client, settings.base_url(), &credentials).await?;
        Ok(Self::with_session(client, settings.base_url(), session))
    }

    /// Wrap an existing client and session
    pub fn with_session<S: Into<String>>(client: Client, base_url: S, session: SessionCredential) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url, session }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// reqwest client honoring the timeout and TLS verification settings
pub fn build_client(settings: &ProviderSettings) -> Result<Client> {
    Client::builder()
        .timeout(settings.timeout())
        .danger_accept_invalid_certs(settings.insecure)
        .build()
        .map_err(|e| Error::Transport {
            message: format!("Failed to build HTTP client: {}", e),
            source: Some(e),
        })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(COOKIE, self.session.cookie_header());
        if let Some(body) = request.body {
            trace!(body = %body, "Request body");
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, "Received response");
        trace!(body = %body, "Response body");

        Ok(TransportResponse { status, body })
    }
}
