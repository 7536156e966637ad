//! # Authenticated Transport
//!
//! The one seam between the reconciliation core and the network. A
//! [`Transport`] sends a single request with the session credential already
//! attached and hands back the raw status and body; it never interprets
//! statuses and never retries. Connection-level failures surface as
//! [`Error::Transport`](crate::errors::Error::Transport).

pub mod http;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use reqwest::Method;

use crate::errors::Result;

pub use http::HttpTransport;
pub use session::{login, Credentials, SessionCredential};

/// One request against the policy server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    /// Path below the server base URL, starting with `/`
    pub path: String,
    /// JSON body, if any
    pub body: Option<String>,
}

impl TransportRequest {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self { method, path: path.into(), body: None }
    }

    pub fn with_body<B: Into<String>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Raw response; status interpretation belongs to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends authenticated requests to the policy server
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}
