//! Session login against `/v1/login`

use std::fmt;

use reqwest::header::SET_COOKIE;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::DEFAULT_TENANT;
use crate::errors::{Error, Result};

const SESSION_COOKIE: &str = "sid";

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    tenant: &'a str,
}

/// Session id issued by the server, attached to every request as a cookie
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    sid: String,
}

impl SessionCredential {
    pub fn new<S: Into<String>>(sid: S) -> Self {
        Self { sid: sid.into() }
    }

    /// Value for the `Cookie` request header
    pub fn cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.sid)
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(***)")
    }
}

/// Log in once and return the session credential.
///
/// Success is HTTP 200 with a `sid` cookie in `Set-Cookie`.
pub async fn login(client: &Client, base_url: &str, credentials: &Credentials) -> Result<SessionCredential> {
    let url = format!("{}/v1/login", base_url.trim_end_matches('/'));
    debug!(url = %url, user = %credentials.username, "Logging in to policy server");

    let response = client
        .post(&url)
        .json(&LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
            tenant: DEFAULT_TENANT,
        })
        .send()
        .await?;

    let status = response.status().as_u16();
    if status != 200 {
        let body = response.text().await.unwrap_or_else(|_| "<unable to read body>".to_string());
        return Err(Error::authentication(format!("login failed with HTTP {}: {}", status, body)));
    }

    let sid = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_session_cookie)
        .ok_or_else(|| Error::authentication("login response did not set a session cookie"))?;

    info!(user = %credentials.username, "Session established");
    Ok(SessionCredential::new(sid))
}

/// Extract the `sid` value from one `Set-Cookie` header
fn parse_session_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    if name.trim() == SESSION_COOKIE && !value.trim().is_empty() {
        Some(value.trim().to_string())
    } else {
        None
    }
}
