// File: ./src/client/auth.rs
//! OAuth credential handling: turn a stored token blob into a usable bearer
//! credential, refreshing it when expired.
//!
//! The credential handle is an explicit value the caller threads into the
//! transport; there is no process-wide authorization state. A handle lives
//! for one authorized session. Once its access token expires, derive a fresh
//! one from the stored blob.
use crate::client::transport::{PlainClient, plain_https_client};
use crate::error::{Error, Result};

use chrono::{DateTime, Duration, Utc};
use http::{Method, Request};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower::ServiceExt;

pub const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";
pub const TASKS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/tasks.readonly";

const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// The relevant fields of an installed-app client-secret file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// A stored OAuth token. Serialized as the opaque blob callers persist;
/// the field names follow the conventional token JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Absolute expiry of the access token; `None` means unknown, which is
    /// treated as still valid.
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry, Some(e) if e <= now)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(blob: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(blob)?)
    }
}

/// What the token endpoint answers to an exchange or refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<&str>, now: DateTime<Utc>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string))
                .unwrap_or_default(),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expiry: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

/// A usable bearer credential for one authorized session.
#[derive(Debug, Clone)]
pub struct AccessHandle {
    token: Token,
}

impl AccessHandle {
    /// Wraps a token the caller obtained and validated on its own, e.g. one
    /// freshly decoded from a blob known to be current.
    pub fn from_token(token: Token) -> Self {
        Self { token }
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_expired(Utc::now())
    }

    /// The blob to persist so the next session can resume without a new
    /// authorization-code exchange.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.token.encode()
    }
}

/// Performs the authorization-code and refresh-token flows against the
/// token endpoint named in the client secret.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: ClientSecret,
    scope: String,
    http: PlainClient,
}

impl Authenticator {
    pub fn from_client_secret_path(path: impl AsRef<Path>, scope: &str) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_client_secret_json(&bytes, scope)
    }

    /// Accepts both `"installed"` and `"web"` client-secret layouts.
    pub fn from_client_secret_json(bytes: &[u8], scope: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_slice(bytes)?;
        let secret = file
            .installed
            .or(file.web)
            .ok_or_else(|| Error::Credentials("no installed or web section".to_string()))?;
        Ok(Self {
            secret,
            scope: scope.to_string(),
            http: plain_https_client()?,
        })
    }

    fn redirect_uri(&self) -> &str {
        self.secret
            .redirect_uris
            .first()
            .map_or(OOB_REDIRECT_URI, String::as_str)
    }

    /// The URL to send the user to for the authorization-code grant.
    pub fn auth_code_url(&self, state: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.secret.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", self.redirect_uri())
            .append_pair("scope", &self.scope)
            .append_pair("access_type", "offline")
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Exchanges an authorization code for a token and returns the opaque
    /// blob the caller should persist.
    pub async fn exchange(&self, auth_code: &str) -> Result<Vec<u8>> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "authorization_code")
            .append_pair("code", auth_code)
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("client_secret", &self.secret.client_secret)
            .append_pair("redirect_uri", self.redirect_uri())
            .finish();
        let token = self.token_request(form).await?;
        token.encode()
    }

    /// Produces a usable credential from a stored blob, refreshing through
    /// the refresh-token grant when the access token has expired.
    pub async fn access(&self, token_blob: &[u8]) -> Result<AccessHandle> {
        let token = Token::decode(token_blob)?;
        if !token.is_expired(Utc::now()) {
            return Ok(AccessHandle { token });
        }
        if token.refresh_token.is_empty() {
            return Err(Error::TokenExpired);
        }

        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", &token.refresh_token)
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("client_secret", &self.secret.client_secret)
            .finish();
        let refreshed = self
            .token_request_with_refresh(form, Some(&token.refresh_token))
            .await?;
        Ok(AccessHandle { token: refreshed })
    }

    async fn token_request(&self, form: String) -> Result<Token> {
        self.token_request_with_refresh(form, None).await
    }

    async fn token_request_with_refresh(
        &self,
        form: String,
        previous_refresh: Option<&str>,
    ) -> Result<Token> {
        log::debug!("POST {}", self.secret.token_uri);
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.secret.token_uri.as_str())
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form)?;

        let response = self.http.clone().oneshot(request).await?;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        if !parts.status.is_success() {
            return Err(Error::Status {
                status: parts.status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let answer: TokenResponse = serde_json::from_slice(&bytes)?;
        Ok(answer.into_token(previous_refresh, Utc::now()))
    }
}
