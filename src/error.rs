// File: ./src/error.rs
//! Crate-wide error type.
//!
//! A 304 Not Modified is deliberately *not* represented here; it is a valid
//! outcome of a conditional fetch and is modelled as
//! [`crate::client::FetchOutcome::NotModified`].
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An `updated` field failed to parse during a chronological sort or a
    /// freshness comparison. The offending value is preserved verbatim.
    #[error("malformed timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The remote service answered with a non-success status.
    #[error("remote service returned {status}: {body}")]
    Status {
        status: http::StatusCode,
        body: String,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("invalid request: {0}")]
    Http(#[from] http::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The client-secret file is unreadable or missing required fields.
    #[error("malformed client secret: {0}")]
    Credentials(String),

    /// The stored token has expired and carries no refresh token, so no
    /// usable credential can be produced from it.
    #[error("token expired and no refresh token is available")]
    TokenExpired,
}

pub type Result<T> = std::result::Result<T, Error>;
