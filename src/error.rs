// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the Mustekala proxy
//!
//! The four classified proxy failures (validation, policy, network,
//! URL format) surface to the client as HTTP 400 with a structured
//! body; everything else is an internal fault and surfaces as 500.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for Mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Mustekala proxy
#[derive(Error, Debug)]
pub enum Error {
    /// Job carried no target URL, or an empty one
    #[error("Missing endpoint URL to proxy to.")]
    MissingUrl,

    /// Job carried a URL that is not a JSON string
    #[error("URL should be a string.")]
    UrlNotString,

    /// Job payload did not match the expected shape
    #[error("{0}")]
    InvalidPayload(String),

    /// Target host is on the deny-list
    #[error("This URL is not allowed on this proxy.")]
    HostNotAllowed { url: String },

    /// Could not connect to the target at all
    #[error("Error connecting to host at {url}.")]
    EndpointUnreachable { url: String },

    /// Target URL has no scheme
    #[error("Invalid URL: '{url}'. Perhaps you meant 'http://{url}'")]
    MalformedUrl { url: String },

    /// Transport failure from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header value could not be put on the wire
    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid-payload error
    pub fn payload<S: Into<String>>(msg: S) -> Self {
        Error::InvalidPayload(msg.into())
    }

    /// Create a policy rejection for the given URL
    pub fn host_not_allowed(url: impl Into<String>) -> Self {
        Error::HostNotAllowed { url: url.into() }
    }

    /// Create an unreachable-endpoint error for the given URL
    pub fn unreachable(url: impl Into<String>) -> Self {
        Error::EndpointUnreachable { url: url.into() }
    }

    /// Create a missing-scheme error for the given URL
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Error::MalformedUrl { url: url.into() }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this failure is one the client caused and can fix
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingUrl
                | Error::UrlNotString
                | Error::InvalidPayload(_)
                | Error::HostNotAllowed { .. }
                | Error::EndpointUnreachable { .. }
                | Error::MalformedUrl { .. }
        )
    }

    /// HTTP status this error maps to on the proxy endpoint
    pub fn http_status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Machine-readable code for classified errors
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Error::MissingUrl => Some("missing-url"),
            Error::UrlNotString => Some("invalid-url-type"),
            Error::InvalidPayload(_) => Some("invalid-payload"),
            Error::HostNotAllowed { .. } => Some("host-not-allowed"),
            Error::EndpointUnreachable { .. } => Some("endpoint-unreachable"),
            Error::MalformedUrl { .. } => Some("malformed-url"),
            _ => None,
        }
    }

    /// Get the target URL if this error carries one
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::HostNotAllowed { url } => Some(url),
            Error::EndpointUnreachable { url } => Some(url),
            Error::MalformedUrl { url } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
