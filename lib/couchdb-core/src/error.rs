//! Error types for the CouchDB client.
//!
//! CouchDB reports API-level failures as an HTTP status of 400 or above with a
//! body of the form `{"error": <code>, "reason": <message>}`. Those become
//! [`Error::Server`] carrying a [`ServerError`]; every other variant describes
//! a failure on the client side of the exchange.

use std::fmt;

use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::{Method, Response};

// ============================================================================
// Server Error
// ============================================================================

/// An error reported by the CouchDB server.
///
/// `error` and `reason` are always `None` for HEAD requests, whose responses
/// carry no body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ServerError {
    /// HTTP method of the request.
    pub method: Method,
    /// Full URL of the request.
    pub url: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Error code provided by CouchDB (e.g. `not_found`, `conflict`).
    pub error: Option<String>,
    /// Error message provided by CouchDB.
    pub reason: Option<String>,
}

impl ServerError {
    /// Build the error for a failed response.
    ///
    /// A body that cannot be decoded does not hide the status: both `error`
    /// and `reason` then describe the decoding failure.
    #[must_use]
    pub fn from_response(method: Method, url: impl Into<String>, response: Response) -> Self {
        #[derive(Deserialize)]
        struct Reply {
            error: Option<String>,
            reason: Option<String>,
        }

        let status = response.status();
        let (error, reason) = if method.is_head() {
            (None, None)
        } else {
            match response.json::<Reply>() {
                Ok(reply) => (reply.error, reply.reason),
                Err(err) => {
                    let unknown = format!("unknown, couldn't decode CouchDB error: {err}");
                    (Some(unknown.clone()), Some(unknown))
                }
            }
        };

        Self {
            method,
            url: url.into(),
            status,
            error,
            reason,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{} {}: {}", self.method, self.url, self.status),
            Some(error) => write!(
                f,
                "{} {}: ({}) {}: {}",
                self.method,
                self.url,
                self.status,
                error,
                self.reason.as_deref().unwrap_or_default()
            ),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for CouchDB operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a status code of 400 or above.
    #[display("{_0}")]
    #[from]
    Server(#[error(not(source))] ServerError),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout or elapsed deadline.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The caller cancelled the request.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A query option could not be encoded.
    #[display("invalid option {key:?}: {reason}")]
    #[from(skip)]
    InvalidOption {
        /// The offending option name.
        key: String,
        /// Why the value cannot be represented.
        reason: String,
    },

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "results[0].docs").
        path: String,
        /// Error message.
        message: String,
    },

    /// A successful response lacked the `ETag` revision header.
    #[display("missing ETag header in response")]
    #[from(skip)]
    MissingRevision,

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid option error.
    #[must_use]
    pub fn invalid_option(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The server error, if the server rejected the request.
    #[must_use]
    pub const fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if the server rejected the request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server(err) => Some(err.status),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the request with `status`.
    #[must_use]
    pub fn has_status(&self, status: u16) -> bool {
        self.status() == Some(status)
    }

    /// Returns `true` for a 404 Not Found server error.
    ///
    /// Useful for conditional creation of databases and documents.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.has_status(404)
    }

    /// Returns `true` for a 401 Unauthorized server error.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.has_status(401)
    }

    /// Returns `true` for a 409 Conflict server error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.has_status(409)
    }

    /// Returns `true` if the exchange itself failed (network, TLS, timeout, cancellation).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Tls(_) | Self::Timeout | Self::Cancelled
        )
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if the caller cancelled the request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
