//! Core types for the couchdb HTTP client.
//!
//! This crate holds everything that does not perform I/O:
//! - [`Method`], [`Request`] and [`Response`] - HTTP values exchanged with the server
//! - [`HttpClient`] - the capability that executes an exchange
//! - [`Auth`] and [`BasicAuth`] - request authentication strategies
//! - [`Error`], [`ServerError`] and [`Result`] - error handling
//! - [`Options`] - query-string options with per-endpoint JSON keys
//! - [`path`], [`rev_path`], [`opt_path`] - request path building
//! - [`Design`], [`View`] - design documents and their change checksum
//! - [`Security`], [`BulkResults`], [`BulkGet`] - typed API documents
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod auth;
mod body;
mod bulk;
mod client;
mod design;
mod error;
mod method;
mod options;
mod path;
pub mod prelude;
mod request;
mod response;
mod security;

pub use auth::{Auth, BasicAuth};
pub use body::{from_json, to_json};
pub use bulk::{
    BulkDocsRequest, BulkDocsResult, BulkGet, BulkGetDoc, BulkGetEntry, BulkGetError, BulkGetId,
    BulkGetRequest, BulkGetResponse, BulkResults,
};
pub use client::HttpClient;
pub use design::{DESIGN_PREFIX, Design, View};
pub use error::{Error, Result, ServerError};
pub use method::Method;
pub use options::{GET_JSON_KEYS, Options, VIEW_JSON_KEYS, encode};
pub use path::{opt_path, path, rev_path};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use security::{Members, Security};

// Re-export http crate status codes
pub use http::StatusCode;
