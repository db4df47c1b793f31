//! Async client for the CouchDB HTTP API.
//!
//! A [`Client`] stands for a server and hands out [`Database`] handles; both
//! share one transport that prefixes paths with the server URL, applies the
//! current [`Auth`] and maps error statuses to [`Error::Server`]. Every
//! operation takes a [`Context`] for cancellation and deadlines.
//!
//! # Example
//!
//! ```no_run
//! use couchdb::{Client, Context, Options};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Album {
//!     title: String,
//!     year: u16,
//! }
//!
//! # async fn run() -> couchdb::Result<()> {
//! let client = Client::from_url("http://localhost:5984")?;
//! let ctx = Context::background();
//! let db = client.ensure_db(&ctx, "albums").await?;
//!
//! let album = Album { title: "Blue Train".into(), year: 1957 };
//! let rev = db.put(&ctx, "blue-train", &album, "").await?;
//!
//! let stored: Album = db.get(&ctx, "blue-train", &Options::new()).await?;
//! assert_eq!(stored.year, album.year);
//! db.delete(&ctx, "blue-train", &rev).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connector;
mod context;
mod database;
mod http_client;
pub mod middleware;
pub mod prelude;
mod transport;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_USER_AGENT};
pub use context::Context;
pub use database::Database;
pub use http_client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use transport::Transport;

// Re-export tower for middleware composition
pub use tower;

// Re-export cancellation token used by `Context`
pub use tokio_util::sync::CancellationToken;

// Re-export core types
pub use couchdb_core::{
    Auth, BasicAuth, BulkDocsRequest, BulkDocsResult, BulkGet, BulkGetDoc, BulkGetEntry,
    BulkGetError, BulkGetId, BulkGetRequest, BulkGetResponse, BulkResults, DESIGN_PREFIX, Design,
    Error, GET_JSON_KEYS, HttpClient, Members, Method, Options, Request, RequestBuilder, Response,
    Result, Security, ServerError, StatusCode, VIEW_JSON_KEYS, View, encode, from_json, opt_path,
    path, rev_path, to_json,
};
