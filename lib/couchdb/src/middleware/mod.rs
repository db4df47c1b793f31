//! Tower middleware layers for the HTTP client.
//!
//! Layers wrap the hyper client and see every exchange, including the ones
//! answered with an error status. Add them with
//! [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer):
//!
//! ```
//! use std::time::Duration;
//!
//! use couchdb::HyperClient;
//! use couchdb::middleware::{ConcurrencyLimitLayer, LoggingLayer};
//!
//! let http = HyperClient::builder()
//!     .layer(LoggingLayer::new())
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//! # drop(http);
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::limit::ConcurrencyLimitLayer;
pub use tower::{Layer, ServiceBuilder};
