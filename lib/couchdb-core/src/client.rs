//! HTTP exchange capability.
//!
//! The CouchDB client does not open sockets itself: it hands each fully
//! formed [`Request`] to an [`HttpClient`] and receives a buffered
//! [`Response`]. The `couchdb` crate ships a hyper-based implementation;
//! tests and embedders can plug in their own.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations own connection pooling and TLS. They must return every
/// response they receive, whatever its status; classifying statuses is the
/// caller's job.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
