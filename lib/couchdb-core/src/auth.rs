//! Authentication strategies.
//!
//! An [`Auth`] decorates each outgoing request right before it is sent.
//! [`BasicAuth`] ships with the crate; implement the trait for other schemes
//! (cookie, proxy, bearer token, ...).

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::Request;

/// Something that can add authentication information to an outgoing request.
///
/// # Example
///
/// ```
/// use couchdb_core::{Auth, Request};
///
/// struct ProxyAuth {
///     user: String,
/// }
///
/// impl Auth for ProxyAuth {
///     fn add_auth(&self, request: &mut Request) {
///         request.set_header("X-Auth-CouchDB-UserName", self.user.clone());
///     }
/// }
/// ```
pub trait Auth: Send + Sync {
    /// Add credentials to the request, in place.
    fn add_auth(&self, request: &mut Request);
}

impl<A: Auth + ?Sized> Auth for Arc<A> {
    fn add_auth(&self, request: &mut Request) {
        (**self).add_auth(request);
    }
}

/// HTTP basic authentication: `Authorization: Basic <base64(user:password)>`.
#[derive(Clone)]
pub struct BasicAuth {
    /// Base64-encoded "username:password".
    encoded_credentials: Arc<str>,
}

impl BasicAuth {
    /// Create basic credentials from a username and password.
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        let credentials = format!("{}:{}", username.as_ref(), password.as_ref());
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        Self {
            encoded_credentials: Arc::from(encoded),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth").finish_non_exhaustive()
    }
}

impl Auth for BasicAuth {
    fn add_auth(&self, request: &mut Request) {
        request.set_header("Authorization", format!("Basic {}", self.encoded_credentials));
    }
}
