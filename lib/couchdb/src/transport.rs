//! Shared request pipeline of server and database handles.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;
use url::Url;

use crate::{Auth, Context, Error, HttpClient, Method, Request, Response, Result, ServerError};

/// Sends requests relative to the server URL and turns error statuses into
/// [`Error::Server`].
///
/// The prefix and HTTP client never change after construction. Only the
/// authentication strategy can be swapped, under a lock that is never held
/// across an await point.
pub struct Transport<C> {
    prefix: String,
    http: C,
    auth: RwLock<Option<Arc<dyn Auth>>>,
}

impl<C> fmt::Debug for Transport<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("prefix", &self.prefix)
            .field("auth", &self.auth.read().is_some())
            .finish_non_exhaustive()
    }
}

/// Server URL as a request prefix: no credentials, query, fragment or
/// trailing slash.
pub(crate) fn normalize_prefix(url: &str) -> Result<String> {
    let mut url = Url::parse(url)?;
    if url.cannot_be_a_base() {
        return Err(Error::invalid_request(format!(
            "not a server URL: {url}"
        )));
    }
    // Cannot fail on a base URL
    let _ = url.set_username("");
    let _ = url.set_password(None);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.as_str().trim_end_matches('/').to_string())
}

impl<C: HttpClient> Transport<C> {
    /// Create a transport for the server at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute server URL.
    pub fn new(url: &str, http: C, auth: Option<Arc<dyn Auth>>) -> Result<Self> {
        Ok(Self {
            prefix: normalize_prefix(url)?,
            http,
            auth: RwLock::new(auth),
        })
    }

    /// Normalized server URL every path is appended to.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Replace the authentication strategy; `None` sends anonymous requests.
    ///
    /// Requests already dispatched keep the credentials they were sent with.
    pub fn set_auth(&self, auth: Option<Arc<dyn Auth>>) {
        *self.auth.write() = auth;
    }

    /// Send a request to `prefix + path`; `path` may carry an encoded query.
    ///
    /// # Errors
    ///
    /// Returns the exchange error unchanged, [`Error::Server`] for any status
    /// of 400 and above, or [`Error::Cancelled`]/[`Error::Timeout`] from `ctx`.
    pub async fn request(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let request = self.build_request(method, path, body)?;
        let url = request.url().to_string();

        debug!(%method, %url, "sending request");
        let response = ctx.run(self.http.execute(request)).await?;

        if response.is_error() {
            let err = ServerError::from_response(method, url, response);
            debug!(%err, "server returned an error");
            return Err(Error::Server(err));
        }
        Ok(response)
    }

    /// Like [`request`](Self::request) with the response body discarded.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request).
    pub async fn closed_request(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let response = self.request(ctx, method, path, body).await?;
        Ok(response.without_body())
    }

    fn build_request(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Request> {
        // Parsed as an `http::Uri` so that dot segments reach CouchDB verbatim
        let url: http::Uri = format!("{}{path}", self.prefix)
            .parse()
            .map_err(|err: http::uri::InvalidUri| Error::invalid_request(err.to_string()))?;

        let mut builder = Request::builder(method, url);
        if let Some(body) = body {
            if method != Method::Get {
                builder = builder.header("Content-Type", "application/json");
            }
            builder = builder.body(body);
        }
        let mut request = builder.build();

        if let Some(auth) = self.auth.read().as_ref() {
            auth.add_auth(&mut request);
        }
        Ok(request)
    }
}
