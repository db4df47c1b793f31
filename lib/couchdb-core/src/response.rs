//! HTTP response handling and the CouchDB response decoders.
//!
//! [`Response`] gives access to status, headers, and the buffered body. The
//! decoders consume the response, so the body is released whatever the
//! outcome of decoding:
//!
//! - [`Response::revision`] reads the revision from the `ETag` header,
//! - [`Response::id_and_revision`] reads `{"id", "rev"}` from the JSON body,
//! - [`Response::json`] decodes the whole body into a caller type.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Deserialize;

use crate::{Error, Result};

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::request::find_header(&self.headers, name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Drop the body, keeping status and headers.
    #[must_use]
    pub fn without_body(self) -> Self {
        Self {
            body: Bytes::new(),
            ..self
        }
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 400 or above, which CouchDB reports as an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the body does not match `T`.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        crate::from_json(&self.body)
    }

    /// The document revision carried by the `ETag` header, without its quotes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRevision`] if the header is absent.
    pub fn revision(self) -> Result<String> {
        let etag = self.header("ETag").ok_or(Error::MissingRevision)?;
        Ok(etag.trim_matches('"').to_string())
    }

    /// The `id` and `rev` fields of a write acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the body has no such fields.
    pub fn id_and_revision(self) -> Result<(String, String)> {
        #[derive(Deserialize)]
        struct IdRev {
            id: String,
            rev: String,
        }

        let IdRev { id, rev } = self.json()?;
        Ok((id, rev))
    }
}
