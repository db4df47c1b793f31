//! Database handle.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    BulkDocsRequest, BulkGet, BulkGetRequest, BulkGetResponse, BulkResults, Context,
    DESIGN_PREFIX, Design, GET_JSON_KEYS, HttpClient, HyperClient, Method, Options, Result,
    Security, VIEW_JSON_KEYS, opt_path, path, rev_path, to_json, transport::Transport,
};

/// A remote CouchDB database, obtained from [`Client::db`](crate::Client::db).
///
/// Shares the transport, and so the authentication, of the client it came
/// from.
pub struct Database<C = HyperClient> {
    transport: Arc<Transport<C>>,
    name: String,
}

impl<C> Clone for Database<C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            name: self.name.clone(),
        }
    }
}

impl<C> fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("transport", &self.transport)
            .finish()
    }
}

impl<C: HttpClient> Database<C> {
    pub(crate) fn new(transport: Arc<Transport<C>>, name: String) -> Self {
        Self { transport, name }
    }

    /// Database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch a document.
    ///
    /// Some fields, such as `_conflicts`, are only returned when `options`
    /// ask for them. `open_revs` and `atts_since` are sent as JSON.
    ///
    /// # Errors
    ///
    /// Returns an option encoding, exchange, server or decoding error; a
    /// missing document gives an error for which
    /// [`is_not_found`](crate::Error::is_not_found) holds.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        id: &str,
        options: &Options,
    ) -> Result<T> {
        let path = opt_path(options, GET_JSON_KEYS, [self.name.as_str(), id])?;
        self.transport
            .request(ctx, Method::Get, &path, None)
            .await?
            .json()
    }

    /// Current revision of a document, read from a HEAD request.
    ///
    /// # Errors
    ///
    /// Returns the exchange or server error, or
    /// [`Error::MissingRevision`](crate::Error::MissingRevision).
    pub async fn rev(&self, ctx: &Context, id: &str) -> Result<String> {
        self.transport
            .closed_request(ctx, Method::Head, &path([self.name.as_str(), id]), None)
            .await?
            .revision()
    }

    /// Store a new document with a server-assigned id.
    ///
    /// Returns the id and revision of the stored document.
    ///
    /// # Errors
    ///
    /// Returns a serialization, exchange, server or decoding error.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        doc: &T,
    ) -> Result<(String, String)> {
        let body = to_json(doc)?;
        self.transport
            .request(ctx, Method::Post, &path([self.name.as_str()]), Some(body))
            .await?
            .id_and_revision()
    }

    /// Store a document under `id`; `rev` is the revision being replaced,
    /// empty for a new document.
    ///
    /// Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns a serialization, exchange or server error (409 on a revision
    /// conflict), or [`Error::MissingRevision`](crate::Error::MissingRevision).
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        id: &str,
        doc: &T,
        rev: &str,
    ) -> Result<String> {
        let body = to_json(doc)?;
        let path = rev_path(rev, [self.name.as_str(), id]);
        self.transport
            .closed_request(ctx, Method::Put, &path, Some(body))
            .await?
            .revision()
    }

    /// Mark revision `rev` of a document as deleted.
    ///
    /// Returns the revision of the deletion.
    ///
    /// # Errors
    ///
    /// Returns the exchange or server error, or
    /// [`Error::MissingRevision`](crate::Error::MissingRevision).
    pub async fn delete(&self, ctx: &Context, id: &str, rev: &str) -> Result<String> {
        let path = rev_path(rev, [self.name.as_str(), id]);
        self.transport
            .closed_request(ctx, Method::Delete, &path, None)
            .await?
            .revision()
    }

    /// Fetch several documents at once.
    ///
    /// Found documents are decoded into fresh values of `T`; ids the server
    /// could not return end up in [`BulkGet::not_found`].
    ///
    /// # Errors
    ///
    /// Returns an option encoding, exchange, server or decoding error.
    pub async fn bulk_get<T, I, S>(
        &self,
        ctx: &Context,
        ids: I,
        options: &Options,
    ) -> Result<BulkGet<T>>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path = opt_path(options, GET_JSON_KEYS, [self.name.as_str(), "_bulk_get"])?;
        let body = to_json(&ids.into_iter().collect::<BulkGetRequest>())?;
        self.transport
            .request(ctx, Method::Post, &path, Some(body))
            .await?
            .json::<BulkGetResponse>()?
            .into_docs()
    }

    /// Create, update or delete several documents in one request.
    ///
    /// Each document may carry `_id`, `_rev` and `_deleted`. Per-document
    /// failures are reported in the results, matched by id; the server does
    /// not guarantee any processing order.
    ///
    /// # Errors
    ///
    /// Returns a serialization, exchange, server or decoding error; rejected
    /// documents are not errors.
    pub async fn bulk_docs<T: Serialize>(&self, ctx: &Context, docs: &[T]) -> Result<BulkResults> {
        let body = to_json(&BulkDocsRequest { docs })?;
        self.transport
            .request(
                ctx,
                Method::Post,
                &path([self.name.as_str(), "_bulk_docs"]),
                Some(body),
            )
            .await?
            .json()
    }

    /// Security object of the database.
    ///
    /// # Errors
    ///
    /// Returns the exchange, server or decoding error.
    pub async fn security(&self, ctx: &Context) -> Result<Security> {
        let response = self
            .transport
            .request(
                ctx,
                Method::Get,
                &path([self.name.as_str(), "_security"]),
                None,
            )
            .await?;
        if response.body().is_empty() {
            return Ok(Security::default());
        }
        response.json()
    }

    /// Replace the security object of the database.
    ///
    /// # Errors
    ///
    /// Returns a serialization, exchange or server error.
    pub async fn put_security(&self, ctx: &Context, security: &Security) -> Result<()> {
        let body = to_json(security)?;
        self.transport
            .closed_request(
                ctx,
                Method::Put,
                &path([self.name.as_str(), "_security"]),
                Some(body),
            )
            .await?;
        Ok(())
    }

    /// Query a view.
    ///
    /// `ddoc` names the design document, with or without its `_design/`
    /// prefix. Keys such as `startkey` or `keys` are sent as JSON.
    ///
    /// # Errors
    ///
    /// Returns an option encoding, exchange, server or decoding error.
    pub async fn view<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        ddoc: &str,
        view: &str,
        options: &Options,
    ) -> Result<T> {
        let path = self.view_path(ddoc, view, options)?;
        self.transport
            .request(ctx, Method::Get, &path, None)
            .await?
            .json()
    }

    /// Query a view with a JSON body, such as `{"keys": [...]}`.
    ///
    /// CouchDB only reads `keys` from the body; other parameters still go
    /// in `options`.
    ///
    /// # Errors
    ///
    /// Returns an option encoding, serialization, exchange, server or
    /// decoding error.
    pub async fn post_view<T, P>(
        &self,
        ctx: &Context,
        ddoc: &str,
        view: &str,
        options: &Options,
        payload: &P,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let path = self.view_path(ddoc, view, options)?;
        let body = to_json(payload)?;
        self.transport
            .request(ctx, Method::Post, &path, Some(body))
            .await?
            .json()
    }

    /// Query the `_all_docs` view.
    ///
    /// # Errors
    ///
    /// Returns an option encoding, exchange, server or decoding error.
    pub async fn all_docs<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        options: &Options,
    ) -> Result<T> {
        let path = opt_path(options, VIEW_JSON_KEYS, [self.name.as_str(), "_all_docs"])?;
        self.transport
            .request(ctx, Method::Get, &path, None)
            .await?
            .json()
    }

    /// Create or update a design document, skipping the write when the views
    /// stored on the server are the same.
    ///
    /// On return `design.rev` holds the revision stored on the server. If
    /// the write fails the revision is left empty.
    ///
    /// # Errors
    ///
    /// Returns any error other than not-found from reading the current
    /// design, then any error from writing it.
    pub async fn sync_design(&self, ctx: &Context, design: &mut Design) -> Result<()> {
        let remote = match self.get::<Design>(ctx, &design.id, &Options::new()).await {
            Ok(remote) => Some(remote),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err),
        };

        let remote_rev = match remote {
            Some(remote) if !remote.rev.is_empty() => {
                if remote.view_checksum() == design.view_checksum() {
                    debug!(db = %self.name, design = %design.id, action = "unchanged", "syncing design");
                    design.rev = remote.rev;
                    return Ok(());
                }
                remote.rev
            }
            _ => String::new(),
        };

        let action = if remote_rev.is_empty() { "create" } else { "update" };
        debug!(db = %self.name, design = %design.id, action, "syncing design");

        // A revision from another database must not leak into the body
        design.rev.clear();
        let rev = self.put(ctx, &design.id, &*design, &remote_rev).await?;
        design.rev = rev;
        Ok(())
    }

    fn view_path(&self, ddoc: &str, view: &str, options: &Options) -> Result<String> {
        let ddoc = ddoc.strip_prefix(DESIGN_PREFIX).unwrap_or(ddoc);
        opt_path(
            options,
            VIEW_JSON_KEYS,
            [self.name.as_str(), "_design", ddoc, "_view", view],
        )
    }
}
