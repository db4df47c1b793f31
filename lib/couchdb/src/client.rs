//! Server handle.

use std::fmt;
use std::sync::Arc;

use crate::{
    Auth, Context, Database, HttpClient, HyperClient, Method, Result, path,
    transport::Transport,
};

/// A remote CouchDB server.
///
/// Cheap to clone: clones and every [`Database`] obtained from them share one
/// transport, including its authentication.
///
/// # Example
///
/// ```no_run
/// use couchdb::{BasicAuth, Client, Context};
///
/// # async fn run() -> couchdb::Result<()> {
/// let client = Client::from_url("http://localhost:5984")?;
/// client.set_auth(Some(std::sync::Arc::new(BasicAuth::new("admin", "secret"))));
///
/// let ctx = Context::background();
/// let db = client.ensure_db(&ctx, "albums").await?;
/// assert_eq!(db.name(), "albums");
/// # Ok(())
/// # }
/// ```
pub struct Client<C = HyperClient> {
    transport: Arc<Transport<C>>,
}

impl<C> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<C> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .finish()
    }
}

impl Client<HyperClient> {
    /// Client for `url` over a default [`HyperClient`], without authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute server URL.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(url, HyperClient::new(), None)
    }
}

impl<C: HttpClient> Client<C> {
    /// Client for the server at `url`.
    ///
    /// Only scheme, host, port and path of `url` are kept: credentials, query
    /// and fragment are dropped, and so is a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute server URL.
    pub fn new(url: &str, http: C, auth: Option<Arc<dyn Auth>>) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(Transport::new(url, http, auth)?),
        })
    }

    /// Server URL prefix, without trailing slash.
    #[must_use]
    pub fn url(&self) -> &str {
        self.transport.prefix()
    }

    /// Replace the authentication used by this client and all its databases.
    ///
    /// Credentials are not checked until the next request.
    pub fn set_auth(&self, auth: Option<Arc<dyn Auth>>) {
        self.transport.set_auth(auth);
    }

    /// Handle to a database; its existence is not checked.
    #[must_use]
    pub fn db(&self, name: impl Into<String>) -> Database<C> {
        Database::new(Arc::clone(&self.transport), name.into())
    }

    /// Check that the server is alive.
    ///
    /// # Errors
    ///
    /// Returns the exchange or server error.
    pub async fn ping(&self, ctx: &Context) -> Result<()> {
        self.transport
            .closed_request(ctx, Method::Head, "/", None)
            .await?;
        Ok(())
    }

    /// Create a database.
    ///
    /// # Errors
    ///
    /// Fails with status 412 if the database already exists.
    pub async fn create_db(&self, ctx: &Context, name: &str) -> Result<Database<C>> {
        self.transport
            .closed_request(ctx, Method::Put, &path([name]), None)
            .await?;
        Ok(self.db(name))
    }

    /// Create a database split into `shards` shards.
    ///
    /// # Errors
    ///
    /// Fails with status 412 if the database already exists.
    pub async fn create_db_with_shards(
        &self,
        ctx: &Context,
        name: &str,
        shards: u32,
    ) -> Result<Database<C>> {
        let target = format!("{}?q={shards}", path([name]));
        self.transport
            .closed_request(ctx, Method::Put, &target, None)
            .await?;
        Ok(self.db(name))
    }

    /// Create a database unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns any failure other than status 412.
    pub async fn ensure_db(&self, ctx: &Context, name: &str) -> Result<Database<C>> {
        match self.create_db(ctx, name).await {
            Err(err) if err.has_status(412) => Ok(self.db(name)),
            result => result,
        }
    }

    /// Delete a database.
    ///
    /// # Errors
    ///
    /// Returns the exchange or server error, 404 if there is no such database.
    pub async fn delete_db(&self, ctx: &Context, name: &str) -> Result<()> {
        self.transport
            .closed_request(ctx, Method::Delete, &path([name]), None)
            .await?;
        Ok(())
    }

    /// Names of all databases.
    ///
    /// # Errors
    ///
    /// Returns the exchange or server error, or a decoding error.
    pub async fn all_dbs(&self, ctx: &Context) -> Result<Vec<String>> {
        self.transport
            .request(ctx, Method::Get, "/_all_dbs", None)
            .await?
            .json()
    }
}
