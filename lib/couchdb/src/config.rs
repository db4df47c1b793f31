//! Transport limits of a [`HyperClient`](crate::HyperClient).
//!
//! These apply to every exchange the client performs. Per-call limits come
//! from the [`Context`](crate::Context) of each operation: when both a
//! request timeout and a context deadline are set, whichever expires first
//! ends the call with [`Error::Timeout`](crate::Error::Timeout).

use std::time::Duration;

/// `User-Agent` sent when the request does not carry one.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Limits and identity of the HTTP client.
///
/// The default request timeout is generous because a view query may wait
/// for CouchDB to build its index. Set it to `None` to rely on context
/// deadlines only.
///
/// ```
/// use std::time::Duration;
///
/// use couchdb::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .no_request_timeout()
///     .connect_timeout(Duration::from_secs(2))
///     .build();
/// assert_eq!(config.request_timeout, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for one exchange, response body included.
    pub request_timeout: Option<Duration>,
    /// Upper bound for establishing a TCP connection.
    pub connect_timeout: Duration,
    /// Idle keep-alive connections kept per CouchDB node.
    pub max_idle_per_host: usize,
    /// How long an idle connection stays in the pool.
    pub idle_timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(120)),
            connect_timeout: Duration::from_secs(5),
            max_idle_per_host: 16,
            idle_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl From<ClientConfig> for ClientConfigBuilder {
    fn from(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ClientConfigBuilder {
    /// Bound every exchange by `timeout`.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Let exchanges run until the context ends them.
    #[must_use]
    pub fn no_request_timeout(mut self) -> Self {
        self.config.request_timeout = None;
        self
    }

    /// Bound connection establishment by `timeout`.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Keep at most `count` idle connections per node.
    #[must_use]
    pub fn max_idle_per_host(mut self, count: usize) -> Self {
        self.config.max_idle_per_host = count;
        self
    }

    /// Close idle connections after `timeout`.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Identify the client with `user_agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
