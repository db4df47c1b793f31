//! Prelude module for convenient imports.
//!
//! ```
//! use couchdb::prelude::*;
//! ```

pub use crate::{
    Auth, BasicAuth, BulkGet, BulkResults, CancellationToken, Client, Context, Database, Design,
    Error, HttpClient, HyperClient, Options, Result, Security, View,
};
pub use serde::{Deserialize, Serialize};
