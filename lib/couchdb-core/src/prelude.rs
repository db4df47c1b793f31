//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use couchdb_core::prelude::*;
//! ```

pub use crate::{
    Auth, BasicAuth, BulkGet, BulkResults, Design, Error, HttpClient, Method, Options, Request,
    Response, Result, Security, ServerError, View,
};
