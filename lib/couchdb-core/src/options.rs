//! Query-string options.
//!
//! CouchDB query parameters are an open set defined by the server, so
//! [`Options`] is a dynamically typed map from parameter name to a
//! [`serde_json::Value`]. Encoding follows two rules:
//!
//! - keys listed in the endpoint's JSON keys (e.g. [`VIEW_JSON_KEYS`]) are sent
//!   as JSON literals, because the server parses them as JSON (`startkey`,
//!   `keys`, `open_revs`, ...);
//! - every other key must hold a scalar (string, bool, integer or float),
//!   sent in its natural textual form.
//!
//! `null` is rejected for every key, and arrays or objects are rejected for
//! scalar keys.
//!
//! # Example
//!
//! ```
//! use couchdb_core::{Options, VIEW_JSON_KEYS};
//! use serde_json::json;
//!
//! let options = Options::new()
//!     .set("startkey", json!(["a", "b"]))
//!     .set("limit", 10);
//!
//! let query = options.encode(VIEW_JSON_KEYS).expect("encode");
//! assert_eq!(query, "limit=10&startkey=%5B%22a%22%2C%22b%22%5D");
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::{Error, Result};

/// Options of the document fetch family (`GET /db/doc`, `_bulk_get`) sent as JSON.
pub const GET_JSON_KEYS: &[&str] = &["open_revs", "atts_since"];

/// Options of the view family (views, `_all_docs`) sent as JSON.
pub const VIEW_JSON_KEYS: &[&str] = &["startkey", "start_key", "key", "endkey", "end_key", "keys"];

/// Bytes left untouched in keys and values: ASCII alphanumerics and `-_.~`.
pub(crate) const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn escape(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_ESCAPE).to_string()
}

/// CouchDB query string parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(BTreeMap<String, Value>);

impl Options {
    /// Creates an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, builder style.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets an option, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes an option.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Value of an option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Encode as a query string, without the leading `?`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for a `null` value, or for an array or
    /// object under a key that is not in `json_keys`.
    pub fn encode(&self, json_keys: &[&str]) -> Result<String> {
        encode(self, json_keys)
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Encode options as a query string, without the leading `?`.
///
/// An empty set of options yields an empty string.
///
/// # Errors
///
/// See [`Options::encode`].
pub fn encode(options: &Options, json_keys: &[&str]) -> Result<String> {
    let mut pairs = Vec::with_capacity(options.len());
    for (key, value) in options {
        if value.is_null() {
            return Err(Error::invalid_option(key, "value is null"));
        }
        let encoded = if json_keys.contains(&key.as_str()) {
            let json = serde_json::to_string(value)
                .map_err(|err| Error::invalid_option(key, err.to_string()))?;
            escape(&json)
        } else {
            scalar(key, value)?
        };
        pairs.push(format!("{}={encoded}", escape(key)));
    }
    Ok(pairs.join("&"))
}

fn scalar(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(escape(text)),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number_text(number)),
        Value::Null => Err(Error::invalid_option(key, "value is null")),
        Value::Array(_) => Err(Error::invalid_option(key, "unsupported type: array")),
        Value::Object(_) => Err(Error::invalid_option(key, "unsupported type: object")),
    }
}

/// Integers in base 10, floats in plain decimal notation without an exponent
/// or a trailing `.0`.
fn number_text(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_string();
    }
    number
        .as_f64()
        .map_or_else(|| number.to_string(), |float| format!("{float}"))
}
