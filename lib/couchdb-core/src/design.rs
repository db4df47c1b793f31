//! Design documents.
//!
//! A [`Design`] is built locally and pushed with `Database::sync_design`,
//! which compares [`Design::view_checksum`] with the remote copy so that an
//! unchanged definition never triggers a write (and the index rebuild that
//! follows every new revision).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Id prefix of every design document.
pub const DESIGN_PREFIX: &str = "_design/";

/// A view: a map function and an optional reduce function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// Map function source.
    pub map: String,
    /// Reduce function source, or a built-in such as `_sum`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

impl View {
    /// A view without reduce function.
    pub fn new(map: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            reduce: None,
        }
    }

    /// Set the reduce function.
    #[must_use]
    pub fn reduce(mut self, reduce: impl Into<String>) -> Self {
        self.reduce = Some(reduce.into());
        self
    }
}

/// A design document holding view definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    /// Document id, always starting with `_design/`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Current revision; empty until the design has been stored or fetched.
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    /// Language of the view functions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    /// Views by name.
    #[serde(default)]
    pub views: BTreeMap<String, View>,
}

impl Design {
    /// A new JavaScript design document; `name` may omit the `_design/` prefix.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let name = name.strip_prefix(DESIGN_PREFIX).unwrap_or(name);
        Self {
            id: format!("{DESIGN_PREFIX}{name}"),
            rev: String::new(),
            language: "javascript".to_string(),
            views: BTreeMap::new(),
        }
    }

    /// Name of the design document, without the `_design/` prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.strip_prefix(DESIGN_PREFIX).unwrap_or(&self.id)
    }

    /// Add or replace a view.
    pub fn add_view(&mut self, name: impl Into<String>, view: View) -> &mut Self {
        self.views.insert(name.into(), view);
        self
    }

    /// Add or replace a view, builder style.
    #[must_use]
    pub fn with_view(mut self, name: impl Into<String>, view: View) -> Self {
        self.add_view(name, view);
        self
    }

    /// Hex SHA-256 of the view definitions, used to detect changes.
    ///
    /// Independent of id, revision and language. An empty reduce function
    /// counts as no reduce function.
    #[must_use]
    pub fn view_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, view) in &self.views {
            feed(&mut hasher, name);
            feed(&mut hasher, &view.map);
            match view.reduce.as_deref().filter(|reduce| !reduce.is_empty()) {
                Some(reduce) => {
                    hasher.update([1]);
                    feed(&mut hasher, reduce);
                }
                None => hasher.update([0]),
            }
        }
        format!("{:x}", hasher.finalize())
    }
}

// Length-prefixed so that ("ab", "c") and ("a", "bc") hash differently
fn feed(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}
