//! Bulk operations (`_bulk_docs`, `_bulk_get`).
//!
//! The server does not promise that results come back in request order, so
//! results are looked up by document id rather than by position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a `_bulk_docs` request: `{"docs": [...]}`.
///
/// Each document may carry `_id`, `_rev` and `_deleted` to select between
/// create, update and delete.
#[derive(Debug, Serialize)]
pub struct BulkDocsRequest<'a, T> {
    /// Documents to write.
    pub docs: &'a [T],
}

/// Outcome of one document in a `_bulk_docs` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDocsResult {
    /// `true` if the write succeeded.
    #[serde(default)]
    pub ok: bool,
    /// Document id.
    pub id: String,
    /// New revision, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Error code (e.g. `conflict`), on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error message, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BulkDocsResult {
    /// Returns `true` if the write failed with a revision conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.error.as_deref() == Some("conflict")
    }
}

/// Per-document outcomes of a `_bulk_docs` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BulkResults(Vec<BulkDocsResult>);

impl BulkResults {
    /// Results in the order the server sent them.
    pub fn iter(&self) -> std::slice::Iter<'_, BulkDocsResult> {
        self.0.iter()
    }

    /// Result for a document id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BulkDocsResult> {
        self.0.iter().find(|result| result.id == id)
    }

    /// Results that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &BulkDocsResult> {
        self.0.iter().filter(|result| !result.ok)
    }

    /// Returns `true` if every write succeeded.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.0.iter().all(|result| result.ok)
    }

    /// Number of results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no results.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the results.
    #[must_use]
    pub fn into_inner(self) -> Vec<BulkDocsResult> {
        self.0
    }
}

impl From<Vec<BulkDocsResult>> for BulkResults {
    fn from(results: Vec<BulkDocsResult>) -> Self {
        Self(results)
    }
}

impl IntoIterator for BulkResults {
    type Item = BulkDocsResult;
    type IntoIter = std::vec::IntoIter<BulkDocsResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a BulkResults {
    type Item = &'a BulkDocsResult;
    type IntoIter = std::slice::Iter<'a, BulkDocsResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Id reference in a `_bulk_get` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGetId {
    /// Document id.
    pub id: String,
}

/// Body of a `_bulk_get` request: `{"docs": [{"id": ...}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGetRequest {
    /// Documents to fetch.
    pub docs: Vec<BulkGetId>,
}

impl<S: Into<String>> FromIterator<S> for BulkGetRequest {
    fn from_iter<I: IntoIterator<Item = S>>(ids: I) -> Self {
        Self {
            docs: ids.into_iter().map(|id| BulkGetId { id: id.into() }).collect(),
        }
    }
}

/// Raw body of a `_bulk_get` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkGetResponse {
    /// One entry per requested id.
    #[serde(default)]
    pub results: Vec<BulkGetEntry>,
}

/// Outcome for one requested id.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkGetEntry {
    /// Requested document id.
    pub id: String,
    /// Fetched revisions; only the first one is used.
    #[serde(default)]
    pub docs: Vec<BulkGetDoc>,
}

/// A fetched revision or the reason it could not be fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkGetDoc {
    /// Document body, on success.
    #[serde(default)]
    pub ok: Option<Value>,
    /// Failure details.
    #[serde(default)]
    pub error: Option<BulkGetError>,
}

/// Failure details of a `_bulk_get` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BulkGetError {
    /// Document id.
    #[serde(default)]
    pub id: String,
    /// Requested revision.
    #[serde(default)]
    pub rev: String,
    /// Error code (e.g. `not_found`).
    #[serde(default)]
    pub error: String,
    /// Error message.
    #[serde(default)]
    pub reason: String,
}

/// Documents returned by `Database::bulk_get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkGet<T> {
    /// Found documents, each decoded into a fresh `T`.
    pub docs: Vec<T>,
    /// Ids that could not be fetched.
    pub not_found: Vec<String>,
}

impl<T> Default for BulkGet<T> {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            not_found: Vec::new(),
        }
    }
}

impl BulkGetResponse {
    /// Split the response into decoded documents and missing ids.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if a found document does not match `T`.
    pub fn into_docs<T: serde::de::DeserializeOwned>(self) -> crate::Result<BulkGet<T>> {
        let mut found = BulkGet::default();
        for entry in self.results {
            let Some(doc) = entry.docs.into_iter().next() else {
                continue;
            };
            match doc {
                BulkGetDoc {
                    ok: Some(body),
                    error: None,
                } => {
                    let doc = serde_path_to_error::deserialize(body).map_err(|e| {
                        crate::Error::json_deserialization(
                            e.path().to_string(),
                            e.inner().to_string(),
                        )
                    })?;
                    found.docs.push(doc);
                }
                _ => found.not_found.push(entry.id),
            }
        }
        Ok(found)
    }
}
