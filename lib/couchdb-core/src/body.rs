//! JSON body serialization.
//!
//! Document bodies are opaque to the client: whatever the caller serializes is
//! sent as-is, and whatever the server returns is decoded into the caller's type.

use bytes::Bytes;

use crate::Result;

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use couchdb_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Doc { field: u32 }
///
/// let bytes = to_json(&Doc { field: 999 }).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"field":999}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the field that failed
/// (e.g. `results[2].docs`).
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`](crate::Error::JsonDeserialization)
/// if the bytes are not valid JSON for `T`.
///
/// # Example
///
/// ```
/// use couchdb_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Doc { field: u32 }
///
/// let doc: Doc = from_json(br#"{"field":1}"#).expect("deserialize");
/// assert_eq!(doc, Doc { field: 1 });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
