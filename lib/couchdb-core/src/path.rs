//! CouchDB request paths.
//!
//! Paths are relative to the server prefix and may end with an encoded query
//! string. Each segment is percent-encoded, except the slash of a
//! `_design/` or `_local/` document id, which CouchDB expects verbatim.

use crate::options::escape;
use crate::{Options, Result};

const VERBATIM_PREFIXES: &[&str] = &["_design/", "_local/"];

fn segment(raw: &str) -> String {
    VERBATIM_PREFIXES
        .iter()
        .find_map(|prefix| {
            raw.strip_prefix(prefix)
                .map(|rest| format!("{prefix}{}", escape(rest)))
        })
        .unwrap_or_else(|| escape(raw))
}

/// Join segments into an absolute path (`/db/doc`).
///
/// # Example
///
/// ```
/// use couchdb_core::path;
///
/// assert_eq!(path(["db", "a/b"]), "/db/a%2Fb");
/// assert_eq!(path(["db", "_design/app"]), "/db/_design/app");
/// ```
pub fn path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|seg| format!("/{}", segment(seg.as_ref())))
        .collect()
}

/// A path with a `rev` query parameter, omitted when `rev` is empty.
pub fn rev_path<I, S>(rev: &str, segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = path(segments);
    if !rev.is_empty() {
        result.push_str("?rev=");
        result.push_str(&escape(rev));
    }
    result
}

/// A path followed by the encoded options, if any.
///
/// # Errors
///
/// Returns [`Error::InvalidOption`](crate::Error::InvalidOption) when an
/// option cannot be encoded.
pub fn opt_path<I, S>(options: &Options, json_keys: &[&str], segments: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = path(segments);
    if !options.is_empty() {
        result.push('?');
        result.push_str(&options.encode(json_keys)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::VIEW_JSON_KEYS;

    #[test]
    fn path_escapes_segments() {
        assert_eq!(path(["db", "doc"]), "/db/doc");
        assert_eq!(path(["my db", "a/b?c"]), "/my%20db/a%2Fb%3Fc");
        assert_eq!(path(Vec::<String>::new()), "");
    }

    #[test]
    fn design_and_local_prefixes_stay_readable() {
        assert_eq!(path(["db", "_design/test"]), "/db/_design/test");
        assert_eq!(path(["db", "_local/ckpt/1"]), "/db/_local/ckpt%2F1");
        assert_eq!(path(["db", "_designer"]), "/db/_designer");
    }

    #[test]
    fn rev_path_appends_revision() {
        assert_eq!(rev_path("", ["db", "doc"]), "/db/doc");
        assert_eq!(
            rev_path("1-619db7ba8551c0de3f3a178775509611", ["db", "doc"]),
            "/db/doc?rev=1-619db7ba8551c0de3f3a178775509611"
        );
    }

    #[test]
    fn opt_path_appends_options() {
        let plain = opt_path(&Options::new(), VIEW_JSON_KEYS, ["db", "_all_docs"]).expect("path");
        assert_eq!(plain, "/db/_all_docs");

        let options = Options::new().set("startkey", json!("Zingylemontart"));
        let with_query = opt_path(&options, VIEW_JSON_KEYS, ["db", "_all_docs"]).expect("path");
        assert_eq!(with_query, "/db/_all_docs?startkey=%22Zingylemontart%22");
    }

    #[test]
    fn opt_path_surfaces_encoding_errors() {
        let options = Options::new().set("limit", Value::Null);
        assert!(opt_path(&options, VIEW_JSON_KEYS, ["db"]).is_err());
    }
}
