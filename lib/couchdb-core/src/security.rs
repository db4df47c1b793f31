//! Database security objects.

use serde::{Deserialize, Serialize};

/// Security object of a database (`/db/_security`).
///
/// An empty object means the server defaults: no admins, no members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Principals with admin rights on the database.
    #[serde(default)]
    pub admins: Members,
    /// Principals allowed to read and write documents.
    #[serde(default)]
    pub members: Members,
}

/// Member list of a security object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Members {
    /// User names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Role names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}
