//! Node discovery type — `GET /v1/info`.

use serde::{Deserialize, Serialize};

/// Describes a document node: who runs it and which backend holds the data.
///
/// ```json
/// {
///   "name": "Advocacy Commons (staging)",
///   "version": "0.1.0",
///   "backend": "sqlite"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeInfo {
    /// Human-readable name for this node. OPTIONAL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Version of the node software.
    pub version: String,

    /// Storage backend: `"memory"` or `"sqlite"`.
    pub backend: String,
}

impl NodeInfo {
    pub fn new(version: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: None,
            version: version.into(),
            backend: backend.into(),
        }
    }
}
