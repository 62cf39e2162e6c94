//! Node configuration, populated from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid socket address (e.g. 0.0.0.0:3333), got {value:?}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Runtime configuration for a document node.
///
/// A node starts with zero configuration: in-memory storage on port 3333.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `COMMONS_BIND` | `0.0.0.0:3333` | TCP socket address to listen on |
/// | `COMMONS_DB` | (absent = in-memory) | Path to the SQLite database file |
/// | `COMMONS_NAME` | (absent) | Human-readable node name for `/v1/info` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Human-readable name, shown by `GET /v1/info`.
    pub name: Option<String>,

    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file.
    /// `None` means use an in-memory store (data is lost on restart).
    pub db_path: Option<String>,
}

pub const DEFAULT_BIND: &str = "0.0.0.0:3333";

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3333)),
            db_path: None,
        }
    }
}

impl NodeConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_bind = lookup("COMMONS_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind_addr = raw_bind.trim().parse().map_err(|_| ConfigError::InvalidBind {
            var: "COMMONS_BIND",
            value: raw_bind.clone(),
        })?;

        let db_path = match lookup("COMMONS_DB") {
            Some(p) if p.trim().is_empty() => return Err(ConfigError::Empty { var: "COMMONS_DB" }),
            other => other,
        };

        Ok(Self {
            name: lookup("COMMONS_NAME").filter(|n| !n.trim().is_empty()),
            bind_addr,
            db_path,
        })
    }

    /// Storage backend name reported by `GET /v1/info`.
    pub fn backend(&self) -> &'static str {
        if self.db_path.is_some() {
            "sqlite"
        } else {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_to_in_memory_on_3333() {
        let cfg = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, NodeConfig::default());
        assert_eq!(cfg.backend(), "memory");
    }

    #[test]
    fn reads_all_variables() {
        let cfg = NodeConfig::from_lookup(lookup(&[
            ("COMMONS_BIND", "127.0.0.1:8080"),
            ("COMMONS_DB", "/var/lib/commons.db"),
            ("COMMONS_NAME", "Commons staging"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.db_path.as_deref(), Some("/var/lib/commons.db"));
        assert_eq!(cfg.name.as_deref(), Some("Commons staging"));
        assert_eq!(cfg.backend(), "sqlite");
    }

    #[test]
    fn bad_bind_address_is_an_error() {
        let err = NodeConfig::from_lookup(lookup(&[("COMMONS_BIND", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind { .. }));
    }

    #[test]
    fn empty_db_path_is_an_error() {
        let err = NodeConfig::from_lookup(lookup(&[("COMMONS_DB", " ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: "COMMONS_DB" });
    }
}
