use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Route the guarded objects are served under.
    pub route_prefix: String,
    /// Old public prefix redirected onto `route_prefix`.
    pub legacy_prefix: Option<String>,
    /// First path segment marking a managed object.
    pub guarded_namespace: String,
    /// Root directory of the local blob store.
    pub storage_root: PathBuf,
    /// JSON catalog of stored objects and documents.
    pub catalog_path: Option<PathBuf>,
    /// Upper bound on opening a stream and reading its first chunk.
    pub first_byte_timeout_ms: Option<u64>,
    /// Bearer token to user name.
    pub tokens: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            route_prefix: "/secure-uploads".into(),
            legacy_prefix: Some("/uploads".into()),
            guarded_namespace: blobguard_gate::DEFAULT_GUARDED_NAMESPACE.into(),
            storage_root: PathBuf::from("data/secure-uploads"),
            catalog_path: None,
            first_byte_timeout_ms: None,
            tokens: HashMap::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn first_byte_timeout(&self) -> Option<Duration> {
        self.first_byte_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> ServerResult<()> {
        check_prefix("route_prefix", &self.route_prefix)?;
        if let Some(legacy) = &self.legacy_prefix {
            check_prefix("legacy_prefix", legacy)?;
            if legacy == &self.route_prefix {
                return Err(ServerError::Config(
                    "legacy_prefix must differ from route_prefix".into(),
                ));
            }
        }
        if self.guarded_namespace.is_empty() || self.guarded_namespace.contains('/') {
            return Err(ServerError::Config(format!(
                "guarded_namespace must be a single path segment, got {:?}",
                self.guarded_namespace
            )));
        }
        Ok(())
    }
}

fn check_prefix(name: &str, prefix: &str) -> ServerResult<()> {
    if !prefix.starts_with('/') || prefix.ends_with('/') || prefix.len() < 2 {
        return Err(ServerError::Config(format!(
            "{name} must start with '/' and not end with one, got {prefix:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.route_prefix, "/secure-uploads");
        assert_eq!(c.legacy_prefix.as_deref(), Some("/uploads"));
        assert_eq!(c.guarded_namespace, "attachments");
        assert!(c.first_byte_timeout().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            first_byte_timeout_ms = 2500

            [tokens]
            "tok-1" = "alice"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.first_byte_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(c.tokens.get("tok-1").map(String::as_str), Some("alice"));
        assert_eq!(c.route_prefix, "/secure-uploads");
    }

    #[test]
    fn rejects_bad_prefix() {
        assert!(ServerConfig::from_toml_str(r#"route_prefix = "secure/""#).is_err());
        assert!(ServerConfig::from_toml_str(r#"legacy_prefix = "/secure-uploads""#).is_err());
    }

    #[test]
    fn rejects_nested_namespace() {
        let err = ServerConfig::from_toml_str(r#"guarded_namespace = "a/b""#).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blobguard.toml");
        std::fs::write(&path, "storage_root = \"/srv/blobs\"\n").unwrap();
        let c = ServerConfig::from_toml_file(&path).unwrap();
        assert_eq!(c.storage_root, PathBuf::from("/srv/blobs"));
    }
}
