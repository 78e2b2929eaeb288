//! Node configuration

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Address the RPC server binds to
    pub listen_addr: SocketAddr,
    /// Administrator address (hex), fixed for the lifetime of the node
    pub administrator: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8545).into(),
            administrator: None,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.listen_addr.port(), 8545);
        assert!(config.administrator.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: NodeConfig = toml::from_str(
            r#"
            administrator = "0x1234567890abcdef1234567890abcdef12345678"
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr.port(), 8545);
        assert_eq!(
            config.administrator.as_deref(),
            Some("0x1234567890abcdef1234567890abcdef12345678")
        );
    }
}
