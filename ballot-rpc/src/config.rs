//! RPC server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            listen_addr: ([127, 0, 0, 1], 8545).into(),
        }
    }
}
