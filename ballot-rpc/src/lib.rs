//! HTTP surface for the ballot node
//!
//! This crate exposes the call/query surface the front-end and admin
//! tooling consume: signed calls go to `POST /calls`, unrestricted reads
//! (phase, winner, proposal count) and the event log are plain GETs, and
//! voter-gated reads take the caller identity as a query parameter.

pub mod config;
pub mod error;
pub mod routes;

pub use config::RpcConfig;
pub use error::RpcError;
pub use routes::{ballot_routes, RpcState};

use ballot_engine::CallExecutor;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// HTTP server for a ballot node
pub struct RpcServer {
    config: RpcConfig,
    router: axum::Router,
}

impl RpcServer {
    /// Create a server over the given executor with default configuration
    pub fn new(executor: CallExecutor) -> Self {
        Self::with_config(executor, RpcConfig::default())
    }

    /// Create a server over the given executor with custom configuration
    pub fn with_config(executor: CallExecutor, config: RpcConfig) -> Self {
        let state = Arc::new(RpcState::new(executor));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let router = ballot_routes(state)
            .layer(cors)
            .layer(TraceLayer::new_for_http());

        Self { config, router }
    }

    /// The assembled router, for in-process use and tests
    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    /// Bind the configured address and serve until shutdown
    pub async fn serve(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        info!(addr = %self.config.listen_addr, "ballot RPC listening");
        axum::serve(listener, self.router).await
    }
}
