//! Server Implementation
//!
//! HTTP 服务器启动和管理

use tokio::net::TcpListener;

use crate::api;
use crate::core::{Config, Result, ServerState};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let app = api::build_app(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("🍽️  Ejuem server listening on {}", addr);

        let shutdown_state = state.clone();
        let shutdown = async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            // 先停止推送任务，SSE 流随之结束，进行中的请求正常完成
            shutdown_state.shutdown();
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
