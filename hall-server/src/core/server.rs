//! Server Implementation
//!
//! HTTP + WebSocket 服务器启动和管理

use std::net::SocketAddr;

use crate::core::tasks::BackgroundTasks;
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

        let mut tasks = BackgroundTasks::with_shutdown(state.shutdown.clone());
        state.start_background_tasks(&mut tasks);

        let app = crate::api::build_app(&state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            addr = %addr,
            environment = %self.config.environment,
            epoch = %state.manager.epoch(),
            "Bingo hall server listening"
        );

        let shutdown = state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.cancelled() => {}
                }
                tracing::info!("Shutting down...");
                // 通知 WebSocket 连接退出, 否则 graceful shutdown 会一直等待
                shutdown.cancel();
            })
            .await?;

        if tasks.check_health() > 0 {
            tracing::warn!("Some background tasks had already stopped before shutdown");
        }
        tasks.shutdown(self.config.shutdown_timeout()).await;
        Ok(())
    }
}
