//! Server lifecycle: wiring the record source, the analytics service and the router.

use crate::api::{create_router, AppState};
use crate::error::ServerResult;
use rollcall_analytics::{AnalyticsService, AttendanceSource, InMemorySource};
use rollcall_config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The analytics HTTP server.
pub struct RollcallServer {
    state: AppState,
}

impl RollcallServer {
    /// Loads the configured dataset and builds the service.
    pub async fn new(config: Config) -> ServerResult<Self> {
        let source = match &config.server.data_path {
            Some(path) => InMemorySource::from_json_file(path).await?,
            None => {
                warn!("No data_path configured - serving an empty dataset");
                InMemorySource::default()
            }
        };
        if config.server.data_path.is_some() && source.is_empty() {
            warn!("Dataset contains no attendance events");
        }
        let source: Arc<dyn AttendanceSource> = Arc::new(source);
        Self::with_source(config, source)
    }

    /// Builds the server around an existing record source.
    pub fn with_source(config: Config, source: Arc<dyn AttendanceSource>) -> ServerResult<Self> {
        let service = AnalyticsService::from_config(&config.analytics, source)?;
        Ok(Self {
            state: AppState {
                config: Arc::new(config),
                service: Arc::new(service),
            },
        })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }

    /// Serves until Ctrl-C.
    pub async fn start(self) -> ServerResult<()> {
        let bind_address = self.state.config.server.bind_address.clone();
        let listener = TcpListener::bind(&bind_address).await?;
        info!("Rollcall analytics listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Rollcall analytics stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
