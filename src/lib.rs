pub mod backend;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod formula;
pub mod logging;
pub mod paths;
pub mod resources;
pub mod router;
pub mod server;
pub mod state;
pub mod tools;
pub mod translate;

pub use config::{CliArgs, ServerConfig, TransportKind};
pub use logging::init_logging;
pub use server::ExcelMcpServer;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;

const HTTP_SERVICE_PATH: &str = "/mcp";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    config.ensure_excel_root()?;
    let state = Arc::new(AppState::new(config.clone()));

    tracing::info!(
        transport = %config.transport,
        excel_root = %config.excel_root.display(),
        "starting excel MCP server",
    );

    match config.transport {
        TransportKind::Stdio => ExcelMcpServer::from_state(state).run_stdio().await,
        TransportKind::Http => run_stream_http_transport(config, state).await,
    }
}

async fn run_stream_http_transport(config: Arc<ServerConfig>, state: Arc<AppState>) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(ExcelMcpServer::from_state(state.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new().nest_service(HTTP_SERVICE_PATH, service);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = HTTP_SERVICE_PATH, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
