use crate::output::Output;
use crate::server;
use chunk_config::{PathManager, ServiceConfig};
use chunk_core::ChunkService;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub async fn run_serve(
    mut config: ServiceConfig,
    paths: PathManager,
    bind: Option<String>,
    output: &Output,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;
    let addr = config.bind_addr().map_err(|e| eyre!("{}", e))?;

    let service = ChunkService::from_config(&config, &paths)
        .map_err(|e| eyre!("Failed to initialise service: {}", e))?;
    info!(
        policy = ?service.options().policy,
        credentials = %service.tokens().store_location(),
        "list chunk service configured"
    );

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| eyre!("Failed to bind {}: {}", addr, e))?;
    info!(%addr, "listening");
    output.success(format!("Serving list chunks on http://{}", addr));

    let app = server::router(Arc::new(service));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "server exited with error");
            eyre!("Server error: {}", e)
        })?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
    }
}
