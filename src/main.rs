use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use event_viewer::db::MySqlConnector;
use event_viewer::secrets::SsmSecretResolver;
use event_viewer::{ViewerState, viewer_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &event_viewer::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        region = %cfg.region,
        ssm_endpoint = %cfg.ssm_endpoint.as_deref().unwrap_or("<default>"),
        host_parameter = %cfg.parameters.host,
        table_parameter = %cfg.parameters.table,
        loglevel = %cfg.loglevel
    );

    let resolver = SsmSecretResolver::from_config(cfg).await;
    let state = ViewerState::new(
        Arc::new(resolver),
        Arc::new(MySqlConnector),
        cfg.parameters.clone(),
        cfg.timeouts(),
    );
    let app = viewer_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
