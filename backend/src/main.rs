use jobboard::{build_router, load_config, store, workers::orphan_sweep_worker, AppState};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobboard=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    let config = load_config()?;
    info!("Loaded configuration:\n{}", config);

    if config.uses_default_jwt_secret() {
        warn!("JWT secret is the built-in default; set JOBBOARD__JWT__SECRET in production");
    }

    let store = store::connect(&config.database).await?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sweep_handle = tokio::spawn(orphan_sweep_worker(
        store.clone(),
        config.maintenance.orphan_sweep_interval_seconds,
        shutdown_tx.subscribe(),
    ));

    let address = config.server.bind_address();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Workers may already be gone; a send error is fine here.
    let _ = shutdown_tx.send(());
    if let Err(e) = sweep_handle.await {
        warn!("Orphan sweep worker did not stop cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
