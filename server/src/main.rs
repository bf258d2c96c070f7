mod app;
mod config;
mod routes;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::{AppState, Datasets};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let geojson_path = config::geojson_path();
    let municipalities_path = config::municipalities_path();
    tracing::info!(
        geojson = %geojson_path.display(),
        municipalities = %municipalities_path.display(),
        "Loading map data..."
    );
    let datasets = match Datasets::load(&geojson_path, &municipalities_path).await {
        Ok(datasets) => datasets,
        Err(e) => {
            tracing::error!(error = %e, "failed to load map data");
            return;
        }
    };
    tracing::info!(
        features = datasets.feature_count,
        municipalities = datasets.municipality_count,
        unmatched = datasets.unmatched.len(),
        "Map data loaded"
    );
    for name in &datasets.unmatched {
        tracing::warn!(feature = %name, "municipality has no matching record");
    }

    let static_dir = config::static_dir();
    tracing::info!(static_dir = %static_dir.display(), "Serving client bundle");
    let app = app::build_app(AppState::new(datasets, static_dir));

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Municipality map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
