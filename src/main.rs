use std::sync::Arc;

use cinematch::api::{create_router, AppState};
use cinematch::config::Config;
use cinematch::services::providers::omdb::OmdbProvider;
use cinematch::services::{PosterResolver, Provisioner, RetryPolicy, TokioDelay};
use cinematch::storage::{ArtifactStore, GoogleDriveSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinematch=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Artifact provisioning
    let source = GoogleDriveSource::new(
        config.artifact_base_url.clone(),
        config.artifact_connect_timeout(),
        config.artifact_timeout(),
    )?;
    let store = ArtifactStore::new(config.data_dir.clone(), Arc::new(source));
    let provisioner = Arc::new(Provisioner::new(
        store,
        config.movies_remote_id.clone(),
        config.similarity_remote_id.clone(),
    ));

    // Poster resolution
    let omdb = OmdbProvider::new(
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
        config.poster_timeout(),
    )?;
    let posters = PosterResolver::new(
        Arc::new(omdb),
        Arc::new(TokioDelay),
        RetryPolicy {
            max_attempts: config.poster_max_retries,
            base_delay: config.poster_retry_delay(),
        },
        config.default_poster_url.clone(),
    );

    let state = AppState::new(
        provisioner.clone(),
        posters,
        config.recommendation_count,
        config.max_upload_bytes,
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");

    // Serve /health and uploads while the first provisioning pass runs
    tokio::spawn(async move {
        if let Err(e) = provisioner.provision().await {
            tracing::warn!(
                error = %e,
                "Could not load movie data automatically; upload it via PUT /api/v1/artifacts/{{movies,similarity}}"
            );
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
