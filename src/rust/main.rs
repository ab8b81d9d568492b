use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use log::{info, warn, error};
use signsight::{api, init_logger, Classifier, ModelManager, ServerConfig};

async fn resolve_model_path(config: &ServerConfig) -> anyhow::Result<PathBuf> {
    match &config.model_url {
        Some(url) => {
            let manager = ModelManager::new_default()
                .context("Failed to create model cache directory")?;
            info!("Fetching model from {} into {:?}", url, manager.models_dir());
            let path = manager
                .ensure_model(url, config.model_sha256.as_deref())
                .await
                .with_context(|| format!("Failed to fetch model from {}", url))?;
            Ok(path)
        }
        None => Ok(config.model_path.clone()),
    }
}

async fn load_state(config: &ServerConfig) -> anyhow::Result<api::AppState> {
    let loaded = async {
        let model_path = resolve_model_path(config).await?;
        let classifier = Classifier::builder()
            .with_runtime_config(config.runtime_config())
            .with_model_path(&model_path)?
            .build()?;
        info!("✓ Model loaded: {}", model_path.display());
        anyhow::Ok(classifier)
    }
    .await;

    match loaded {
        Ok(classifier) => Ok(api::AppState::new(classifier)),
        Err(e) if config.allow_missing_model => {
            warn!("✗ Model could not be loaded, serving without it: {:#}", e);
            Ok(api::AppState::unloaded())
        }
        Err(e) => {
            error!("✗ Model could not be loaded: {:#}", e);
            Err(e)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let config = ServerConfig::parse();

    info!("=== Starting Traffic Sign Classification API ===");
    let state = load_state(&config).await?;
    let app = api::router(state, config.body_limit_bytes);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("=== Server stopped ===");
    Ok(())
}
