//! `serve` command implementation.

use anyhow::Result;
use config_loader::ConfigLoader;
use contracts::HubConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;

/// Load the config file (or defaults), apply CLI overrides and validate
pub fn resolve_serve_config(args: &ServeArgs) -> Result<HubConfig, CliError> {
    if let Some(path) = args.config.as_deref().filter(|path| !path.exists()) {
        return Err(CliError::config_not_found(path));
    }
    let mut config = ConfigLoader::load_or_default(args.config.as_deref())?;

    apply_overrides(&mut config, args);
    ConfigLoader::validate(&config)?;
    Ok(config)
}

fn apply_overrides(config: &mut HubConfig, args: &ServeArgs) {
    if let Some(ref bind) = args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(backend) = args.store {
        config.store.backend = backend.into();
    }
    if let Some(ref dir) = args.data_dir {
        config.store.path = Some(dir.clone());
    }
    if let Some(capacity) = args.buffer_capacity {
        config.buffer.capacity = capacity;
    }
    // Port 0 disables the exporter.
    if let Some(port) = args.metrics_port {
        config.observability.metrics_port = (port != 0).then_some(port);
    }
}

/// Execute the `serve` command
pub async fn run_serve(config: HubConfig) -> Result<()> {
    info!(
        bind = %config.server.bind,
        store = config.store.backend.as_str(),
        buffer_capacity = config.buffer.capacity,
        "Starting sensor hub"
    );

    let store = store::open_store(&config.store).map_err(CliError::from)?;
    let state = server::AppState::new(store, &config);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| CliError::bind(&config.server.bind, e.to_string()))?;

    server::serve(listener, state.clone(), shutdown_signal()).await?;

    let summary = state.stats.lock().summary();
    info!(
        batches = summary.total_batches,
        rejected = summary.rejected_batches,
        records = summary.total_records,
        "Sensor hub finished"
    );
    println!("{summary}");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, draining connections...");
}
