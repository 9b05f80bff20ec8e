// hello-module - serves the heatmap camera model to a robot host

use anyhow::Context;
use clap::Parser;
use hello_module::{default_registry, http, LogFormat, Module, ModuleSettings};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hello-module")]
#[command(about = "Heatmap camera module", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (JSON or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address for the host bridge
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Log filter, e.g. `debug` or `hello_camera=trace`
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<ModuleSettings> {
    let mut settings = match &cli.config {
        Some(path) => ModuleSettings::from_file(path)?,
        None => ModuleSettings::default(),
    };
    settings.apply_env()?;

    if let Some(addr) = cli.listen {
        settings.listen_addr = addr;
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }
    if cli.log_json {
        settings.log_format = LogFormat::Json;
    }

    settings.validate()?;
    Ok(settings)
}

fn init_logging(settings: &ModuleSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    match settings.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    init_logging(&settings);

    let module = Arc::new(Module::new(default_registry()));
    let (handle, request_loop) = module.clone().start(settings.request_buffer);

    for (api, model) in module.models() {
        info!("Serving model {} for {}", model, api);
    }

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen_addr))?;
    info!("Host bridge listening on {}", settings.listen_addr);

    axum::serve(listener, http::create_router(handle))
        .with_graceful_shutdown(wait_for_shutdown())
        .await
        .context("Host bridge failed")?;

    // The router held the last handle, so the loop drains and exits
    match tokio::time::timeout(Duration::from_secs(5), request_loop).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Request loop ended abnormally: {}", e),
        Err(_) => warn!("Request loop still busy after 5s, closing resources anyway"),
    }
    module.close_all().await;
    info!("hello-module stopped");
    Ok(())
}

/// Wait for shutdown signal
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
