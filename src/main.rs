use anyhow::{Context, Result};
use clap::Parser;
use img_squeeze_server::cli::Args;
use img_squeeze_server::{create_router, logger, AppState, Config};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    let mut config = load_config(&args)?;
    args.apply_overrides(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers)
        .enable_all()
        .build()
        .context("failed to build async runtime")?;

    runtime.block_on(serve(config))
}

/// An explicit `--config` must load; the default path is optional.
fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => {
            let default_path = Path::new(Config::default_path());
            if default_path.exists() {
                Config::load(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let state = AppState::from_config(&config);
    state
        .pipeline
        .store()
        .ensure_dirs()
        .context("failed to create storage directories")?;

    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 img-squeeze-server listening on http://{}", addr);
    info!(
        "📁 uploads: {}, compressed: {}",
        config.storage.upload_dir.display(),
        config.storage.compressed_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
