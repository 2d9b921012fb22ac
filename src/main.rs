use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use watermarker::config::Config;
use watermarker::server::{build_router, AppState};

/// Watermarker - HTTP service that stamps text and image watermarks onto uploads
#[derive(Parser, Debug)]
#[command(name = "watermarker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the folder watermarked images are written to
    #[arg(short, long)]
    output_folder: Option<PathBuf>,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(folder) = &args.output_folder {
        config.output.folder = folder.clone();
    }

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let config = load_config(&args)?;

    // Initialize logging subsystem
    watermarker::logging::init_subscriber(config.logging.format)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    tracing::info!(
        config_file = ?args.config,
        server_address = %config.server.address,
        server_port = config.server.port,
        output_folder = %config.output.folder.display(),
        font_dir = ?config.fonts.dir,
        "Configuration loaded successfully"
    );

    if args.test {
        tracing::info!("Configuration test passed");
        return Ok(());
    }

    // The engine never creates directories itself
    tokio::fs::create_dir_all(&config.output.folder)
        .await
        .with_context(|| {
            format!(
                "Failed to create output folder {}",
                config.output.folder.display()
            )
        })?;

    let listen_addr = config.server.listen_address();
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;

    tracing::info!(address = %listen_addr, "Starting watermark service");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
