//! Web server entry point.

use anyhow::Result;
use clap::Parser;
use dqis_core::Pipeline;
use dqis_web::{ServerConfig, run_server};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "AI-Based Data Quality Intelligence System (web)",
    long_about = "Serve the upload page on HOST:PORT.\n\n\
                  Defaults come from DQIS_HOST, DQIS_PORT and DQIS_MAX_UPLOAD_BYTES;\n\
                  command line flags take precedence."
)]
struct Args {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Largest accepted upload in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = ServerConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(limit) = args.max_upload_bytes {
        config.max_upload_bytes = limit;
    }

    run_server(config, Pipeline::default()).await
}
