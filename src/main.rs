//! Transparent HTTP forwarding proxy.
//!
//! ```text
//!     Client ──▶ listener ──▶ forwarder ──▶ Upstream (TARGET_BASE)
//!                  │              │
//!     Client ◀─────┴── response ◀─┘
//!
//!     stdout: request / response dumps
//!     stderr: operational log, transport failures
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::net::TcpListener;

use http_forward_proxy::config::{load_config, load_dotenv};
use http_forward_proxy::observability::init_tracing;
use http_forward_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "http-forward-proxy")]
#[command(about = "Forward every HTTP request to TARGET_BASE and dump the exchange", long_about = None)]
struct Cli {
    /// Optional TOML config file.
    #[arg(short, long, env = "FORWARD_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv(Path::new(".env"))?;
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_ms = config.timeouts.request_ms,
        connect_timeout_ms = config.timeouts.connect_ms,
        "Configuration loaded"
    );

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;

    println!(
        "Starting proxy on http://{} -> {}",
        listener.local_addr()?,
        server.target()
    );

    server.run(listener).await?;
    Ok(())
}
