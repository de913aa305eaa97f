//! Room-scoped WebSocket relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kangaroo-server
//! cargo run --bin kangaroo-server -- --host 0.0.0.0 --port 3000
//! KANGAROO_PORT=3000 cargo run --bin kangaroo-server
//! ```

use std::path::PathBuf;

use clap::Parser;
use kangaroo_server::ui::{Server, ServerConfig};
use kangaroo_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "kangaroo-server")]
#[command(about = "Room-scoped chat, calculator and file relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KANGAROO_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "KANGAROO_PORT", default_value = "8080")]
    port: u16,

    /// Directory holding index.html and the /static/ assets
    #[arg(long, env = "KANGAROO_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Directory uploaded files are written to and served from
    #[arg(long, env = "KANGAROO_FILES_DIR", default_value = "server_files")]
    files_dir: PathBuf,

    /// Base URL used in download links (defaults to http://localhost:<port>)
    #[arg(long, env = "KANGAROO_PUBLIC_URL")]
    public_url: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "KANGAROO_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let public_url = args
            .public_url
            .unwrap_or_else(|| ServerConfig::default_public_url(args.port));
        Self {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            files_dir: args.files_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    tracing::debug!("Starting with {:?}", config);

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
