//! mixed-server
//!
//! Serves a directory over HTTP. With `--proxy`, a request whose path starts
//! with a hostname and has no local file is forwarded to that host.
//!
//! ```text
//! GET /index.html              → <dir>/index.html
//! GET /example.com/api/items   → https://example.com/api/items (if
//!                                <dir>/example.com/api/items is missing)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mixed_server::config::{read_config, validate_config, ConfigError, RoutingPolicy, ServerConfig};
use mixed_server::observability::{logging, metrics};
use mixed_server::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "mixed-server", version)]
#[command(about = "Static file server with transparent path-based proxying", long_about = None)]
struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(short, long, env = "MIXED_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. "0.0.0.0:8080" or ":8080".
    #[arg(long, env = "MIXED_SERVER_ADDR")]
    addr: Option<String>,

    /// Directory to serve.
    #[arg(long, env = "MIXED_SERVER_DIR")]
    dir: Option<PathBuf>,

    /// Forward /<host>/<path> requests that have no local file.
    #[arg(long, env = "MIXED_SERVER_PROXY")]
    proxy: bool,

    /// How X-Forwarded-Host takes part in routing.
    #[arg(long, value_enum, env = "MIXED_SERVER_POLICY")]
    policy: Option<RoutingPolicy>,

    /// Log level when RUST_LOG is not set.
    #[arg(long, env = "MIXED_SERVER_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(&self, config: &mut ServerConfig) {
        if let Some(addr) = &self.addr {
            config.listener.bind_address = addr.clone();
        }
        if let Some(dir) = &self.dir {
            config.files.root = dir.clone();
        }
        if self.proxy {
            config.proxy.enabled = true;
        }
        if let Some(policy) = self.policy {
            config.proxy.policy = policy;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_tracing(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        root = %config.files.root.display(),
        proxy = config.proxy.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(config.listener.socket_addr()?).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_signal());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
