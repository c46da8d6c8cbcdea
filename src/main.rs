//! echo-relay: a TCP echo server
//!
//! Every accepted connection is served by its own task, which writes back
//! exactly the bytes it reads until the client closes.
//!
//! Features:
//! - Task per connection, no shared state between handlers
//! - Configurable backlog, read size and connection cap
//! - Configuration via CLI arguments or TOML file
//! - Stops accepting on Ctrl-C

use echo_relay::{Config, Server};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        listen = %config.listen,
        backlog = config.backlog,
        max_connections = config.max_connections,
        buffer_size = config.buffer_size,
        "Starting echo-relay server"
    );

    let server = Server::bind(config).await.map_err(|e| {
        error!(error = %e, "Failed to start listener");
        e
    })?;

    server.run_until(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
