//! cmd-relay server binary.
//!
//! Loads configuration, initializes logging, binds the listener, and
//! serves connections forever. A bind failure aborts startup with a
//! nonzero exit before any serving begins.

use cmd_relay::config::Config;
use cmd_relay::server::Server;
use tracing::info;
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
        mode = ?config.mode,
        whitelist = ?config.whitelist,
        "Starting cmd-relay server"
    );

    let server = Server::bind(&config)?;
    server.run().await?;

    Ok(())
}
