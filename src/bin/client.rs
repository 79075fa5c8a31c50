//! cmd-relay client binary.
//!
//! Sends one command name to the server and streams the response to
//! stdout as chunks arrive. Exits when the server closes the connection.

use clap::Parser;
use cmd_relay::client;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cmd-relay-client")]
#[command(version = "0.1.0")]
#[command(about = "Send one command to a cmd-relay server and stream the response", long_about = None)]
struct CliArgs {
    /// Command name to send
    command: String,

    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:1234")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut stdout = tokio::io::stdout();
    client::fetch(args.addr.as_str(), args.command.as_bytes(), &mut stdout).await?;

    Ok(())
}
