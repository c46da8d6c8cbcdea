//! echo-client: send one message to an echo relay and print the reply.

use clap::Parser;
use echo_relay::EchoClient;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the echo client
#[derive(Parser, Debug)]
#[command(name = "echo-client")]
#[command(version = "0.1.0")]
#[command(about = "Send a message to an echo relay", long_about = None)]
struct Args {
    /// Relay address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Message to send
    #[arg(short, long, default_value = "Hello, server!")]
    message: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut client = EchoClient::connect(&args.server).await?;
    println!("Connected to {}", args.server);

    let reply = client.echo(args.message.as_bytes()).await?;
    println!("Received from server: {}", String::from_utf8_lossy(&reply));

    println!("Closing connection to the server.");
    client.close().await?;
    Ok(())
}
