use clap::Parser;
use log::info;
use server::network::{Server, ServerConfig};
use shared::MAX_PLAYERS;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Maximum number of connected clients
    #[arg(short = 'm', long, default_value_t = MAX_PLAYERS)]
    max_clients: usize,

    /// Game speed multiplier applied to every tick
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Milliseconds between full state snapshots
    #[arg(long, default_value = "250")]
    snapshot_interval_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        max_clients: args.max_clients,
        speed: args.speed,
        snapshot_interval: Duration::from_millis(args.snapshot_interval_ms),
    };

    info!("Starting match server on {}", config.addr);
    if args.speed != 1.0 {
        info!("Game speed set to {}x", args.speed);
    }

    let mut server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
