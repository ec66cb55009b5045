//! Shardload workload generator CLI.
//!
//! Serves the generation endpoints and pushes fabricated batches to the
//! configured shard addresses.

use clap::Parser;
use shardload_server::{Server, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shardload")]
#[command(about = "Synthetic workload generator for a sharded ledger testbed")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to the built-in local
    /// three-shard table when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address from the configuration.
    #[arg(long)]
    listen_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = cli.listen_addr {
        config.listen_addr = addr;
    }

    let handle = Server::new(config)?.spawn().await?;
    handle.join().await?;
    Ok(())
}
