//! turtle-canvas: a line-protocol turtle graphics server
//!
//! Every client gets a private canvas and draws on it with text commands:
//! - Movement: steps, left, right
//! - Brush modes: draw, hover, erase
//! - Output: render, coord
//! - Session: clear, quit, test
//!
//! Configuration comes from CLI arguments, environment variables
//! (`COLS`, `ROWS`, `PORT`) or a TOML file.

mod canvas;
mod config;
mod protocols;
mod server;

use config::Config;
use server::Server;
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
        host = %config.host,
        port = config.port,
        cols = config.canvas.cols,
        rows = config.canvas.rows,
        max_connections = config.max_connections,
        "Starting turtle-canvas server"
    );

    let server = Server::bind(&config)?;
    server.run().await?;
    Ok(())
}
