//! RAX File Manager - Entry Point
//!
//! Serves a sandboxed directory tree over a line-oriented JSON protocol.

use log::{error, info};

use rax_file_manager::Server;
use rax_file_manager::config::ServerConfig;
use rax_file_manager::utils::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Launching file manager...");

    let root = config.sandbox_root();
    let server = match Server::bind(config, root).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };
    server.start().await;
}
