//! CLI for lobbycast
//!
//! Subcommands:
//! - `server`: run the WebSocket server

use std::sync::Arc;

use clap::Parser;
use lobbycast::broker::Broker;
use lobbycast::config::load_config;
use lobbycast::session::SessionRouter;
use lobbycast::timer::{CountdownTimer, TokioScheduler};
use lobbycast::transport::start_websocket_server;
use lobbycast::utils::{Result, logging};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "lobbycast")]
enum Command {
    /// Start the WebSocket server
    Server {
        /// Overrides `server.host` from the configuration
        #[arg(long)]
        host: Option<String>,
        /// Overrides `server.port` from the configuration
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    match cmd {
        Command::Server { host, port } => {
            if let Err(e) = run_server(host, port).await {
                logging::init("info");
                error!("Server failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn run_server(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    logging::init(&config.logging.level);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let broker = Arc::new(Broker::new());
    let timer = CountdownTimer::new(
        broker.clone(),
        Arc::new(TokioScheduler::current()),
        config.timer.clone(),
    )?;
    let router = SessionRouter::new(timer, broker.clone());

    tokio::select! {
        res = start_websocket_server(&addr, broker, router) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}
