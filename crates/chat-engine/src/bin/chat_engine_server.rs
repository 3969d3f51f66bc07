//! Chat Engine Server
//!
//! Serves the chat admission API over HTTP and runs the session monitor in
//! the background until Ctrl+C.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};

use chatdesk_chat_engine::logging::{setup_logging, LoggingConfig};
use chatdesk_chat_engine::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Live-chat admission and dispatch server", long_about = None)]
struct Args {
    /// JSON configuration file (defaults to the built-in roster)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the configuration
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Include source file and line in log lines
    #[arg(long)]
    file_info: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::new(args.log_level, "chat-engine-server");
    if args.json_logs {
        logging = logging.with_json();
    }
    if args.file_info {
        logging = logging.with_file_info();
    }
    setup_logging(logging)?;

    let mut config = match &args.config {
        Some(path) => ChatEngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ChatEngineConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.general.bind_addr = bind;
    }

    info!("🏢 Starting {}", config.general.app_name);

    let mut server = ChatEngineServerBuilder::new().with_config(config).build()?;
    server.start()?;

    let bind_addr = server.config().general.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("🔗 Listening on {}", bind_addr);

    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    server.stop().await?;
    info!("🏁 Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown requested");
}
