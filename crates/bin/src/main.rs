//! Cell arena - standalone simulation server.

use anyhow::Context;
use arena::Config;
use arena::server::{Game, OperatorCommand, command_queue, run_game_loop};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How often the world status is logged.
const STATUS_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Cell arena v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load(&path).with_context(|| format!("loading {}", path.display()))?;
    info!(
        "{}: {}x{} border, {}ms ticks",
        config.server.name, config.border.width, config.border.height, config.server.tick_interval_ms
    );

    let (queue, commands) = command_queue();
    let game = Game::new(config, queue.clone(), commands);

    let status = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATUS_INTERVAL);
        loop {
            ticker.tick().await;
            queue.operator(OperatorCommand::Status);
        }
    });

    tokio::select! {
        _ = run_game_loop(game) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for ctrl-c")?;
            info!("Shutting down");
        }
    }
    status.abort();
    Ok(())
}
