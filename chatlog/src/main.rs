use std::time::Duration;

use anyhow::Result;
use tmi::{conn, Connection, Dispatcher};

mod config;
mod logger;
use config::Config;
use logger::ChatLogger;

fn init_logger() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    Ok(pretty_env_logger::try_init()?)
}

async fn connect(config: &Config) -> Result<Connection> {
    let mut conn = tmi::connect(config.tmi()).await?;
    for channel in &config.channels {
        conn.sender.join(channel).await?;
    }
    Ok(conn)
}

async fn reconnect(config: &Config) -> Result<Connection> {
    let mut attempts = 0;
    loop {
        match connect(config).await {
            Ok(conn) => return Ok(conn),
            Err(err) if attempts + 1 < config.reconnect_attempts => log::error!(
                "Failed to reconnect after attempt #{} ({}), retrying...",
                attempts,
                err
            ),
            Err(err) => return Err(err.context("Failed to reconnect")),
        }
        attempts += 1;
        tokio::time::sleep(Duration::from_secs(attempts * 3)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;

    let path = std::env::args().nth(1).unwrap_or_else(|| "Config.toml".into());
    let config = Config::init(&path);

    let mut conn = connect(&config).await?;
    let mut dispatcher = Dispatcher::new(ChatLogger::default());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("CTRL-C");
                break;
            },
            msg = conn.reader.next() => match msg {
                Ok(msg) => {
                    if msg.command == "PING" {
                        conn.sender.pong(msg.param(0)).await?;
                    } else if let Err(err) = dispatcher.dispatch(&msg).await {
                        log::error!("Handler failed on {}: {}", msg.command, err);
                    }
                    if dispatcher.handler_mut().take_reconnect() {
                        log::info!("Reconnecting...");
                        conn = reconnect(&config).await?;
                    }
                },
                Err(conn::Error::StreamClosed) => {
                    log::info!("Disconnected, attempting to reconnect...");
                    conn = reconnect(&config).await?;
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}
