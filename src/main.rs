use std::sync::Arc;

use slotmq::{Config, HttpServer, MsgHandler, QueueManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::load()?;
    let queue_manager = Arc::new(QueueManager::new(config.slot_size, config.capacity)?);

    tracing::info!("message max size: {}", config.slot_size);
    tracing::info!("capacity: {}", config.capacity);
    tracing::info!("auth: {}", if config.auth_key().is_some() { "enabled" } else { "disabled" });

    let handler = Arc::new(MsgHandler::new(
        queue_manager,
        config.auth_key().map(str::to_string),
    ));

    let server = HttpServer::new(config.listen_addr(), handler);
    server.run().await?;

    Ok(())
}
