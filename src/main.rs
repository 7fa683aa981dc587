//! Bookstore Server - HTTP REST API over a book collection

use bookstore::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    let config = ServerConfig::load()?;

    bookstore::start_server(config).await?;

    Ok(())
}
