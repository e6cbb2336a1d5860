use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use zonekeeper::auth::TokenSigner;
use zonekeeper::config::ZoneConfig;
use zonekeeper::http_server::HttpServer;
use zonekeeper::zone::ZoneStore;

/// Multi-tenant DNS zone management backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP API to (overrides ZONEKEEPER_BIND_ADDR)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database URL (overrides ZONEKEEPER_DATABASE_URL)
    #[arg(short, long)]
    database_url: Option<String>,

    /// Log filter
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .init();

    let mut config = ZoneConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!("Opening zone database at {}", config.database_url);
    let store = ZoneStore::connect(&config).await?;
    let signer = TokenSigner::new(&config.secret_key);

    let server = HttpServer::new(Arc::new(store), Arc::new(signer), config);
    server.start().await
}
