use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_accounts::account::{AccountService, AccountStore, MemoryStore};
use rust_accounts::cli::{Cli, Commands};
use rust_accounts::config::{ConfigSource, ServiceConfig, StorageBackend};
use rust_accounts::error::ServiceError;
use rust_accounts::rpc::RpcServer;
use rust_accounts::storage::SledStore;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DefaultConfig => {
            println!("{}", ServiceConfig::default().to_toml());
            Ok(())
        }
        Commands::Serve { config: path, port, db_path, ephemeral } => {
            let (mut config, source) = ServiceConfig::load_or_default(&path)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(db_path) = db_path {
                config.storage.db_path = db_path;
            }
            if ephemeral {
                config.storage.backend = StorageBackend::Memory;
            }
            run_service(config, &path, source).await
        }
    }
}

async fn run_service(
    config: ServiceConfig,
    config_path: &str,
    source: ConfigSource,
) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    source.log(config_path);

    let store: Arc<dyn AccountStore> = match config.storage.backend {
        StorageBackend::Sled => {
            info!("Opening account database at {}", config.storage.db_path);
            Arc::new(SledStore::open(&config.storage.db_path)?)
        }
        StorageBackend::Memory => {
            info!("Using in-memory account store (ephemeral)");
            Arc::new(MemoryStore::new())
        }
    };

    let service = Arc::new(AccountService::new(store));
    RpcServer::new(service, &config.server.host, config.server.port).start().await
}
