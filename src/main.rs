use std::sync::Arc;

use cards::service::DeckService;
use cards::shuffle::SeededRandom;
use models::settings::Settings;
use store::deck_store::DeckStore;
use tcp::protocol::Protocol;
use tcp::server::ServerInstance;
use utils::errors::ServerError;
use utils::logger::{LogLevel, Logger};

mod cards;
mod models;
mod store;
mod tcp;
mod utils;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let settings = Settings::load()?;
    match settings.log_level.parse::<LogLevel>() {
        Ok(level) => Logger::set_level(level),
        Err(error) => logger!(WARN, "[SERVER] {error}, keeping INFO"),
    }

    let store = match &settings.data_dir {
        Some(dir) => DeckStore::open(dir).await?,
        None => {
            logger!(INFO, "[STORE] No data directory configured, decks live in memory only");
            DeckStore::in_memory()
        }
    };

    logger!(INFO, "[STORE] {} deck(s) available", store.len().await);

    let store = Arc::new(store);
    let service = match settings.shuffle_seed {
        Some(seed) => {
            logger!(WARN, "[SERVER] Shuffling with fixed seed {seed}");
            DeckService::with_source(store, Arc::new(SeededRandom::new(seed)), settings.max_deck_count)
        }
        None => DeckService::new(store, settings.max_deck_count),
    };
    let protocol = Arc::new(Protocol::new(Arc::new(service)));
    let server = ServerInstance::create_instance(&settings.host, settings.port, protocol).await?;

    tokio::select! {
        _ = Arc::new(server).run() => {}
        _ = tokio::signal::ctrl_c() => logger!(INFO, "[SERVER] Shutting down"),
    }

    Ok(())
}
