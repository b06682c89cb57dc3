use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::snapshot::SnapshotDir;
use crate::cards::deck::Deck;
use crate::cards::shuffle::ShuffleSource;
use crate::logger;
use crate::utils::errors::{DeckError, StorageError};

type SharedDeck = Arc<Mutex<Deck>>;

/// Every deck the server knows about.
///
/// The outer map lock is only held long enough to find or register a deck;
/// each deck carries its own mutex, so work on one deck never waits on
/// another.
pub struct DeckStore {
    decks: RwLock<HashMap<String, SharedDeck>>,
    snapshots: Option<SnapshotDir>,
}

impl DeckStore {
    pub fn in_memory() -> Self {
        Self {
            decks: RwLock::new(HashMap::new()),
            snapshots: None,
        }
    }

    /// Opens a store backed by `root`, loading every deck already saved there.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let snapshots = SnapshotDir::open(root).await?;
        let mut decks = HashMap::new();
        for deck in snapshots.load_all().await? {
            if decks.contains_key(&deck.id) {
                return Err(StorageError::CorruptRecord(format!("deck `{}` is saved twice", deck.id)));
            }
            decks.insert(deck.id.clone(), Arc::new(Mutex::new(deck)));
        }
        Ok(Self {
            decks: RwLock::new(decks),
            snapshots: Some(snapshots),
        })
    }

    pub async fn len(&self) -> usize {
        self.decks.read().await.len()
    }

    /// Builds a shuffled deck and registers it once it has been saved.
    pub async fn create_deck(
        &self,
        deck_count: u32,
        source: &dyn ShuffleSource,
    ) -> Result<Deck, DeckError> {
        let deck = Deck::new_shuffled(deck_count, source)?;
        if let Some(snapshots) = &self.snapshots {
            snapshots.write(&deck).await?;
        }

        let mut decks = self.decks.write().await;
        decks.insert(deck.id.clone(), Arc::new(Mutex::new(deck.clone())));
        logger!(DEBUG, "[STORE] Registered deck `{}` ({} cards)", deck.id, deck.cards.len());
        Ok(deck)
    }

    pub async fn get_deck(&self, deck_id: &str) -> Result<Deck, DeckError> {
        self.read_deck(deck_id, Deck::clone).await
    }

    /// Runs `read` against the deck while holding its lock.
    pub async fn read_deck<T, F>(&self, deck_id: &str, read: F) -> Result<T, DeckError>
    where
        F: FnOnce(&Deck) -> T,
    {
        let shared = self.lookup(deck_id).await?;
        let deck = shared.lock().await;
        Ok(read(&*deck))
    }

    /// Atomic read-modify-write on one deck.
    ///
    /// `mutate` works on a copy. The copy replaces the stored deck only if
    /// `mutate` succeeds and the snapshot write (when enabled) succeeds, so a
    /// failed or abandoned call leaves the deck exactly as it was. Calls on
    /// the same deck are applied one at a time in the order they acquire the
    /// deck's lock.
    pub async fn mutate_deck<T, F>(&self, deck_id: &str, mutate: F) -> Result<T, DeckError>
    where
        F: FnOnce(&mut Deck) -> Result<T, DeckError>,
    {
        let shared = self.lookup(deck_id).await?;
        let mut deck = shared.lock().await;

        let mut draft = deck.clone();
        let value = mutate(&mut draft)?;

        if let Some(snapshots) = &self.snapshots {
            if let Err(error) = snapshots.write(&draft).await {
                logger!(ERROR, "[STORE] Could not save deck `{deck_id}` ({error})");
                return Err(error.into());
            }
        }

        *deck = draft;
        Ok(value)
    }

    async fn lookup(&self, deck_id: &str) -> Result<SharedDeck, DeckError> {
        let decks = self.decks.read().await;
        decks
            .get(deck_id)
            .map(Arc::clone)
            .ok_or_else(|| DeckError::DeckNotFound(deck_id.to_string()))
    }
}
