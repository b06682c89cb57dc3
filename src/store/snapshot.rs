use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cards::card::{Card, Rank, Suit};
use crate::cards::deck::{Deck, Pile};
use crate::logger;
use crate::utils::errors::StorageError;

/// On-disk form of a deck, one JSON document per deck.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub deck_id: String,
    pub deck_count: u32,
    pub cards: Vec<CardRecord>,
    pub piles: Vec<PileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardRecord {
    pub code: String,
    pub rank: Rank,
    pub suit: Suit,
    pub drawn: bool,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pile: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PileRecord {
    pub name: String,
    pub cards: Vec<String>,
}

impl From<&Deck> for DeckRecord {
    fn from(deck: &Deck) -> Self {
        Self {
            deck_id: deck.id.clone(),
            deck_count: deck.deck_count,
            cards: deck
                .cards
                .iter()
                .map(|card| CardRecord {
                    code: card.code.clone(),
                    rank: card.rank,
                    suit: card.suit,
                    drawn: card.drawn,
                    order: card.order,
                    pile: card.pile.clone(),
                })
                .collect(),
            piles: deck
                .piles
                .iter()
                .map(|pile| PileRecord {
                    name: pile.name.clone(),
                    cards: pile.cards.iter().map(|slot| deck.cards[*slot].code.clone()).collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<DeckRecord> for Deck {
    type Error = StorageError;

    fn try_from(record: DeckRecord) -> Result<Self, Self::Error> {
        let id = record.deck_id;
        let corrupt = |reason: &str| StorageError::CorruptRecord(format!("{id}: {reason}"));

        if record.deck_count < 1 || record.cards.len() != 52 * record.deck_count as usize {
            return Err(corrupt("card count does not match deck count"));
        }

        let mut cards = Vec::with_capacity(record.cards.len());
        for entry in record.cards {
            if entry.code != Card::code_for(entry.rank, entry.suit) {
                return Err(corrupt(&format!("card code `{}` does not match its rank and suit", entry.code)));
            }
            if entry.pile.is_some() && !entry.drawn {
                return Err(corrupt(&format!("card `{}` is in a pile but not drawn", entry.code)));
            }
            cards.push(Card {
                code: entry.code,
                rank: entry.rank,
                suit: entry.suit,
                drawn: entry.drawn,
                order: entry.order,
                pile: entry.pile,
            });
        }

        let mut copies: HashMap<(Rank, Suit), u32> = HashMap::new();
        for card in &cards {
            *copies.entry((card.rank, card.suit)).or_default() += 1;
        }
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                if copies.get(&(rank, suit)).copied().unwrap_or(0) != record.deck_count {
                    return Err(corrupt(&format!(
                        "expected {} of `{}`",
                        record.deck_count,
                        Card::code_for(rank, suit)
                    )));
                }
            }
        }

        let mut names = HashSet::new();
        let mut piles = Vec::with_capacity(record.piles.len());
        for pile_record in record.piles {
            if !names.insert(pile_record.name.clone()) {
                return Err(corrupt(&format!("pile `{}` appears twice", pile_record.name)));
            }

            let mut slots: Vec<usize> = cards
                .iter()
                .enumerate()
                .filter(|(_, card)| card.pile.as_deref() == Some(pile_record.name.as_str()))
                .map(|(slot, _)| slot)
                .collect();
            slots.sort_by_key(|slot| cards[*slot].order);
            if slots.iter().enumerate().any(|(position, slot)| cards[*slot].order != position) {
                return Err(corrupt(&format!("pile `{}` has gaps or repeats in its order", pile_record.name)));
            }

            let codes: Vec<&str> = slots.iter().map(|slot| cards[*slot].code.as_str()).collect();
            if codes != pile_record.cards {
                return Err(corrupt(&format!("pile `{}` does not match its cards", pile_record.name)));
            }

            piles.push(Pile {
                name: pile_record.name,
                cards: slots,
            });
        }

        let orphaned = cards
            .iter()
            .filter_map(|card| card.pile.as_deref())
            .any(|name| !piles.iter().any(|pile| pile.name == name));
        if orphaned {
            return Err(corrupt("card references an unknown pile"));
        }

        Ok(Deck {
            id,
            deck_count: record.deck_count,
            cards,
            piles,
        })
    }
}

/// Directory holding one `<deck id>.json` file per deck.
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn path_for(&self, deck_id: &str) -> PathBuf {
        self.root.join(format!("{deck_id}.json"))
    }

    /// Writes the deck's record next to its final path and renames it into
    /// place, so readers only ever see a complete file.
    pub async fn write(&self, deck: &Deck) -> Result<(), StorageError> {
        let record = DeckRecord::from(deck);
        let bytes = serde_json::to_vec_pretty(&record)?;

        let path = self.path_for(&deck.id);
        let temporary = path.with_extension("json.tmp");
        tokio::fs::write(&temporary, bytes).await?;
        tokio::fs::rename(&temporary, &path).await?;
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<Deck>, StorageError> {
        let mut decks = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension() != Some(OsStr::new("json")) {
                continue;
            }

            let bytes = tokio::fs::read(&path).await?;
            let record: DeckRecord = serde_json::from_slice(&bytes)?;
            let deck = Deck::try_from(record)?;
            logger!(DEBUG, "[STORE] Loaded deck `{}` from `{}`", deck.id, path.display());
            decks.push(deck);
        }

        Ok(decks)
    }
}
