use serde::{Deserialize, Serialize};

use crate::cards::card::{Card, Rank, Suit};
use crate::cards::deck::{Deck, Pile};

/// Read-only snapshots handed back to callers. They hold no reference into
/// the store, so they can be kept or sent anywhere without going stale
/// underneath a later mutation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub code: String,
    pub rank: Rank,
    pub suit: Suit,
    pub drawn: bool,
    pub order: usize,
    pub pile: Option<String>,
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            code: card.code.clone(),
            rank: card.rank,
            suit: card.suit,
            drawn: card.drawn,
            order: card.order,
            pile: card.pile.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PileView {
    pub deck_id: String,
    pub name: String,
    pub size: usize,
    pub cards: Vec<CardView>,
}

impl PileView {
    pub fn create_view(deck: &Deck, pile: &Pile) -> Self {
        Self {
            deck_id: deck.id.clone(),
            name: pile.name.clone(),
            size: pile.cards.len(),
            cards: pile.cards.iter().map(|slot| CardView::from(&deck.cards[*slot])).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeckView {
    pub deck_id: String,
    pub deck_count: u32,
    pub remaining: usize,
    pub cards: Vec<CardView>,
    pub piles: Vec<PileView>,
}

impl From<&Deck> for DeckView {
    fn from(deck: &Deck) -> Self {
        Self {
            deck_id: deck.id.clone(),
            deck_count: deck.deck_count,
            remaining: deck.remaining(),
            cards: deck.cards.iter().map(CardView::from).collect(),
            piles: deck.piles.iter().map(|pile| PileView::create_view(deck, pile)).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleView {
    pub deck_id: String,
    pub pile: String,
    pub shuffled: bool,
}
