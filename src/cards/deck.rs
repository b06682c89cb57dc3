use uuid::Uuid;

use super::card::Card;
use super::shuffle::{shuffle_cards, ShuffleSource};
use crate::utils::errors::DeckError;

/// A named sub-collection of a deck's cards.
///
/// `cards` holds slots into the owning deck's card list, in pile order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pile {
    pub name: String,
    pub cards: Vec<usize>,
}

impl Pile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cards: Vec::new(),
        }
    }
}

/// One or more standard 52-card sets shuffled together.
///
/// Cards never leave `cards`; moving a card into a pile only records its slot
/// on the pile and tags the card with the pile name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub id: String,
    pub deck_count: u32,
    pub cards: Vec<Card>,
    pub piles: Vec<Pile>,
}

impl Deck {
    /// Builds `deck_count` full sets, shuffles them and assigns a fresh id.
    pub fn new_shuffled(deck_count: u32, source: &dyn ShuffleSource) -> Result<Self, DeckError> {
        if deck_count < 1 {
            return Err(DeckError::InvalidArgument(format!(
                "deck count must be at least 1, got {deck_count}"
            )));
        }

        let mut cards = Card::full_sets(deck_count as usize);
        shuffle_cards(&mut cards, source);

        Ok(Self {
            id: Uuid::new_v4().simple().to_string(),
            deck_count,
            cards,
            piles: Vec::new(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.cards.iter().filter(|card| !card.drawn).count()
    }

    pub fn pile(&self, name: &str) -> Option<&Pile> {
        self.piles.iter().find(|pile| pile.name == name)
    }

    pub fn pile_position(&self, name: &str) -> Option<usize> {
        self.piles.iter().position(|pile| pile.name == name)
    }

    /// Marks up to `count` undrawn cards as drawn, walking the main sequence
    /// in its stored order. Returns how many were actually drawn.
    pub fn draw(&mut self, count: usize) -> usize {
        let mut drawn = 0;
        for card in self.cards.iter_mut() {
            if drawn == count {
                break;
            }
            if !card.drawn {
                card.drawn = true;
                drawn += 1;
            }
        }
        drawn
    }

    /// First card carrying `code`, in stored order.
    pub fn find_card(&self, code: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.code == code)
    }
}
