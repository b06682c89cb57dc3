//! Pile bookkeeping on a single deck.
//!
//! Everything here takes `&mut Deck` and is meant to run inside one
//! `DeckStore::mutate_deck` call, so a lookup and the mutation that follows
//! it always see the same state.

use std::collections::HashSet;

use super::deck::{Deck, Pile};
use super::shuffle::{shuffle, ShuffleSource};
use crate::utils::errors::DeckError;

/// Returns the index of the pile called `name`, creating an empty one first
/// if the deck has none.
pub fn get_or_create_pile(deck: &mut Deck, name: &str) -> usize {
    match deck.pile_position(name) {
        Some(position) => position,
        None => {
            deck.piles.push(Pile::new(name));
            deck.piles.len() - 1
        }
    }
}

/// Moves the cards named by `codes` into the pile `name`.
///
/// Each occurrence of a code claims one card instance. An instance already in
/// the pile satisfies the claim as-is, so repeating a request changes nothing.
/// Otherwise the first free instance is taken: drawn loose cards first, then
/// undrawn ones, then cards sitting in another pile. If any code cannot be
/// matched the deck is left untouched and the unmatched codes are returned.
pub fn add_cards(deck: &mut Deck, name: &str, codes: &[String]) -> Result<(), DeckError> {
    let mut claimed: HashSet<usize> = HashSet::new();
    let mut to_move: Vec<usize> = Vec::new();
    let mut unmatched: Vec<String> = Vec::new();

    let in_pile: Vec<usize> = deck.pile(name).map(|pile| pile.cards.clone()).unwrap_or_default();

    for code in codes {
        let existing = in_pile
            .iter()
            .copied()
            .find(|slot| deck.cards[*slot].code == *code && !claimed.contains(slot));
        if let Some(slot) = existing {
            claimed.insert(slot);
            continue;
        }

        let candidate = deck
            .cards
            .iter()
            .enumerate()
            .filter(|(slot, card)| {
                card.code == *code
                    && card.pile.as_deref() != Some(name)
                    && !claimed.contains(slot)
            })
            .min_by_key(|(slot, card)| {
                let rank = match (&card.pile, card.drawn) {
                    (None, true) => 0,
                    (None, false) => 1,
                    (Some(_), _) => 2,
                };
                (rank, *slot)
            })
            .map(|(slot, _)| slot);

        match candidate {
            Some(slot) => {
                claimed.insert(slot);
                to_move.push(slot);
            }
            None => unmatched.push(code.clone()),
        }
    }

    if !unmatched.is_empty() {
        return Err(DeckError::PartialMatch(unmatched));
    }

    let target = get_or_create_pile(deck, name);
    for slot in to_move {
        if let Some(source) = deck.cards[slot].pile.take() {
            detach(deck, &source, slot);
        }

        let pile = &mut deck.piles[target];
        let order = pile.cards.len();
        pile.cards.push(slot);

        let card = &mut deck.cards[slot];
        card.order = order;
        card.pile = Some(name.to_string());
        card.drawn = true;
    }

    Ok(())
}

/// Reorders the pile's cards with the shuffle engine.
pub fn shuffle_pile(deck: &mut Deck, name: &str, source: &dyn ShuffleSource) -> Result<(), DeckError> {
    let position = deck.pile_position(name).ok_or_else(|| DeckError::PileNotFound {
        deck_id: deck.id.clone(),
        pile: name.to_string(),
    })?;

    let Deck { cards, piles, .. } = deck;
    shuffle(&mut piles[position].cards, source, |slot, index| {
        cards[*slot].order = index;
    });

    Ok(())
}

/// Removes `slot` from pile `name` and closes the gap in its orders.
fn detach(deck: &mut Deck, name: &str, slot: usize) {
    let Some(position) = deck.pile_position(name) else {
        return;
    };

    let Deck { cards, piles, .. } = deck;
    let pile = &mut piles[position];
    pile.cards.retain(|held| *held != slot);
    for (index, held) in pile.cards.iter().enumerate() {
        cards[*held].order = index;
    }
}
