use std::sync::Arc;

use super::pile::{add_cards, get_or_create_pile, shuffle_pile};
use super::shuffle::{ShuffleSource, ThreadRandom};
use crate::logger;
use crate::models::views::{CardView, DeckView, PileView, ShuffleView};
use crate::store::deck_store::DeckStore;
use crate::utils::errors::DeckError;

/// Entry point for every deck operation.
///
/// Each mutating operation is a single `DeckStore::mutate_deck` call, so a
/// pile lookup or creation and the change that uses it can never interleave
/// with another request on the same deck.
pub struct DeckService {
    store: Arc<DeckStore>,
    source: Arc<dyn ShuffleSource>,
    max_deck_count: u32,
}

impl DeckService {
    pub fn new(store: Arc<DeckStore>, max_deck_count: u32) -> Self {
        DeckService::with_source(store, Arc::new(ThreadRandom), max_deck_count)
    }

    pub fn with_source(
        store: Arc<DeckStore>,
        source: Arc<dyn ShuffleSource>,
        max_deck_count: u32,
    ) -> Self {
        Self {
            store,
            source,
            max_deck_count,
        }
    }

    pub async fn create_deck(&self, deck_count: i64) -> Result<DeckView, DeckError> {
        if deck_count < 1 || deck_count > self.max_deck_count as i64 {
            return Err(DeckError::InvalidArgument(format!(
                "deck count must be between 1 and {}, got {deck_count}",
                self.max_deck_count
            )));
        }

        let deck = self.store.create_deck(deck_count as u32, self.source.as_ref()).await?;
        logger!(DEBUG, "[SERVICE] Created deck `{}` from {deck_count} set(s)", deck.id);
        Ok(DeckView::from(&deck))
    }

    pub async fn draw_cards(&self, deck_id: &str, number_to_draw: i64) -> Result<DeckView, DeckError> {
        if number_to_draw < 0 {
            return Err(DeckError::InvalidArgument(format!(
                "number to draw must not be negative, got {number_to_draw}"
            )));
        }

        let requested = usize::try_from(number_to_draw).unwrap_or(usize::MAX);
        let (drawn, view) = self
            .store
            .mutate_deck(deck_id, |deck| {
                let drawn = deck.draw(requested);
                Ok((drawn, DeckView::from(&*deck)))
            })
            .await?;

        logger!(DEBUG, "[SERVICE] Drew {drawn}/{requested} card(s) from `{deck_id}`");
        Ok(view)
    }

    pub async fn get_deck(&self, deck_id: &str) -> Result<DeckView, DeckError> {
        let deck = self.store.get_deck(deck_id).await?;
        Ok(DeckView::from(&deck))
    }

    /// Fetches the pile, creating it empty on first reference.
    ///
    /// Piles are never removed, so a pile seen by the read stays valid; only
    /// the creation path needs the write lock.
    pub async fn get_pile(&self, deck_id: &str, pile_name: &str) -> Result<PileView, DeckError> {
        let existing = self
            .store
            .read_deck(deck_id, |deck| {
                deck.pile(pile_name).map(|pile| PileView::create_view(deck, pile))
            })
            .await?;
        if let Some(view) = existing {
            return Ok(view);
        }

        self.store
            .mutate_deck(deck_id, |deck| {
                let position = get_or_create_pile(deck, pile_name);
                let deck = &*deck;
                Ok(PileView::create_view(deck, &deck.piles[position]))
            })
            .await
    }

    pub async fn add_to_pile(
        &self,
        deck_id: &str,
        pile_name: &str,
        codes: &[String],
    ) -> Result<PileView, DeckError> {
        let view = self
            .store
            .mutate_deck(deck_id, |deck| {
                add_cards(deck, pile_name, codes)?;
                let position = get_or_create_pile(deck, pile_name);
                let deck = &*deck;
                Ok(PileView::create_view(deck, &deck.piles[position]))
            })
            .await?;

        logger!(
            DEBUG,
            "[SERVICE] Pile `{pile_name}` on `{deck_id}` now holds {} card(s)",
            view.size
        );
        Ok(view)
    }

    pub async fn shuffle_pile(&self, deck_id: &str, pile_name: &str) -> Result<ShuffleView, DeckError> {
        self.store
            .mutate_deck(deck_id, |deck| shuffle_pile(deck, pile_name, self.source.as_ref()))
            .await?;

        logger!(DEBUG, "[SERVICE] Shuffled pile `{pile_name}` on `{deck_id}`");
        Ok(ShuffleView {
            deck_id: deck_id.to_string(),
            pile: pile_name.to_string(),
            shuffled: true,
        })
    }

    /// First card with `code` in the deck's stored order.
    pub async fn get_card(&self, deck_id: &str, code: &str) -> Result<CardView, DeckError> {
        self.store
            .read_deck(deck_id, |deck| deck.find_card(code).map(CardView::from))
            .await?
            .ok_or_else(|| DeckError::CardNotFound {
                deck_id: deck_id.to_string(),
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::shuffle::SeededRandom;
    use std::collections::HashSet;

    fn service() -> DeckService {
        DeckService::with_source(
            Arc::new(DeckStore::in_memory()),
            Arc::new(SeededRandom::new(21)),
            20,
        )
    }

    #[tokio::test]
    async fn test_create_deck_bounds() {
        let service = service();
        assert!(matches!(service.create_deck(0).await, Err(DeckError::InvalidArgument(_))));
        assert!(matches!(service.create_deck(-3).await, Err(DeckError::InvalidArgument(_))));
        assert!(matches!(service.create_deck(21).await, Err(DeckError::InvalidArgument(_))));

        let deck = service.create_deck(3).await.unwrap();
        assert_eq!(deck.cards.len(), 156);
        assert_eq!(deck.remaining, 156);
        assert_eq!(deck.deck_count, 3);
        let mut orders: Vec<usize> = deck.cards.iter().map(|c| c.order).collect();
        orders.sort_unstable();
        assert_eq!(orders, (0..156).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_draw_rejects_negative() {
        let service = service();
        let deck = service.create_deck(1).await.unwrap();
        let result = service.draw_cards(&deck.deck_id, -1).await;
        assert!(matches!(result, Err(DeckError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_draw_past_exhaustion() {
        let service = service();
        let deck = service.create_deck(1).await.unwrap();
        service.draw_cards(&deck.deck_id, 50).await.unwrap();

        let deck = service.draw_cards(&deck.deck_id, 10).await.unwrap();
        assert_eq!(deck.remaining, 0);
        assert!(deck.cards.iter().all(|c| c.drawn));
    }

    #[tokio::test]
    async fn test_draw_follows_stored_order() {
        let service = service();
        let created = service.create_deck(1).await.unwrap();
        let deck = service.draw_cards(&created.deck_id, 5).await.unwrap();

        let drawn: Vec<&str> = deck.cards.iter().filter(|c| c.drawn).map(|c| c.code.as_str()).collect();
        let first_five: Vec<&str> = created.cards[..5].iter().map(|c| c.code.as_str()).collect();
        assert_eq!(drawn, first_five);
    }

    #[tokio::test]
    async fn test_unknown_deck_and_pile() {
        let service = service();
        assert!(matches!(service.get_deck("nope").await, Err(DeckError::DeckNotFound(_))));
        assert!(matches!(service.get_pile("nope", "discard").await, Err(DeckError::DeckNotFound(_))));

        let deck = service.create_deck(1).await.unwrap();
        let result = service.shuffle_pile(&deck.deck_id, "discard").await;
        assert!(matches!(result, Err(DeckError::PileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_card() {
        let service = service();
        let deck = service.create_deck(1).await.unwrap();
        let card = service.get_card(&deck.deck_id, "0H").await.unwrap();
        assert_eq!(card.code, "0H");
        assert!(!card.drawn);

        let result = service.get_card(&deck.deck_id, "XX").await;
        assert!(matches!(result, Err(DeckError::CardNotFound { code, .. }) if code == "XX"));
    }

    #[tokio::test]
    async fn test_partial_match_changes_nothing() {
        let service = service();
        let deck = service.create_deck(1).await.unwrap();
        let codes = vec!["AS".to_string(), "9Z".to_string()];

        let result = service.add_to_pile(&deck.deck_id, "discard", &codes).await;
        assert!(matches!(result, Err(DeckError::PartialMatch(ref unmatched)) if unmatched == &vec!["9Z".to_string()]));

        let after = service.get_deck(&deck.deck_id).await.unwrap();
        assert!(after.piles.is_empty());
        assert_eq!(after.remaining, 52);
    }

    #[tokio::test]
    async fn test_draw_pile_shuffle_scenario() {
        let service = service();
        let deck = service.create_deck(1).await.unwrap();
        let deck_id = deck.deck_id;

        service.draw_cards(&deck_id, 5).await.unwrap();
        let deck = service.get_deck(&deck_id).await.unwrap();
        let drawn: Vec<String> = deck.cards.iter().filter(|c| c.drawn).map(|c| c.code.clone()).collect();
        assert_eq!(drawn.len(), 5);

        service.add_to_pile(&deck_id, "discard", &drawn).await.unwrap();
        let pile = service.get_pile(&deck_id, "discard").await.unwrap();
        let in_pile: Vec<String> = pile.cards.iter().map(|c| c.code.clone()).collect();
        assert_eq!(in_pile, drawn);
        assert_eq!(pile.size, 5);

        let shuffled = service.shuffle_pile(&deck_id, "discard").await.unwrap();
        assert!(shuffled.shuffled);

        let pile = service.get_pile(&deck_id, "discard").await.unwrap();
        let after: Vec<String> = pile.cards.iter().map(|c| c.code.clone()).collect();
        assert_ne!(after, drawn);
        let before_set: HashSet<&String> = drawn.iter().collect();
        let after_set: HashSet<&String> = after.iter().collect();
        assert_eq!(before_set, after_set);
        for (index, card) in pile.cards.iter().enumerate() {
            assert_eq!(card.order, index);
            assert!(card.drawn);
        }

        let deck = service.get_deck(&deck_id).await.unwrap();
        assert_eq!(deck.piles.len(), 1);
        assert_eq!(deck.remaining, 47);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_get_pile_creates_once() {
        let service = Arc::new(service());
        let deck = service.create_deck(1).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = Arc::clone(&service);
            let deck_id = deck.deck_id.clone();
            handles.push(tokio::spawn(async move {
                service.get_pile(&deck_id, "discard").await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().size, 0);
        }

        let deck = service.get_deck(&deck.deck_id).await.unwrap();
        assert_eq!(deck.piles.len(), 1);
    }
}
