use std::sync::Arc;

use serde::Serialize;

use crate::cards::service::DeckService;
use crate::logger;
use crate::models::requests::{
    AddToPileRequest, CardRequest, CreateDeckRequest, DeckRequest, DrawCardsRequest,
    ErrorResponse, PileRequest,
};
use crate::tcp::header::HeaderType;
use crate::tcp::packet::Packet;
use crate::utils::errors::{DeckError, ProtocolError};

/// Translates request packets into deck operations and their results back
/// into response packets.
pub struct Protocol {
    pub service: Arc<DeckService>,
}

impl Protocol {
    pub fn new(service: Arc<DeckService>) -> Self {
        Protocol { service }
    }

    /// Produces the response for one incoming packet.
    ///
    /// Never fails: checksum problems, unknown request types, undecodable
    /// payloads and operation errors all become error packets.
    pub async fn handle_packet(&self, packet: &Packet) -> Packet {
        let header_type = packet.header.header_type;
        logger!(
            DEBUG,
            "[PROTOCOL] Received packet: {{ type: {}, size: {} }}",
            header_type,
            packet.header.payload_length
        );

        if !packet.has_valid_checksum() {
            logger!(WARN, "[PROTOCOL] Invalid checksum value on `{header_type}`");
            return Protocol::error_packet(HeaderType::InvalidChecksum, "Checksum failed", Vec::new());
        }

        match self.dispatch(packet).await {
            Ok(response) => response,
            Err(RequestFailure::Protocol(error)) => {
                logger!(WARN, "[PROTOCOL] Rejected `{header_type}` ({error})");
                let response_type = match error {
                    ProtocolError::InvalidHeaderError(_) => HeaderType::InvalidHeader,
                    _ => HeaderType::InvalidPacketPayload,
                };
                Protocol::error_packet(response_type, &error.to_string(), Vec::new())
            }
            Err(RequestFailure::Deck(error)) => {
                logger!(DEBUG, "[PROTOCOL] `{header_type}` failed ({error})");
                Protocol::deck_error_packet(error)
            }
        }
    }

    async fn dispatch(&self, packet: &Packet) -> Result<Packet, RequestFailure> {
        let service = &self.service;
        match packet.header.header_type {
            HeaderType::Ping => Ok(Packet::new(HeaderType::Pong, b"")),
            HeaderType::Disconnect => Ok(Packet::new(HeaderType::Disconnect, b"")),
            HeaderType::CreateDeck => {
                let request: CreateDeckRequest = packet.decode()?;
                let deck = service.create_deck(request.deck_count).await?;
                respond(HeaderType::DeckState, &deck)
            }
            HeaderType::DrawCards => {
                let request: DrawCardsRequest = packet.decode()?;
                let deck = service.draw_cards(&request.deck_id, request.number_to_draw).await?;
                respond(HeaderType::DeckState, &deck)
            }
            HeaderType::GetDeck => {
                let request: DeckRequest = packet.decode()?;
                let deck = service.get_deck(&request.deck_id).await?;
                respond(HeaderType::DeckState, &deck)
            }
            HeaderType::GetPile => {
                let request: PileRequest = packet.decode()?;
                let pile = service.get_pile(&request.deck_id, &request.pile_name).await?;
                respond(HeaderType::PileState, &pile)
            }
            HeaderType::AddToPile => {
                let request: AddToPileRequest = packet.decode()?;
                let pile = service
                    .add_to_pile(&request.deck_id, &request.pile_name, &request.cards)
                    .await?;
                respond(HeaderType::PileState, &pile)
            }
            HeaderType::ShufflePile => {
                let request: PileRequest = packet.decode()?;
                let result = service.shuffle_pile(&request.deck_id, &request.pile_name).await?;
                respond(HeaderType::PileShuffled, &result)
            }
            HeaderType::GetCard => {
                let request: CardRequest = packet.decode()?;
                let card = service.get_card(&request.deck_id, &request.code).await?;
                respond(HeaderType::CardState, &card)
            }
            other => Err(RequestFailure::Protocol(ProtocolError::InvalidHeaderError(format!(
                "`{other}` is not a request"
            )))),
        }
    }

    fn deck_error_packet(error: DeckError) -> Packet {
        let message = error.to_string();
        match error {
            DeckError::DeckNotFound(_) => Protocol::error_packet(HeaderType::DeckNotFound, &message, Vec::new()),
            DeckError::PileNotFound { .. } => Protocol::error_packet(HeaderType::PileNotFound, &message, Vec::new()),
            DeckError::CardNotFound { .. } => Protocol::error_packet(HeaderType::CardNotFound, &message, Vec::new()),
            DeckError::InvalidArgument(_) => Protocol::error_packet(HeaderType::InvalidArgument, &message, Vec::new()),
            DeckError::PartialMatch(unmatched) => Protocol::error_packet(HeaderType::PartialMatch, &message, unmatched),
            DeckError::Storage(_) => {
                logger!(ERROR, "[PROTOCOL] {message}");
                Protocol::error_packet(HeaderType::ERROR, "Internal storage error", Vec::new())
            }
        }
    }

    pub(crate) fn error_packet(header_type: HeaderType, message: &str, unmatched: Vec<String>) -> Packet {
        let body = ErrorResponse {
            message: message.to_string(),
            unmatched,
        };
        Packet::encode(header_type, &body).unwrap_or_else(|_| Packet::new(header_type, b""))
    }
}

enum RequestFailure {
    Protocol(ProtocolError),
    Deck(DeckError),
}

impl From<ProtocolError> for RequestFailure {
    fn from(error: ProtocolError) -> Self {
        RequestFailure::Protocol(error)
    }
}

impl From<DeckError> for RequestFailure {
    fn from(error: DeckError) -> Self {
        RequestFailure::Deck(error)
    }
}

fn respond<T: Serialize>(header_type: HeaderType, body: &T) -> Result<Packet, RequestFailure> {
    Ok(Packet::encode(header_type, body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::shuffle::SeededRandom;
    use crate::models::views::{CardView, DeckView, PileView, ShuffleView};
    use crate::store::deck_store::DeckStore;

    fn protocol() -> Protocol {
        let service = DeckService::with_source(
            Arc::new(DeckStore::in_memory()),
            Arc::new(SeededRandom::new(33)),
            20,
        );
        Protocol::new(Arc::new(service))
    }

    async fn send<T: Serialize>(protocol: &Protocol, header_type: HeaderType, body: &T) -> Packet {
        let request = Packet::encode(header_type, body).unwrap();
        protocol.handle_packet(&request).await
    }

    async fn create_deck(protocol: &Protocol) -> DeckView {
        let response = send(protocol, HeaderType::CreateDeck, &CreateDeckRequest { deck_count: 1 }).await;
        assert_eq!(response.header.header_type, HeaderType::DeckState);
        response.decode().unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let response = protocol().handle_packet(&Packet::new(HeaderType::Ping, b"")).await;
        assert_eq!(response.header.header_type, HeaderType::Pong);
    }

    #[tokio::test]
    async fn test_bad_checksum() {
        let mut packet = Packet::encode(HeaderType::GetDeck, &DeckRequest::default()).unwrap();
        packet.header.checksum ^= 0x00FF;
        let response = protocol().handle_packet(&packet).await;
        assert_eq!(response.header.header_type, HeaderType::InvalidChecksum);
    }

    #[tokio::test]
    async fn test_undecodable_payload() {
        let response = protocol().handle_packet(&Packet::new(HeaderType::GetDeck, b"\xFF\xFF")).await;
        assert_eq!(response.header.header_type, HeaderType::InvalidPacketPayload);
    }

    #[tokio::test]
    async fn test_response_type_is_not_a_request() {
        let response = protocol().handle_packet(&Packet::new(HeaderType::DeckState, b"")).await;
        assert_eq!(response.header.header_type, HeaderType::InvalidHeader);
    }

    #[tokio::test]
    async fn test_unknown_deck() {
        let protocol = protocol();
        let request = DeckRequest {
            deck_id: "missing".to_string(),
        };
        let response = send(&protocol, HeaderType::GetDeck, &request).await;
        assert_eq!(response.header.header_type, HeaderType::DeckNotFound);
        let body: ErrorResponse = response.decode().unwrap();
        assert!(body.message.contains("missing"));
    }

    #[tokio::test]
    async fn test_invalid_deck_count() {
        let protocol = protocol();
        let response = send(&protocol, HeaderType::CreateDeck, &CreateDeckRequest { deck_count: 0 }).await;
        assert_eq!(response.header.header_type, HeaderType::InvalidArgument);
    }

    #[tokio::test]
    async fn test_pile_round_trip() {
        let protocol = protocol();
        let deck = create_deck(&protocol).await;

        let draw = DrawCardsRequest {
            deck_id: deck.deck_id.clone(),
            number_to_draw: 2,
        };
        let response = send(&protocol, HeaderType::DrawCards, &draw).await;
        let drawn: DeckView = response.decode().unwrap();
        assert_eq!(drawn.remaining, 50);
        let codes: Vec<String> = drawn.cards.iter().filter(|c| c.drawn).map(|c| c.code.clone()).collect();

        let add = AddToPileRequest {
            deck_id: deck.deck_id.clone(),
            pile_name: "discard".to_string(),
            cards: codes.clone(),
        };
        let response = send(&protocol, HeaderType::AddToPile, &add).await;
        assert_eq!(response.header.header_type, HeaderType::PileState);
        let pile: PileView = response.decode().unwrap();
        assert_eq!(pile.size, 2);

        let shuffle = PileRequest {
            deck_id: deck.deck_id.clone(),
            pile_name: "discard".to_string(),
        };
        let response = send(&protocol, HeaderType::ShufflePile, &shuffle).await;
        let result: ShuffleView = response.decode().unwrap();
        assert!(result.shuffled);

        let response = send(&protocol, HeaderType::GetPile, &shuffle).await;
        let pile: PileView = response.decode().unwrap();
        let reordered: Vec<String> = pile.cards.iter().map(|c| c.code.clone()).collect();
        assert_eq!(reordered, vec![codes[1].clone(), codes[0].clone()]);

        let lookup = CardRequest {
            deck_id: deck.deck_id.clone(),
            code: codes[0].clone(),
        };
        let response = send(&protocol, HeaderType::GetCard, &lookup).await;
        let card: CardView = response.decode().unwrap();
        assert_eq!(card.pile.as_deref(), Some("discard"));
    }

    #[tokio::test]
    async fn test_partial_match_lists_codes() {
        let protocol = protocol();
        let deck = create_deck(&protocol).await;
        let add = AddToPileRequest {
            deck_id: deck.deck_id,
            pile_name: "discard".to_string(),
            cards: vec!["AS".to_string(), "QQ".to_string()],
        };
        let response = send(&protocol, HeaderType::AddToPile, &add).await;
        assert_eq!(response.header.header_type, HeaderType::PartialMatch);
        let body: ErrorResponse = response.decode().unwrap();
        assert_eq!(body.unmatched, vec!["QQ".to_string()]);
    }
}
