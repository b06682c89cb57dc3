use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suit {
    Hearts,
    Spades,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Spades, Suit::Clubs, Suit::Diamonds];

    pub fn letter(&self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Spades => 'S',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    /// First character of a card code. Ten uses `0` so every code stays two characters.
    pub fn code_prefix(&self) -> char {
        match self {
            Rank::Ten => '0',
            other => other.label().chars().next().unwrap_or('?'),
        }
    }
}

/// A single card instance owned by one deck.
///
/// `code`, `rank` and `suit` never change after creation. `order` is the
/// card's position inside its current container: the deck's main sequence
/// while `pile` is `None`, otherwise the named pile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub code: String,
    pub rank: Rank,
    pub suit: Suit,
    pub drawn: bool,
    pub order: usize,
    pub pile: Option<String>,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit, order: usize) -> Self {
        Self {
            code: Card::code_for(rank, suit),
            rank,
            suit,
            drawn: false,
            order,
            pile: None,
        }
    }

    pub fn code_for(rank: Rank, suit: Suit) -> String {
        let mut code = String::with_capacity(2);
        code.push(rank.code_prefix());
        code.push(suit.letter());
        code
    }

    /// Every rank of every suit, `sets` times over, in deal order.
    pub fn full_sets(sets: usize) -> Vec<Card> {
        let mut cards = Vec::with_capacity(52 * sets);
        for _ in 0..sets {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    let order = cards.len();
                    cards.push(Card::new(rank, suit, order));
                }
            }
        }
        cards
    }
}
