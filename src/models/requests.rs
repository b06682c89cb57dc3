use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeckRequest {
    pub deck_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeckRequest {
    pub deck_id: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrawCardsRequest {
    pub deck_id: String,
    pub number_to_draw: i64,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PileRequest {
    pub deck_id: String,
    pub pile_name: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddToPileRequest {
    pub deck_id: String,
    pub pile_name: String,
    pub cards: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub deck_id: String,
    pub code: String,
}

/// Body of every error frame.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<String>,
}
