use thiserror::Error;

/// Failures of the deck operations, surfaced to callers as typed results.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("No such deck `{0}`")]
    DeckNotFound(String),
    #[error("No such pile `{pile}` on deck `{deck_id}`")]
    PileNotFound { deck_id: String, pile: String },
    #[error("No card `{code}` on deck `{deck_id}`")]
    CardNotFound { deck_id: String, code: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unmatched card codes: {}", .0.join(", "))]
    PartialMatch(Vec<String>),
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not encode deck record: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Corrupt deck record `{0}`")]
    CorruptRecord(String),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid protocol header: {0}")]
    InvalidHeaderError(String),
    #[error("Invalid packet: {0}")]
    InvalidPacketError(String),
    #[error("Could not decode payload: {0}")]
    PayloadError(String),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
