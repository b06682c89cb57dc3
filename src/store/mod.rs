pub mod deck_store;
pub mod snapshot;
