pub mod requests;
pub mod settings;
pub mod views;
