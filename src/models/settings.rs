use config::{Config, Environment, File};
use serde::Deserialize;

use crate::utils::errors::ServerError;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub max_deck_count: u32,
    pub data_dir: Option<String>,
    pub shuffle_seed: Option<u64>,
}

impl Settings {
    /// Reads `settings.*` from the working directory if present, then applies
    /// `DECK_*` environment overrides (for example `DECK_PORT=9000`).
    pub fn load() -> Result<Self, ServerError> {
        Settings::build(Environment::with_prefix("DECK").try_parsing(true))
    }

    fn build(environment: Environment) -> Result<Self, ServerError> {
        let settings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000_i64)?
            .set_default("log_level", "INFO")?
            .set_default("max_deck_count", 20_i64)?
            .add_source(File::with_name("settings").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }
}
