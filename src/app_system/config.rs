use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::delivery_note::DeliveryNoteHeader;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub actors: ActorConfig,
    pub logging: LoggingConfig,
    pub delivery_note: DeliveryNoteHeader,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ActorConfig {
    /// Capacity of each collection actor's request channel.
    pub buffer_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Built-in defaults, then the file at `path` if present, then
    /// `STOCKPILOT__*` environment variables (e.g. `STOCKPILOT__ACTORS__BUFFER_SIZE=64`).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("actors.buffer_size", 32_i64)?
            .set_default("logging.filter", "stockpilot=info")?
            .set_default("delivery_note.issuer", "Stationery Inventory")?
            .set_default("delivery_note.city", "Jakarta")?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("STOCKPILOT").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        if config.actors.buffer_size == 0 {
            return Err(ConfigError::Message("actors.buffer_size must be greater than zero".to_string()));
        }
        Ok(config)
    }
}
