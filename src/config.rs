use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::client::ClientSettings;
use crate::constants::{STEP_SIZE, VIEWPORT_SIZE, WORLD_SIZE};
use crate::error::ConfigError;
use crate::store::WorldBounds;

pub const CONFIG_FILE: &str = "townsquare.toml";
pub const ENV_PREFIX: &str = "TOWNSQUARE_";

/// Runtime configuration for the client binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub username: String,
    pub world_width: f32,
    pub world_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Path to the world raster. Without it the world is drawn as nothing.
    #[serde(default)]
    pub world_image: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080".to_string(),
            username: "guest".to_string(),
            world_width: WORLD_SIZE.x as f32,
            world_height: WORLD_SIZE.y as f32,
            viewport_width: VIEWPORT_SIZE.x as f32,
            viewport_height: VIEWPORT_SIZE.y as f32,
            world_image: None,
            log_filter: format!("warn,{}=info", env!("CARGO_CRATE_NAME")),
        }
    }
}

impl ClientConfig {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(ClientConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ];
        for (field, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "username",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            username: self.username.clone(),
            world: WorldBounds::new(self.world_width, self.world_height),
            viewport: Vec2::new(self.viewport_width, self.viewport_height),
            step: STEP_SIZE,
        }
    }
}

/// Loads defaults, then `townsquare.toml`, then `TOWNSQUARE_*` environment variables.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    extract(ClientConfig::figment())
}

pub fn extract(figment: Figment) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
