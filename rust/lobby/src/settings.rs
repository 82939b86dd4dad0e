use durak_ai::Difficulty;
use durak_engine::cards::Variant;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Lobby-wide defaults and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LobbySettings {
    /// Tier used when a single-player game names none
    pub default_difficulty: Difficulty,
    pub default_variant: Variant,
    /// Play AI moves right after each human move
    pub auto_play_ai: bool,
    /// Idle time after which the side on the move forfeits
    pub abandon_timeout_secs: u64,
    /// Lifetime of a room nobody joined
    pub room_timeout_secs: u64,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Medium,
            default_variant: Variant::Standard,
            auto_play_ai: true,
            abandon_timeout_secs: 300,
            room_timeout_secs: 600,
        }
    }
}

impl LobbySettings {
    /// Validate settings values
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.abandon_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "abandon_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.room_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "room_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn abandon_timeout(&self) -> Duration {
        Duration::from_secs(self.abandon_timeout_secs)
    }

    pub fn room_timeout(&self) -> Duration {
        Duration::from_secs(self.room_timeout_secs)
    }
}

/// In-memory settings store with validation
#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: RwLock<LobbySettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: LobbySettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    /// Get current settings
    pub fn get(&self) -> Result<LobbySettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    /// Update settings with validation
    pub fn update(&self, new_settings: LobbySettings) -> Result<LobbySettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        Ok(new_settings)
    }

    /// Update a single field from a JSON value
    pub fn update_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<LobbySettings, SettingsError> {
        let mut current = self.get()?;

        match field {
            "default_difficulty" => {
                current.default_difficulty = serde_json::from_value(value).map_err(|e| {
                    SettingsError::InvalidValue(format!("default_difficulty: {e}"))
                })?;
            }
            "default_variant" => {
                current.default_variant = serde_json::from_value(value)
                    .map_err(|e| SettingsError::InvalidValue(format!("default_variant: {e}")))?;
            }
            "auto_play_ai" => {
                current.auto_play_ai = value.as_bool().ok_or_else(|| {
                    SettingsError::InvalidValue("auto_play_ai must be a boolean".to_string())
                })?;
            }
            "abandon_timeout_secs" => {
                current.abandon_timeout_secs = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("abandon_timeout_secs must be a number".to_string())
                })?;
            }
            "room_timeout_secs" => {
                current.room_timeout_secs = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("room_timeout_secs must be a number".to_string())
                })?;
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )));
            }
        }

        self.update(current)
    }

    /// Reset to default settings
    pub fn reset(&self) -> Result<LobbySettings, SettingsError> {
        self.update(LobbySettings::default())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}
