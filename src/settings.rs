use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::reset::ChannelGroups;
use crate::{AppError, Result};

pub const SETTINGS_FILE: &str = "reset.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "guild-id")]
    pub guild_id: u64,

    /// Whether week-group purges leave pinned messages in place.
    #[serde(default = "default_keep_pinned", rename = "keep-pinned")]
    pub keep_pinned: bool,

    /// Channels hard-cleared on every reset, pins included.
    #[serde(default, rename = "special-channels")]
    pub special_channels: Vec<u64>,

    /// Week key ("1", "2", ...) to channel IDs cleared when that week is selected.
    #[serde(default, rename = "week-channels")]
    pub week_channels: BTreeMap<String, Vec<u64>>,
}

fn default_keep_pinned() -> bool {
    true
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AppError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let settings: Settings =
            toml::from_str(&content).map_err(|e| AppError::TomlParse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.guild_id == 0 {
            return Err(AppError::InvalidConfig("guild-id must be set".to_string()));
        }
        Ok(())
    }

    /// Immutable group view handed to the reset engine.
    pub fn groups(&self) -> ChannelGroups {
        ChannelGroups {
            special: self.special_channels.clone(),
            weeks: self.week_channels.clone(),
            keep_pinned: self.keep_pinned,
        }
    }
}
