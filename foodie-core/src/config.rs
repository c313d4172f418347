//! Global foodie configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::notify::DEFAULT_REMINDER_TITLE;
use crate::store::MeetUpStore;

static DEFAULT_DATA_DIR: &str = "~/foodie";
static DEFAULT_USER_ID: &str = "local-user";
static DEFAULT_TICK: &str = "5s";
static DEFAULT_POLL: &str = "1s";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_collection() -> String {
    MeetUpStore::DEFAULT_COLLECTION.to_string()
}

fn default_tick() -> String {
    DEFAULT_TICK.to_string()
}

fn default_poll() -> String {
    DEFAULT_POLL.to_string()
}

fn default_reminder_title() -> String {
    DEFAULT_REMINDER_TITLE.to_string()
}

/// Global configuration at ~/.config/foodie/config.toml
///
/// Every key is optional. `FOODIE_<KEY>` environment variables override the
/// file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FoodieConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Owner stamped on meet-ups created from this device.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// How often the upcoming/past split is re-evaluated, e.g. "5s".
    #[serde(default = "default_tick")]
    pub tick_interval: String,

    /// How often the local collection file is checked for changes.
    #[serde(default = "default_poll")]
    pub poll_interval: String,

    #[serde(default = "default_reminder_title")]
    pub reminder_title: String,
}

impl Default for FoodieConfig {
    fn default() -> Self {
        FoodieConfig {
            data_dir: default_data_dir(),
            user_id: default_user_id(),
            collection: default_collection(),
            tick_interval: default_tick(),
            poll_interval: default_poll(),
            reminder_title: default_reminder_title(),
        }
    }
}

impl FoodieConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".into()))?
            .join("foodie");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented file first if
    /// there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: FoodieConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("FOODIE"))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // Surface bad durations at load time rather than on first use.
        config.tick()?;
        config.poll()?;

        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let contents = format!(
            "\
# foodie configuration

# Where local meet-ups and pending reminders are kept:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Owner id written on new meet-ups:
# user_id = \"{DEFAULT_USER_ID}\"

# Collection name:
# collection = \"{}\"

# How often `foodie watch` re-checks which meet-ups are past:
# tick_interval = \"{DEFAULT_TICK}\"

# How often the meet-up file is checked for outside changes:
# poll_interval = \"{DEFAULT_POLL}\"

# Reminder notification title:
# reminder_title = \"{DEFAULT_REMINDER_TITLE}\"
",
            MeetUpStore::DEFAULT_COLLECTION
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// The effective configuration, as it would be written to the file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn tick(&self) -> Result<Duration, ConfigError> {
        parse_interval("tick_interval", &self.tick_interval)
    }

    pub fn poll(&self) -> Result<Duration, ConfigError> {
        parse_interval("poll_interval", &self.poll_interval)
    }
}

fn parse_interval(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value)
        .map_err(|e| ConfigError::Invalid(format!("{key} '{value}': {e}")))?;

    if duration.is_zero() {
        return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
    }

    Ok(duration)
}
