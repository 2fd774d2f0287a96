use std::path::PathBuf;
use thiserror::Error;

use crate::store::UserId;

pub const DEFAULT_DB_PATH: &str = "bot.db";
pub const DEFAULT_LOG_PATH: &str = "bot.log";
pub const DEFAULT_CHARACTERS_PATH: &str = "data/characters.json";
pub const DEFAULT_SHOP_PATH: &str = "data/shop_items.json";
pub const DEFAULT_BACKUPS_DIR: &str = "backups/db_backups";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("BOT_TOKEN not set in environment")]
    MissingToken,

    #[error("invalid ADMIN_IDS entry: {0:?}")]
    InvalidAdminId(String),
}

/// Users allowed to run admin commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminList(Vec<UserId>);

impl AdminList {
    pub fn new(ids: Vec<UserId>) -> Self {
        Self(ids)
    }

    /// Parse a comma-separated list, skipping blank entries
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut ids = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part
                .parse::<UserId>()
                .map_err(|_| ConfigError::InvalidAdminId(part.to_string()))?;
            ids.push(id);
        }
        Ok(Self(ids))
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.0.contains(&user_id)
    }

    pub fn ids(&self) -> &[UserId] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Runtime settings, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: Option<String>,
    pub admins: AdminList,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub characters_path: PathBuf,
    pub shop_path: PathBuf,
    pub backups_dir: PathBuf,
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let path_or = |key: &str, default: &str| {
            PathBuf::from(non_empty(key).unwrap_or_else(|| default.to_string()))
        };

        let admins = match non_empty("ADMIN_IDS") {
            Some(raw) => AdminList::parse(&raw)?,
            None => AdminList::default(),
        };

        Ok(Self {
            bot_token: non_empty("BOT_TOKEN"),
            admins,
            db_path: path_or("DB_PATH", DEFAULT_DB_PATH),
            log_path: path_or("LOG_PATH", DEFAULT_LOG_PATH),
            characters_path: path_or("CHARACTERS_PATH", DEFAULT_CHARACTERS_PATH),
            shop_path: path_or("SHOP_PATH", DEFAULT_SHOP_PATH),
            backups_dir: path_or("BACKUPS_DIR", DEFAULT_BACKUPS_DIR),
        })
    }

    /// Token needed to talk to the Bot API
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.bot_token.as_deref().ok_or(ConfigError::MissingToken)
    }
}
