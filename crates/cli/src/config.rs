//! Environment-driven configuration.

use splitledger_core::PersonId;
use splitledger_ledger::sample::ACTIVE_USER;
use splitledger_observability::{LogFormat, ParseLogFormatError};
use thiserror::Error;

pub const ACTIVE_USER_VAR: &str = "SPLITLEDGER_ACTIVE_USER";
pub const LOG_FORMAT_VAR: &str = "SPLITLEDGER_LOG_FORMAT";
pub const ACTIVITY_LIMIT_VAR: &str = "SPLITLEDGER_ACTIVITY_LIMIT";
pub const SEARCH_VAR: &str = "SPLITLEDGER_SEARCH";

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SPLITLEDGER_ACTIVE_USER cannot be blank")]
    BlankActiveUser,

    #[error("SPLITLEDGER_LOG_FORMAT: {0}")]
    LogFormat(#[from] ParseLogFormatError),

    #[error("SPLITLEDGER_ACTIVITY_LIMIT must be a positive integer, got `{0}`")]
    ActivityLimit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub active_user: PersonId,
    pub log_format: LogFormat,
    pub activity_limit: usize,
    pub search: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let active_user = match lookup(ACTIVE_USER_VAR) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::BlankActiveUser)?,
            None => PersonId::new(ACTIVE_USER),
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };

        let activity_limit = match lookup(ACTIVITY_LIMIT_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::ActivityLimit(raw)),
            },
            None => DEFAULT_ACTIVITY_LIMIT,
        };

        let search = lookup(SEARCH_VAR).filter(|q| !q.trim().is_empty());

        Ok(Self {
            active_user,
            log_format,
            activity_limit,
            search,
        })
    }
}
