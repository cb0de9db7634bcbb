use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATABASE_PATH: &str = "db";
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Server settings, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Port the websocket server listens on.
    pub port: u16,
    /// Port the statistics API listens on, if it is enabled.
    pub api_port: Option<u16>,
    /// Directory of the sled database.
    pub database_path: PathBuf,
    /// How long a session may sit idle before it is purged.
    pub session_ttl: Duration,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is unspecified")]
    Missing(&'static str),
    #[error("{0} is invalid: {1}")]
    Invalid(&'static str, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT").ok_or(ConfigError::Missing("PORT"))?;
        let port = parse("PORT", &port)?;
        let api_port = lookup("API_PORT").map(|p| parse("API_PORT", &p)).transpose()?;
        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        let session_ttl = lookup("SESSION_TTL_SECS")
            .map(|s| parse("SESSION_TTL_SECS", &s).map(Duration::from_secs))
            .transpose()?
            .unwrap_or(DEFAULT_SESSION_TTL);
        Ok(Self {
            port,
            api_port,
            database_path,
            session_ttl,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid(key, value.to_string()))
}
