use std::{
    env,
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
};

use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDRESS `{value}`: {source}")]
    InvalidBindAddress {
        value: String,
        source: AddrParseError,
    },
}

/// Settings of the web server. The database and the geocoding provider
/// read their own variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Secret guarding all admin routes.
    pub admin_key: Option<String>,
    /// Error responses carry the underlying detail.
    pub development: bool,
    /// Imported at start-up while the database holds no carparks.
    pub seed_csv: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_address = non_empty("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned());
        let bind_address = bind_address.parse::<SocketAddr>().map_err(|source| {
            ConfigError::InvalidBindAddress {
                value: bind_address.clone(),
                source,
            }
        })?;

        Ok(Self {
            bind_address,
            admin_key: non_empty("ADMIN_ACCESS_KEY"),
            development: non_empty("APP_ENV")
                .is_some_and(|value| value.eq_ignore_ascii_case("development")),
            seed_csv: non_empty("SEED_CSV").map(PathBuf::from),
        })
    }
}
