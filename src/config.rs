use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
}

/// Runtime settings, read once at startup and handed to whatever needs them.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub seed_account: Option<SeedAccount>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();
        Config::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Config, ConfigError> {
        let get = |key: &str| vars.get(key).filter(|value| !value.is_empty());

        let database_url = get("DATABASE_URL")
            .cloned()
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("SECRET").cloned().ok_or(ConfigError::Missing("SECRET"))?;

        let bind_address: SocketAddr = match get("BIND_ADDRESS") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDRESS",
                value: value.clone(),
            })?,
            None => DEFAULT_BIND_ADDRESS
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    key: "BIND_ADDRESS",
                    value: DEFAULT_BIND_ADDRESS.to_owned(),
                })?,
        };

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or(ConfigError::Invalid {
                    key: "TOKEN_TTL_HOURS",
                    value: value.clone(),
                })?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let seed_account = match (get("SEED_USERNAME"), get("SEED_PASSWORD")) {
            (Some(username), Some(password)) => Some(SeedAccount {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("SEED_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("SEED_USERNAME")),
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            token_ttl_hours,
            seed_account,
        })
    }
}
