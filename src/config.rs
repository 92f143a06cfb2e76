use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SqlitebotError;

const ENV_PREFIX: &str = "SQLITEBOT_";

/// Runtime settings, resolved once at startup and passed by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory whose immediate files are the served databases.
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Session secret. Not consumed by any route.
    pub cookie_secret: String,
    /// Allow write operations to create a missing database file.
    pub create_databases: bool,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data"),
            host: "0.0.0.0".to_string(),
            port: 8888,
            cookie_secret: String::new(),
            create_databases: false,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `SQLITEBOT_*` environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, SqlitebotError> {
        Ok(Self::figment().extract()?)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
