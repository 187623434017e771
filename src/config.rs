use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TabulaError;

/// Runtime settings.
///
/// Sources, later ones winning: built-in defaults, `tabula.toml`, then
/// `TABULA_*` environment variables (e.g. `TABULA_DATABASE_URL`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub schema_path: PathBuf,
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:db.sqlite".to_string(),
            schema_path: PathBuf::from("schema.json"),
            listen_addr: "0.0.0.0:3000".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("tabula.toml"))
            .merge(Env::prefixed("TABULA_"))
    }

    pub fn load() -> Result<Self, TabulaError> {
        Ok(Self::figment().extract()?)
    }
}
