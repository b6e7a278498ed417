//! Connection configuration
//!
//! Priority: CLI args > `RTDBSQL_*` environment > TOML config file > defaults.
//! CLI overrides are applied by the binary on top of [`ConnectionConfig::load`].

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::storage::Credentials;
use crate::types::DatabaseError;

const ENV_PREFIX: &str = "RTDBSQL";

/// Searched in order when no explicit file is given
const DEFAULT_PATHS: [&str; 2] = ["/etc/rtdbsql/rtdbsql.toml", "./rtdbsql.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Path under which tables live in the store, e.g. `app/prod`
    pub root: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// JSON document backing the in-memory store
    pub data_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            username: None,
            password: None,
            data_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Load from the config file and the process environment
    ///
    /// An explicit `path` must exist; the default locations are optional.
    pub fn load(path: Option<&Path>) -> Result<Self, DatabaseError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, DatabaseError> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
                debug!(path = %path.display(), "Loading config");
            }
            None => {
                if let Some(found) = DEFAULT_PATHS.iter().map(Path::new).find(|p| p.exists()) {
                    builder = builder.add_source(File::from(found).required(false));
                    debug!(path = %found.display(), "Loading config");
                }
            }
        }

        let config = builder.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Credentials to submit on sign-out events, if a user is configured
    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_ref().map(|user| {
            Credentials::new(user.clone(), self.password.clone().unwrap_or_default())
        })
    }
}
