use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{QuantDbError, Result};

/// Credentials for one database connection.
///
/// Immutable once built; the client keeps its own copy for reconnects.
/// No port, TLS or timeout settings live here: those are the driver's defaults.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    host: String,
    user: String,
    password: String,
    #[serde(alias = "db_name")]
    database: String,
}

impl ConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        ConnectionConfig {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

// Hand-written so the password never reaches logs
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: ConnectionConfig,
}

impl Config {
    /// Parses configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Config> {
        Ok(toml::from_str(content)?)
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = quantdb::config::load_config("quantdb.toml")?;
/// println!("{:?}", config.database);
/// # Ok::<(), quantdb::QuantDbError>(())
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        QuantDbError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Config::from_toml_str(&content)
}

/// Default location of the configuration file: `<config dir>/quantdb/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quantdb").join("config.toml"))
}
