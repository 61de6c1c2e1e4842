//! Service configuration
//!
//! Resolved in layers, later layers win:
//! 1. built-in defaults
//! 2. TOML file (`--config`, else `./profiled.toml` when present)
//! 3. environment (`TEST_DATABASE_URL`, `DATABASE_URL`, `PROFILED_HOST`, `PROFILED_PORT`)
//! 4. command line flags (`--database` here, `serve` flags by the caller)
//!
//! The default database file under the home directory is only looked up when
//! no layer names a database.

use crate::store::{SqliteProfileStore, DEFAULT_MAX_PAGE_SIZE};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "profiled.toml";

/// What to do with an unrecognized status token on update
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusTokenPolicy {
    /// Drop the token, log a warning, apply the rest of the update
    #[default]
    Ignore,
    /// Fail the whole update
    Reject,
}

/// Where profile data lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parse a database URL or path.
    ///
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `sqlite::memory:`,
    /// `:memory:` and bare filesystem paths.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            anyhow::bail!("Database location is empty");
        }

        let path = if let Some(rest) = value.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = value.strip_prefix("sqlite:") {
            rest
        } else if value.contains("://") {
            anyhow::bail!(
                "Unsupported database URL '{}': only sqlite:// URLs and file paths are supported",
                value
            );
        } else {
            value
        };

        if path == ":memory:" {
            Ok(DatabaseLocation::Memory)
        } else if path.is_empty() {
            anyhow::bail!("Database URL '{}' has no path", value)
        } else {
            Ok(DatabaseLocation::File(PathBuf::from(path)))
        }
    }

    /// Default database file (~/.profiled/profiles.db)
    pub fn default_file() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(DatabaseLocation::File(home.join(".profiled").join("profiles.db")))
    }

    /// Open the profile store at this location
    pub fn open_store(&self, max_page_size: u32) -> Result<SqliteProfileStore> {
        let store = match self {
            DatabaseLocation::Memory => SqliteProfileStore::open_in_memory()?,
            DatabaseLocation::File(path) => SqliteProfileStore::open(path)?,
        };
        Ok(store.with_max_page_size(max_page_size))
    }
}

impl std::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseLocation::Memory => write!(f, ":memory:"),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// CORS settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorsConfig {
    /// Allow any origin, method and header
    pub permissive: bool,

    /// Origins allowed when `permissive` is off
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            permissive: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseLocation,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub status_policy: StatusTokenPolicy,
    pub log_level: String,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Defaults with an explicit database location
    pub fn with_database(database: DatabaseLocation) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database,
            default_page_size: 10,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            status_policy: StatusTokenPolicy::default(),
            log_level: "info".to_string(),
            cors: CorsConfig::default(),
        }
    }

    /// Resolve defaults, config file, process environment and the
    /// `--database` flag
    pub fn load(config_path: Option<&Path>, database_flag: Option<&str>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::resolve(config_path, database_flag, &env)
    }

    /// Resolve with an explicit environment map
    pub fn resolve(
        config_path: Option<&Path>,
        database_flag: Option<&str>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        Self::resolve_with_default(config_path, database_flag, env, DatabaseLocation::default_file)
    }

    /// `default_database` is only consulted when no layer names a database
    fn resolve_with_default(
        config_path: Option<&Path>,
        database_flag: Option<&str>,
        env: &HashMap<String, String>,
        default_database: impl FnOnce() -> Result<DatabaseLocation>,
    ) -> Result<Self> {
        let mut config = Self::with_database(DatabaseLocation::Memory);
        let mut database = None;

        let file = match config_path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => {
                let local = Path::new(LOCAL_CONFIG_FILE);
                if local.exists() {
                    Some(ConfigFile::load(local)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            database = config.apply_file(file)?;
        }

        database = config.apply_env(env)?.or(database);

        if let Some(flag) = database_flag {
            database = Some(DatabaseLocation::parse(flag)?);
        }

        config.database = match database {
            Some(database) => database,
            None => default_database()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the database named by the file, if any
    fn apply_file(&mut self, file: ConfigFile) -> Result<Option<DatabaseLocation>> {
        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(size) = file.default_page_size {
            self.default_page_size = size;
        }
        if let Some(size) = file.max_page_size {
            self.max_page_size = size;
        }
        if let Some(policy) = file.status_policy {
            self.status_policy = policy;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(cors) = file.cors {
            self.cors = cors;
        }
        file.database
            .as_deref()
            .map(DatabaseLocation::parse)
            .transpose()
    }

    /// Returns the database named by the environment, if any
    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<Option<DatabaseLocation>> {
        if let Some(host) = env.get("PROFILED_HOST") {
            self.host = host.clone();
        }
        if let Some(port) = env.get("PROFILED_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid PROFILED_PORT: {}", port))?;
        }

        // TEST_DATABASE_URL takes precedence so test runs never touch the real database
        let database_url = env
            .get("TEST_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"));
        database_url
            .map(|url| {
                DatabaseLocation::parse(url)
                    .with_context(|| format!("Invalid database URL in environment: {}", url))
            })
            .transpose()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            anyhow::bail!("max_page_size must be greater than zero");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        if !self.cors.permissive && self.cors.allowed_origins.is_empty() {
            anyhow::bail!("cors.allowed_origins must be set when cors.permissive is false");
        }
        Ok(())
    }
}

/// On-disk config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
    status_policy: Option<StatusTokenPolicy>,
    log_level: Option<String>,
    cors: Option<CorsConfig>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
