use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// HTTP API settings
    pub server: ServerConfig,
    /// Outbound request settings
    pub replay: ReplayConfig,
    /// Logging settings
    pub log: LogConfig,
}

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable CORS for development (allows any origin).
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4590,
            cors_permissive: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Default deadline for one replayed request (None = wait forever)
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!("posto/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_permissive: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlReplayConfig {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlLogConfig {
    pub level: Option<String>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub server: Option<TomlServerConfig>,
    pub replay: Option<TomlReplayConfig>,
    pub log: Option<TomlLogConfig>,
}

impl Config {
    /// Load configuration from the data directory, merging with defaults
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific file. Missing or invalid files yield defaults.
    ///
    /// Runs before logging is set up, so an invalid file is reported on stderr.
    pub fn load_from(path: &Path) -> Self {
        Self::try_load_from(path).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid config file {}: {}", path.display(), e);
            Config::default()
        })
    }

    /// Like [`Config::load_from`], but hands back the parse error of an invalid file.
    pub fn try_load_from(path: &Path) -> Result<Self, toml::de::Error> {
        let mut config = Config::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Ok(config),
        };

        config.merge(toml::from_str::<TomlConfig>(&contents)?);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(server) = toml_config.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(cors_permissive) = server.cors_permissive {
                self.server.cors_permissive = cors_permissive;
            }
        }

        if let Some(replay) = toml_config.replay {
            if let Some(secs) = replay.timeout_secs {
                self.replay.timeout = (secs > 0).then(|| Duration::from_secs(secs));
            }
            if let Some(user_agent) = replay.user_agent {
                self.replay.user_agent = user_agent;
            }
        }

        if let Some(level) = toml_config.log.and_then(|log| log.level) {
            self.log.level = level;
        }
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!("Failed to create config directory: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            eprintln!("Failed to write default config: {}", e);
        }
    }
}
