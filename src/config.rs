//! Configuration module for the echo relay.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::sync::Semaphore;

/// Largest accepted read size (16 MiB).
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Command-line arguments for the relay server
#[derive(Parser, Debug, Default)]
#[command(name = "echo-relay")]
#[command(version = "0.1.0")]
#[command(about = "A TCP echo relay server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:8888)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen backlog passed to the kernel
    #[arg(long)]
    pub backlog: Option<u32>,

    /// Maximum number of live connections
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Size of each read in bytes
    #[arg(short = 'b', long)]
    pub buffer_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_backlog")]
    pub backlog: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Bytes requested per read
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            backlog: default_backlog(),
            max_connections: default_max_connections(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8888".to_string()
}

fn default_backlog() -> u32 {
    5
}

fn default_max_connections() -> usize {
    10_000
}

fn default_buffer_size() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub backlog: u32,
    pub max_connections: usize,
    pub buffer_size: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::merge(CliArgs::default(), TomlConfig::default())
    }
}

impl Config {
    /// Load configuration from the process arguments and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Resolve configuration from already-parsed CLI arguments.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let config = Self::merge(cli, toml_config);
        config.validate()?;
        Ok(config)
    }

    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Self {
        Config {
            listen: cli.listen.unwrap_or(toml_config.server.listen),
            backlog: cli.backlog.unwrap_or(toml_config.server.backlog),
            max_connections: cli
                .max_connections
                .unwrap_or(toml_config.server.max_connections),
            buffer_size: cli.buffer_size.unwrap_or(toml_config.server.buffer_size),
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        }
    }

    /// Check value ranges. `Server::bind` runs this too, so a `Config`
    /// built by hand cannot slip past it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Invalid("buffer_size must be greater than 0"));
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            return Err(ConfigError::Invalid("buffer_size must be at most 16 MiB"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0",
            ));
        }
        if self.max_connections > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid("max_connections is too large"));
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    Invalid(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.listen, "0.0.0.0:8888");
        assert_eq!(config.server.backlog, 5);
        assert_eq!(config.server.buffer_size, 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "127.0.0.1:9999"
            backlog = 64
            max_connections = 200
            buffer_size = 4096

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9999");
        assert_eq!(config.server.backlog, 64);
        assert_eq!(config.server.max_connections, 200);
        assert_eq!(config.server.buffer_size, 4096);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TomlConfig = toml::from_str("[server]\nbacklog = 16\n").unwrap();
        assert_eq!(config.server.backlog, 16);
        assert_eq!(config.server.listen, "0.0.0.0:8888");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = CliArgs::try_parse_from([
            "echo-relay",
            "--listen",
            "127.0.0.1:7000",
            "--buffer-size",
            "512",
            "--log-level",
            "trace",
        ])
        .unwrap();

        let config = Config::from_args(cli).unwrap();
        assert_eq!(config.listen, "127.0.0.1:7000");
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.backlog, 5);
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let cli = CliArgs::try_parse_from(["echo-relay", "-b", "0"]).unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_buffer_size_bounds() {
        let max = MAX_BUFFER_SIZE.to_string();
        let cli = CliArgs::try_parse_from(["echo-relay", "-b", max.as_str()]).unwrap();
        assert_eq!(Config::from_args(cli).unwrap().buffer_size, MAX_BUFFER_SIZE);

        let over = (MAX_BUFFER_SIZE + 1).to_string();
        let cli = CliArgs::try_parse_from(["echo-relay", "-b", over.as_str()]).unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let cli = CliArgs::try_parse_from(["echo-relay", "--max-connections", "0"]).unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_max_connections_above_semaphore_limit_rejected() {
        let max = Semaphore::MAX_PERMITS.to_string();
        let cli =
            CliArgs::try_parse_from(["echo-relay", "--max-connections", max.as_str()]).unwrap();
        assert!(Config::from_args(cli).is_ok());

        let too_many = usize::MAX.to_string();
        let cli = CliArgs::try_parse_from([
            "echo-relay",
            "-l",
            "127.0.0.1:0",
            "--max-connections",
            too_many.as_str(),
        ])
        .unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let cli =
            CliArgs::try_parse_from(["echo-relay", "-c", "/nonexistent/relay.toml"]).unwrap();
        assert!(matches!(
            Config::from_args(cli),
            Err(ConfigError::FileRead(_, _))
        ));
    }
}
