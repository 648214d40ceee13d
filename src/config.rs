//! Configuration for aarlo.
//!
//! Settings are resolved once at startup into an immutable [`Options`] value.
//! Each source only overrides a setting when it actually carries a value, in
//! this order (last wins): built-in defaults, the config file
//! (`~/.config/aarlo/config.toml` or `--config`), the environment, then
//! command-line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::arlo::ARLO_API_BASE_URL;
use crate::stream::StreamSettings;

pub const ENV_USERNAME: &str = "AARLO_USERNAME";
pub const ENV_PASSWORD: &str = "AARLO_PASSWORD";
pub const ENV_PASS_PHRASE: &str = "AARLO_PASS_PHRASE";

const DEFAULT_STORAGE_DIR: &str = "./";
const DEFAULT_PRIVATE_KEY: &str = "./rsa.private";

/// Config file structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct AccountConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
    pub save_state: Option<bool>,
    pub dump_packets: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    pub compact: Option<bool>,
    pub encrypt: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct KeysConfig {
    pub public_key: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StreamConfig {
    pub ffmpeg: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub playlist: Option<String>,
}

impl Config {
    /// Load the config file.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is used if present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::read(path)
            }
            None => {
                let path = default_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("aarlo")
        .join("config.toml")
}

/// Settings taken from the process environment (including a `.env` file).
#[derive(Debug, Default, Clone)]
pub struct Environment {
    pub username: Option<String>,
    pub password: Option<String>,
    pub pass_phrase: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            username: std::env::var(ENV_USERNAME).ok(),
            password: std::env::var(ENV_PASSWORD).ok(),
            pass_phrase: std::env::var(ENV_PASS_PHRASE).ok(),
        }
    }
}

/// Values given on the command line. `None` means the flag was not used.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub save_state: Option<bool>,
    pub dump_packets: Option<bool>,
    pub compact: Option<bool>,
    pub encrypt: Option<bool>,
    pub public_key: Option<PathBuf>,
    pub private_key: Option<PathBuf>,
    pub pass_phrase: Option<String>,
    pub api_base_url: Option<String>,
    pub verbose: u8,
}

/// Resolved settings shared by every command.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub username: Option<String>,
    pub password: Option<String>,
    pub storage_dir: PathBuf,
    pub save_state: bool,
    pub dump_packets: bool,
    pub compact: bool,
    pub encrypt: bool,
    /// `None` selects the built-in recipient key.
    pub public_key: Option<PathBuf>,
    pub private_key: PathBuf,
    pub pass_phrase: Option<String>,
    pub verbose: u8,
    pub api_base_url: String,
    pub stream: StreamSettings,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            save_state: false,
            dump_packets: false,
            compact: false,
            encrypt: false,
            public_key: None,
            private_key: PathBuf::from(DEFAULT_PRIVATE_KEY),
            pass_phrase: None,
            verbose: 0,
            api_base_url: ARLO_API_BASE_URL.to_string(),
            stream: StreamSettings::default(),
        }
    }
}

impl Options {
    /// Merge settings: CLI flags > environment > config file > defaults.
    pub fn resolve(flags: Overrides, env: Environment, file: Config) -> Self {
        let mut options = Options::default();

        // Config file
        set(&mut options.username, file.account.username.map(Some));
        set(&mut options.password, file.account.password.map(Some));
        set(&mut options.api_base_url, file.account.api_base_url);
        set(&mut options.storage_dir, file.storage.dir);
        set(&mut options.save_state, file.storage.save_state);
        set(&mut options.dump_packets, file.storage.dump_packets);
        set(&mut options.compact, file.output.compact);
        set(&mut options.encrypt, file.output.encrypt);
        set(&mut options.public_key, file.keys.public_key.map(Some));
        set(&mut options.private_key, file.keys.private_key);
        set(&mut options.stream.ffmpeg, file.stream.ffmpeg);
        set(&mut options.stream.output_dir, file.stream.output_dir);
        set(&mut options.stream.playlist, file.stream.playlist);

        // Environment
        set(&mut options.username, env.username.map(Some));
        set(&mut options.password, env.password.map(Some));
        set(&mut options.pass_phrase, env.pass_phrase.map(Some));

        // Command line
        set(&mut options.username, flags.username.map(Some));
        set(&mut options.password, flags.password.map(Some));
        set(&mut options.storage_dir, flags.storage_dir);
        set(&mut options.save_state, flags.save_state);
        set(&mut options.dump_packets, flags.dump_packets);
        set(&mut options.compact, flags.compact);
        set(&mut options.encrypt, flags.encrypt);
        set(&mut options.public_key, flags.public_key.map(Some));
        set(&mut options.private_key, flags.private_key);
        set(&mut options.pass_phrase, flags.pass_phrase.map(Some));
        set(&mut options.api_base_url, flags.api_base_url);
        options.verbose = flags.verbose;

        options
    }
}

/// Overwrite `slot` only when `value` is present.
fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
