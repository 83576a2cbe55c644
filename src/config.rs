use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::queue::RingBuffer;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Process-wide settings.
///
/// Read from a JSON file with PascalCase keys; absent keys keep their
/// defaults. `SLOTMQ_*` environment variables override the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Largest accepted message, in bytes.
    #[serde(rename = "MessageMaxSize")]
    pub slot_size: usize,
    /// Messages held per channel.
    pub capacity: usize,
    pub auth_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            slot_size: 4096,
            capacity: 1000,
            auth_key: None,
        }
    }
}

impl Config {
    /// Load from `SLOTMQ_CONFIG` (or `config.json`) and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("SLOTMQ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path, |name| std::env::var(name).ok())
    }

    pub fn load_from<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = match Self::from_file(path)? {
            Some(config) => config,
            None => {
                tracing::warn!(
                    "config file {} not found, using default configuration",
                    path.display()
                );
                Self::default()
            }
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file. A missing file is `Ok(None)`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SLOTMQ_HOST") {
            self.host = host;
        }
        if let Some(port) = parse_env(&lookup, "SLOTMQ_PORT")? {
            self.port = port;
        }
        if let Some(slot_size) = parse_env(&lookup, "SLOTMQ_SLOT_SIZE")? {
            self.slot_size = slot_size;
        }
        if let Some(capacity) = parse_env(&lookup, "SLOTMQ_CAPACITY")? {
            self.capacity = capacity;
        }
        if let Some(auth_key) = lookup("SLOTMQ_AUTH_KEY") {
            self.auth_key = Some(auth_key);
        }
        Ok(())
    }

    /// Reject a slot geometry no ring buffer could be built with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        RingBuffer::required_bytes(self.slot_size, self.capacity)?;
        Ok(())
    }

    /// Configured shared secret. An empty key disables auth.
    pub fn auth_key(&self) -> Option<&str> {
        self.auth_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnv {
            name: name.to_string(),
            value,
        }),
    }
}
