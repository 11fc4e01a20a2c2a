//! Configuration types for archive-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Main configuration for ArchiveDownloader
///
/// Loaded once at start-up. Every field has a default, and blank values in
/// the JSON file (empty `port` string, empty `file_types`, empty
/// `temp_folder`) fall back to the default individually.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Listen port (default: 8080). Accepts a number or a numeric string.
    #[serde(default = "default_port", with = "port_serde")]
    pub port: u16,

    /// Allowed file extensions including the leading dot (default: .jpeg, .pdf)
    #[serde(default = "default_file_types")]
    pub file_types: Vec<String>,

    /// Directory for downloaded files and produced archives (default: "files")
    #[serde(default = "default_temp_folder")]
    pub temp_folder: PathBuf,

    /// Maximum number of tasks that may be waiting or in progress at once (default: 3)
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: usize,

    /// Maximum number of pipelines running at once (default: 3)
    #[serde(default = "default_max_concurrent_pipelines")]
    pub max_concurrent_pipelines: usize,

    /// Per-fetch timeout in seconds (default: 60)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub fetch_timeout: Duration,

    /// How long shutdown waits for in-flight pipelines, in seconds (default: 30)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,

    /// Skip unreadable local files while archiving instead of failing the task (default: true)
    #[serde(default = "default_true")]
    pub best_effort_archive: bool,

    /// Enable permissive CORS on the API (default: false)
    #[serde(default)]
    pub cors_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            file_types: default_file_types(),
            temp_folder: default_temp_folder(),
            max_active_tasks: default_max_active_tasks(),
            max_concurrent_pipelines: default_max_concurrent_pipelines(),
            fetch_timeout: default_fetch_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
            best_effort_archive: true,
            cors_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields [`Config::default`]. A file that exists but
    /// cannot be read or parsed is a configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::Config {
                    message: format!("failed to read {}: {}", path.display(), e),
                    key: None,
                });
            }
        };

        Self::from_json(&raw)
    }

    /// Parse configuration from a JSON document and apply defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw).map_err(|e| Error::Config {
            message: format!("invalid config: {}", e),
            key: None,
        })?;
        Ok(config.normalized())
    }

    /// Replace blank values with defaults and normalise extensions.
    pub fn normalized(mut self) -> Self {
        if self.port == 0 {
            self.port = default_port();
        }

        self.file_types = self
            .file_types
            .iter()
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty() && ext != ".")
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        if self.file_types.is_empty() {
            self.file_types = default_file_types();
        }

        if self.temp_folder.as_os_str().is_empty() {
            self.temp_folder = default_temp_folder();
        }
        if self.max_active_tasks == 0 {
            self.max_active_tasks = default_max_active_tasks();
        }
        if self.fetch_timeout.is_zero() {
            self.fetch_timeout = default_fetch_timeout();
        }
        if self.max_concurrent_pipelines == 0 {
            self.max_concurrent_pipelines = default_max_concurrent_pipelines();
        }
        self
    }

    /// Socket address the API listens on (all interfaces)
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn default_port() -> u16 {
    8080
}

fn default_file_types() -> Vec<String> {
    vec![".jpeg".to_string(), ".pdf".to_string()]
}

fn default_temp_folder() -> PathBuf {
    PathBuf::from("files")
}

fn default_max_active_tasks() -> usize {
    3
}

fn default_max_concurrent_pipelines() -> usize {
    3
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Port accepts `8080` or `"8080"`; a blank string decodes to 0 and is
// replaced by the default in `Config::normalized`.
mod port_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    pub fn serialize<S>(port: &u16, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(*port)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawPort::deserialize(deserializer)? {
            RawPort::Number(port) => Ok(port),
            RawPort::Text(text) if text.trim().is_empty() => Ok(0),
            RawPort::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid port: {:?}", text))),
        }
    }
}
