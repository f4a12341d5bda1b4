//! Configuration loading and constants.
//!
//! Configuration is layered: built-in defaults, an optional TOML file, the
//! `PORT` environment variable, and finally command line overrides applied in
//! `main`. `AppConfig` is the root configuration struct containing all settings.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================
// The pixel must never be served from a cache: every open has to reach us.

/// Max-age for the pixel response (always revalidate)
pub const HTTP_CACHE_PIXEL_MAX_AGE: u32 = 0;

pub const CACHE_CONTROL_PIXEL: &str = formatcp!(
    "no-store, no-cache, must-revalidate, max-age={}",
    HTTP_CACHE_PIXEL_MAX_AGE
);

// =============================================================================
// Tracking Endpoint
// =============================================================================

/// Path the tracking pixel is served on
pub const TRACK_PATH: &str = "/track";

/// Query parameter carrying the email identifier
pub const EMAIL_QUERY_PARAM: &str = "email";

/// Response body when the pixel asset cannot be loaded
pub const PIXEL_ERROR_BODY: &str = "Error loading pixel";

/// Content type of the pixel asset
pub const PIXEL_CONTENT_TYPE: &str = "image/gif";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Configuration file loaded when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default pixel asset, relative to the working directory
pub const DEFAULT_PIXEL_PATH: &str = "transparent.gif";

/// Default bind address (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port when neither config, `PORT` nor `--port` set one
pub const DEFAULT_PORT: u16 = 10000;

/// Environment variable selecting the listening port
pub const PORT_ENV_VAR: &str = "PORT";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "trackpixel=info,tower_http=info";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Pixel asset configuration
    #[serde(default)]
    pub pixel: PixelConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    /// Socket address to bind, built from `host` and `port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            ConfigError::Validation(format!("http.host is not an IP address: {}", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Where the pixel comes from and whether it is kept in memory
#[derive(Debug, Clone, Deserialize)]
pub struct PixelConfig {
    /// Path of the GIF served by the tracking endpoint
    #[serde(default = "PixelConfig::default_path")]
    pub path: PathBuf,
    /// Read the asset once at startup instead of on every request
    #[serde(default)]
    pub preload: bool,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            preload: false,
        }
    }
}

impl PixelConfig {
    fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_PIXEL_PATH)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load the explicitly requested file, else `DEFAULT_CONFIG_PATH` if it
    /// exists, else built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Full startup resolution with port priority: `port_arg` > `port_env` >
    /// file > `DEFAULT_PORT`.
    ///
    /// `port_env` is the value of `PORT_ENV_VAR`, looked up by the caller.
    pub fn resolve(
        path: Option<&Path>,
        port_env: Option<String>,
        port_arg: Option<u16>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(path)?;
        config.apply_port_env(port_env)?;
        if let Some(port) = port_arg {
            config.http.port = port;
        }
        Ok(config)
    }

    /// Apply the value of the `PORT` environment variable, if any.
    ///
    /// An unset or empty variable leaves the configured port untouched.
    pub fn apply_port_env(&mut self, value: Option<String>) -> Result<(), ConfigError> {
        match value.as_deref().map(str::trim) {
            None | Some("") => Ok(()),
            Some(raw) => {
                self.http.port = parse_port(raw)?;
                Ok(())
            }
        }
    }
}

/// Parse a port number, accepting an optional leading `:` (`":3000"`).
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let digits = raw.strip_prefix(':').unwrap_or(raw);
    digits
        .parse()
        .map_err(|_| ConfigError::Validation(format!("invalid port: {:?}", raw)))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
