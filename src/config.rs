use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::error::{DashboardError, Result};

/// Prefix for environment overrides, e.g. `STOCKDESK_API__BACKEND_URL`.
pub const ENV_PREFIX: &str = "STOCKDESK_";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub tui: TuiConfig,
    pub order: OrderConfig,
    pub data: DataConfig,
}

/// Remote endpoints used by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the inventory backend (no trailing `/api`).
    pub backend_url: String,
    /// Base URL of the postal PIN-code lookup service.
    pub postal_lookup_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Session cookie forwarded with every backend request, if set.
    pub session_cookie: Option<String>,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Customer the draft order is placed for.
    pub customer_id: i64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            postal_lookup_url: "https://api.postalpincode.in".to_string(),
            request_timeout_secs: 15,
            session_cookie: None,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: false,
        }
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { customer_id: 1 }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/stockdesk/config.toml` and
    /// `STOCKDESK_*` environment variables.
    ///
    /// On failure the defaults come back alongside the error, so the caller
    /// can start logging first and report it there.
    pub fn load() -> (Self, Option<DashboardError>) {
        match Self::load_from(&Self::config_path()) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Layer defaults, the TOML file at `path` (if present) and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("stockdesk"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory the rolling log files are written to.
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("stockdesk").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
