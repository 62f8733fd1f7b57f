//! Shared configuration for the hearthdash terminal dashboard.
//!
//! TOML file + `HEARTHDASH_` environment, token resolution (env var,
//! keyring, plaintext), translation to `hearthdash_core::DashboardConfig`,
//! and the JSON layout file.

mod layout;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hearthdash_core::{DashboardConfig, TlsVerification};

pub use layout::{default_layout_path, load_layout, save_layout};

const KEYRING_SERVICE: &str = "hearthdash";
const KEYRING_USER: &str = "api-token";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("layout file {path} is not valid: {source}")]
    Layout {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize layout: {0}")]
    LayoutSerialization(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Device API base URL (e.g., "http://hub.local:8080/api").
    pub api_url: Option<String>,

    /// Seconds between device list fetches.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Bearer token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable holding the bearer token.
    pub token_env: Option<String>,

    /// Consult the system keyring for the token.
    #[serde(default = "default_true")]
    pub keyring: bool,

    /// Where the dashboard layout is stored.
    pub layout_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_interval_secs: default_poll_interval(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
            token: None,
            token_env: None,
            keyring: true,
            layout_file: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "hearthdash", "hearthdash")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hearthdash");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file yields
/// the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HEARTHDASH_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token: `token_env` variable, then the system
/// keyring, then plaintext. `None` means unauthenticated requests.
pub fn resolve_token(cfg: &Config) -> Option<SecretString> {
    resolve_token_with(cfg, |name| std::env::var(name).ok())
}

fn resolve_token_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Named env var
    if let Some(val) = cfg.token_env.as_deref().and_then(&env) {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if cfg.keyring {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(secret) = entry.get_password() {
                return Some(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    cfg.token.clone().map(SecretString::from)
}

/// Store a token in the system keyring.
pub fn store_token(token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DashboardConfig` for the core crate.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    let raw = cfg.api_url.as_deref().ok_or_else(|| ConfigError::Validation {
        field: "api_url".into(),
        reason: "not set (use --url, HEARTHDASH_API_URL, or the config file)".into(),
    })?;
    let api_url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    if cfg.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval_secs".into(),
            reason: "must be at least 1".into(),
        });
    }

    let tls = if cfg.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = DashboardConfig::new(api_url);
    config.token = resolve_token(cfg);
    config.tls = tls;
    config.timeout = Duration::from_secs(cfg.timeout_secs);
    config.poll_interval = Duration::from_secs(cfg.poll_interval_secs);
    Ok(config)
}

/// The layout file: the configured path, else the platform data dir.
pub fn layout_path(cfg: &Config) -> PathBuf {
    cfg.layout_file.clone().unwrap_or_else(default_layout_path)
}
