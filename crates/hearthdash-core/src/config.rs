// ── Runtime connection configuration ──
//
// Describes *how* to reach the device API. Carries the token and tuning,
// but never touches disk: hearthdash-config builds one and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Poll period of the device registry.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed hubs).
    DangerAcceptInvalid,
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Device API base URL (e.g., `http://hub.local:8080/api`).
    pub api_url: Url,
    /// Optional bearer token.
    pub token: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often the device list is refetched.
    pub poll_interval: Duration,
}

impl DashboardConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
