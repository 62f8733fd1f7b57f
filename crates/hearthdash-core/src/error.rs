// ── Core error types ──
//
// User-facing errors from hearthdash-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<hearthdash_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device API rejected the configured token")]
    Unauthorized,

    #[error("Device API timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Model errors ─────────────────────────────────────────────────
    #[error("Page {index} does not exist ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Widget {index} does not exist on page {page} ({count} widgets)")]
    WidgetOutOfRange {
        page: usize,
        index: usize,
        count: usize,
    },

    #[error("Layout for page {page} has {got} rectangles but the page has {expected} widgets")]
    LayoutMismatch {
        page: usize,
        expected: usize,
        got: usize,
    },

    #[error("Cannot remove the last page")]
    LastPage,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hearthdash_api::Error> for CoreError {
    fn from(err: hearthdash_api::Error) -> Self {
        match err {
            hearthdash_api::Error::Unauthorized => CoreError::Unauthorized,
            hearthdash_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("Invalid API token: {reason}"),
            },
            hearthdash_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hearthdash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hearthdash_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            hearthdash_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            hearthdash_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            hearthdash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
