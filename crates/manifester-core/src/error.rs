// ── Core error types ──
//
// Errors surfaced by manifester-core. Consumers never see raw HTTP status
// codes or JSON parse failures; the `From<manifester_api::Error>` impl
// translates transport-layer errors into domain variants. Per-file
// failures carry the path they happened on.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

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

    // ── Manifest repository errors ───────────────────────────────────
    #[error("Manifest directory does not exist: {}", path.display())]
    ManifestDirMissing { path: PathBuf },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure to read, create or patch one manifest file.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Property list error in {}: {source}", path.display())]
    Plist {
        path: PathBuf,
        source: plist::Error,
    },

    #[error("Malformed manifest {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: DocumentError,
    },

    #[error("Invalid manifest name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Department template not found at {}", path.display())]
    TemplateMissing { path: PathBuf },
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Structural problems inside an otherwise parseable manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document root is not a dictionary")]
    NotADictionary,

    #[error("`{key}` is not an array")]
    NotAnArray { key: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<manifester_api::Error> for CoreError {
    fn from(err: manifester_api::Error) -> Self {
        use manifester_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } | ApiError::InvalidCredential { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ApiError::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            ApiError::Http { status: 404, url, .. } => CoreError::NotFound { identifier: url },
            ApiError::Http {
                status,
                url,
                message,
            } => CoreError::Api {
                message: format!("{url}: {message}"),
                status: Some(status),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
