//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use manifester_config::ConfigError;
use manifester_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(manifester::connection_failed),
        help(
            "Check the URL and that the host is reachable: {reason}\n\
             For a self-signed server set `insecure = true` or `ca_cert` in the config."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(manifester::timeout),
        help("Raise `timeout` in [defaults] or the service's section.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(manifester::auth_failed),
        help(
            "Verify the API token or account.\n\
             Store a new one with: manifester config set-secret <mdm-token|mdm-password|okta-token>"
        )
    )]
    AuthFailed { message: String },

    #[error("No {secret} configured for [{section}]")]
    #[diagnostic(
        code(manifester::no_credentials),
        help(
            "Set it in the config file, name an env var with `*_env`,\n\
             or run: manifester config set-secret"
        )
    )]
    NoCredentials { section: String, secret: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {identifier}")]
    #[diagnostic(code(manifester::not_found))]
    NotFound { identifier: String },

    #[error("Manifests directory {path} does not exist")]
    #[diagnostic(
        code(manifester::manifest_dir_missing),
        help("Point `manifest_dir` (or --manifest-dir) at the Munki repo's manifests/ directory.")
    )]
    ManifestDirMissing { path: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (status {status:?}): {message}")]
    #[diagnostic(code(manifester::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(manifester::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(manifester::config),
        help("Create a config with: manifester config init")
    )]
    Config { message: String },

    #[error("{path} already exists")]
    #[diagnostic(
        code(manifester::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── Local failures ───────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(manifester::internal))]
    Internal(String),

    #[error(transparent)]
    #[diagnostic(code(manifester::manifest))]
    Manifest(#[from] manifester_core::ManifestError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(manifester::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ManifestDirMissing { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::Config { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::NotFound { identifier } => Self::NotFound { identifier },
            CoreError::Api { message, status } => Self::ApiError { message, status },
            CoreError::Config { message } => Self::Config { message },
            CoreError::ManifestDirMissing { path } => Self::ManifestDirMissing {
                path: path.display().to_string(),
            },
            CoreError::Manifest(e) => Self::Manifest(e),
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { section, secret } => {
                Self::NoCredentials { section, secret }
            }
            ConfigError::Io(e) => Self::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
