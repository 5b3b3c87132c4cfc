//! Configuration for manifester.
//!
//! A TOML file merged with `MANIFESTER_*` environment variables, credential
//! resolution (env var -> keyring -> plaintext), and translation into the
//! `manifester_core` runtime configs. The binary layers its CLI flag
//! overrides on top.

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
use url::Url;

use manifester_core::{
    DEFAULT_DETAIL_WORKERS, DirectoryConfig, MdmBackend, MdmConfig, MdmCredentials,
    ReconcileConfig, TlsVerification,
};

/// Keyring service name; entries are `mdm/token`, `mdm/password`, `okta/token`.
pub const KEYRING_SERVICE: &str = "manifester";

/// Environment variable prefix; `__` separates nested keys
/// (`MANIFESTER_MDM__TOKEN` sets `mdm.token`).
pub const ENV_PREFIX: &str = "MANIFESTER_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {secret} configured for [{section}]")]
    NoCredentials { section: String, secret: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Munki `manifests/` directory.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    #[serde(default)]
    pub mdm: MdmSection,

    #[serde(default)]
    pub okta: OktaSection,

    #[serde(default)]
    pub reconcile: ReconcileSection,

    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_dir: default_manifest_dir(),
            mdm: MdmSection::default(),
            okta: OktaSection::default(),
            reconcile: ReconcileSection::default(),
            defaults: Defaults::default(),
        }
    }
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("munki_repo/manifests")
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MdmSection {
    /// `kandji` or `jamf`.
    #[serde(default)]
    pub backend: MdmBackend,

    /// Tenant / server root URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Kandji API token (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the Kandji token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Jamf API account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Jamf password (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the Jamf password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override TLS / timeout defaults for this backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OktaSection {
    /// Org URL (e.g. "https://acme.okta.com").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Org domain; used as `https://<domain>` when `url` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// API token (plaintext -- prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconcileSection {
    /// Okta group name prefix for department groups.
    #[serde(default)]
    pub department_filter: String,

    /// Serial numbers whose manifests are managed by hand.
    #[serde(default)]
    pub exclusions: Vec<String>,

    /// Group names or ids never treated as departments.
    #[serde(default)]
    pub excluded_groups: Vec<String>,

    /// Concurrent Jamf detail lookups.
    #[serde(default = "default_detail_workers")]
    pub detail_workers: usize,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        Self {
            department_filter: String::new(),
            exclusions: Vec::new(),
            excluded_groups: Vec::new(),
            detail_workers: default_detail_workers(),
        }
    }
}

fn default_detail_workers() -> usize {
    DEFAULT_DETAIL_WORKERS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Look secrets up in the system keyring. Disable on headless hosts
    /// without a secret service.
    #[serde(default = "default_true")]
    pub keyring: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            keyring: true,
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "manifester", "manifester").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("manifester");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then `path` (if it exists), then `MANIFESTER_*` env vars.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Where a secret lives: the `*_env` variable name, its keyring entry and
/// its plaintext config value.
struct SecretSource<'a> {
    env_name: Option<&'a str>,
    keyring_key: &'a str,
    plaintext: Option<&'a str>,
}

/// Resolve a secret from the credential chain: env var, keyring, plaintext.
fn resolve_secret(source: &SecretSource<'_>, use_keyring: bool) -> Option<SecretString> {
    // 1. Named env var
    if let Some(val) = source
        .env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|val| !val.is_empty())
    {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    let from_keyring = use_keyring
        .then(|| keyring::Entry::new(KEYRING_SERVICE, source.keyring_key).ok())
        .flatten()
        .and_then(|entry| entry.get_password().ok());
    if let Some(secret) = from_keyring {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    source
        .plaintext
        .filter(|val| !val.is_empty())
        .map(|val| SecretString::from(val.to_owned()))
}

/// Store a secret in the system keyring under `key` (e.g. `mdm/token`).
pub fn store_secret(key: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, key)
        .and_then(|entry| entry.set_password(secret))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store {key}: {e}"),
        })
}

// ── Translation to core configs ─────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL {raw:?}: {e}"),
    })
}

fn tls_for(insecure: Option<bool>, ca_cert: Option<&PathBuf>, defaults: &Defaults) -> TlsVerification {
    if insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca) = ca_cert.or(defaults.ca_cert.as_ref()) {
        TlsVerification::CustomCa(ca.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build the MDM connection config for the configured backend.
pub fn mdm_config(cfg: &Config) -> Result<MdmConfig, ConfigError> {
    let section = &cfg.mdm;
    let raw_url = section.url.as_deref().ok_or_else(|| ConfigError::Validation {
        field: "mdm.url".into(),
        reason: "not set".into(),
    })?;
    let url = parse_url("mdm.url", raw_url)?;

    let credentials = match section.backend {
        MdmBackend::Kandji => {
            let token = resolve_secret(
                &SecretSource {
                    env_name: section.token_env.as_deref(),
                    keyring_key: "mdm/token",
                    plaintext: section.token.as_deref(),
                },
                cfg.defaults.keyring,
            )
            .ok_or_else(|| ConfigError::NoCredentials {
                section: "mdm".into(),
                secret: "kandji API token".into(),
            })?;
            MdmCredentials::Token(token)
        }
        MdmBackend::Jamf => {
            let username = section
                .username
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| ConfigError::NoCredentials {
                    section: "mdm".into(),
                    secret: "jamf username".into(),
                })?;
            let password = resolve_secret(
                &SecretSource {
                    env_name: section.password_env.as_deref(),
                    keyring_key: "mdm/password",
                    plaintext: section.password.as_deref(),
                },
                cfg.defaults.keyring,
            )
            .ok_or_else(|| ConfigError::NoCredentials {
                section: "mdm".into(),
                secret: "jamf password".into(),
            })?;
            MdmCredentials::Basic { username, password }
        }
    };

    if cfg.reconcile.detail_workers == 0 {
        return Err(ConfigError::Validation {
            field: "reconcile.detail_workers".into(),
            reason: "must be at least 1".into(),
        });
    }

    Ok(MdmConfig {
        backend: section.backend,
        url,
        credentials,
        tls: tls_for(section.insecure, section.ca_cert.as_ref(), &cfg.defaults),
        timeout: Duration::from_secs(section.timeout.unwrap_or(cfg.defaults.timeout)),
        detail_workers: cfg.reconcile.detail_workers,
    })
}

/// Build the Okta connection config.
pub fn directory_config(cfg: &Config) -> Result<DirectoryConfig, ConfigError> {
    let section = &cfg.okta;
    let url = match (section.url.as_deref(), section.domain.as_deref()) {
        (Some(url), _) if !url.trim().is_empty() => parse_url("okta.url", url)?,
        (_, Some(domain)) if !domain.trim().is_empty() => {
            parse_url("okta.domain", &format!("https://{}", domain.trim()))?
        }
        _ => {
            return Err(ConfigError::Validation {
                field: "okta.url".into(),
                reason: "set okta.url or okta.domain".into(),
            });
        }
    };

    let token = resolve_secret(
        &SecretSource {
            env_name: section.token_env.as_deref(),
            keyring_key: "okta/token",
            plaintext: section.token.as_deref(),
        },
        cfg.defaults.keyring,
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        section: "okta".into(),
        secret: "API token".into(),
    })?;

    Ok(DirectoryConfig {
        url,
        token,
        tls: tls_for(section.insecure, section.ca_cert.as_ref(), &cfg.defaults),
        timeout: Duration::from_secs(section.timeout.unwrap_or(cfg.defaults.timeout)),
    })
}

/// Build the reconciliation settings.
pub fn reconcile_config(cfg: &Config, dry_run: bool) -> ReconcileConfig {
    ReconcileConfig {
        manifest_dir: cfg.manifest_dir.clone(),
        exclusions: cfg.reconcile.exclusions.clone(),
        department_filter: cfg.reconcile.department_filter.clone(),
        excluded_groups: cfg.reconcile.excluded_groups.clone(),
        dry_run,
    }
}
