// Shared transport configuration and response handling.
//
// All three clients (Kandji, Jamf, Okta) build their `reqwest::Client`
// through this module and decode responses with the same status mapping,
// so error semantics are identical across API surfaces.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("manifester/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (lab instances with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// Each API client injects its `Authorization` / `Accept` headers here
    /// so individual requests never have to repeat them.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── URL + credential shaping ─────────────────────────────────────────

/// Normalize a user-supplied base URL so it ends with `suffix/`.
///
/// `https://acme.api.kandji.io` and `https://acme.api.kandji.io/api/v1`
/// both become `https://acme.api.kandji.io/api/v1/`. Relative endpoint
/// paths can then be joined onto the result.
pub fn shape_base_url(raw: &str, suffix: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw.trim())?;

    let path = url.path().trim_end_matches('/').to_owned();
    let suffix = suffix.trim_matches('/');

    if suffix.is_empty() || path.ends_with(&format!("/{suffix}")) {
        url.set_path(&format!("{path}/"));
    } else {
        url.set_path(&format!("{path}/{suffix}/"));
    }

    Ok(url)
}

/// Build a sensitive `Authorization` header value, prefixing `scheme`
/// unless the token already carries it.
pub fn authorization_value(token: &SecretString, scheme: &str) -> Result<HeaderValue, Error> {
    let raw = token.expose_secret().trim();
    let prefix = format!("{scheme} ");
    let full = if raw.starts_with(&prefix) {
        raw.to_owned()
    } else {
        format!("{prefix}{raw}")
    };

    let mut value = HeaderValue::from_str(&full).map_err(|e| Error::InvalidCredential {
        message: format!("invalid {scheme} token header value: {e}"),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

// ── Response handling ────────────────────────────────────────────────

/// Map a non-success response to an [`Error`]; pass successes through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().to_string();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("HTTP {} from {url}", status.as_u16()),
        });
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);
        return Err(Error::RateLimited { retry_after_secs });
    }

    let raw = resp.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        url,
        message: if raw.is_empty() {
            status.to_string()
        } else {
            raw
        },
    })
}

/// Decode a JSON body, keeping a preview of the raw payload on failure.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let resp = check_status(resp).await?;
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
