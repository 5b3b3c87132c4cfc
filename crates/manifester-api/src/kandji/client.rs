// Kandji API HTTP client
//
// Wraps `reqwest::Client` with bearer auth and `api/v1/` URL construction.
// Endpoint modules (devices) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Async client for the Kandji device inventory API.
pub struct KandjiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl KandjiClient {
    /// Build from a tenant URL and API token.
    ///
    /// `base_url` may be the bare tenant host (`https://acme.api.kandji.io`)
    /// or already include `/api/v1`. The token gets a `Bearer ` prefix when
    /// it does not carry one.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, transport::authorization_value(token, "Bearer")?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=utf-8"),
        );

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = transport::shape_base_url(base_url, "api/v1/")?;
        Ok(Self { http, base_url })
    }

    /// The normalized `.../api/v1/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        transport::read_json(resp).await
    }
}
