// Jamf Classic API HTTP client
//
// HTTP basic auth on every request, JSON responses requested via `Accept`.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// Async client for the Jamf Pro Classic API.
pub struct JamfClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl JamfClient {
    /// Build from a Jamf Pro URL and API account credentials.
    ///
    /// `base_url` is the server root (`https://acme.jamfcloud.com`); the
    /// `/JSSResource/` prefix is added when missing.
    pub fn new(
        base_url: &str,
        username: &str,
        password: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        Self::from_reqwest(base_url, username, password, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        username: &str,
        password: &SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        if username.is_empty() {
            return Err(Error::InvalidCredential {
                message: "jamf username is empty".into(),
            });
        }

        let base_url = transport::shape_base_url(base_url, "JSSResource/")?;
        Ok(Self {
            http,
            base_url,
            username: username.to_owned(),
            password: password.clone(),
        })
    }

    /// The normalized `.../JSSResource/` base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await?;
        transport::read_json(resp).await
    }
}
