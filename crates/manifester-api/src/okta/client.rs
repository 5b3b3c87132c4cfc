// Okta HTTP client
//
// `SSWS` API token auth and `api/v1/` URL construction. Collection
// endpoints page with RFC 8288 `Link` headers; `get_all` follows them.

use std::collections::HashSet;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::link;
use crate::transport::{self, TransportConfig};

/// Async client for the Okta groups API.
pub struct OktaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OktaClient {
    /// Build from an org URL and API token.
    ///
    /// The token gets an `SSWS ` prefix when it does not carry one.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, transport::authorization_value(token, "SSWS")?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

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

    /// GET `path` and every page its `Link: rel="next"` chain points to.
    ///
    /// Only the first request carries `params`; next links already encode
    /// the cursor and the original query. A next link that was already
    /// followed ends the walk.
    pub(crate) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let first = self.base_url.join(path)?;
        debug!("GET {first} params={params:?}");

        let resp = self.http.get(first).query(params).send().await?;
        let mut next = link::next_link(resp.headers());
        let mut all: Vec<T> = transport::read_json(resp).await?;
        let mut followed = HashSet::new();

        while let Some(url) = next.take() {
            if !followed.insert(url.clone()) {
                warn!("next link {url} was already followed; stopping pagination");
                break;
            }
            trace!("following next link {url}");
            let resp = self.http.get(url).send().await?;
            next = link::next_link(resp.headers());
            let page: Vec<T> = transport::read_json(resp).await?;
            all.extend(page);
        }

        Ok(all)
    }
}
