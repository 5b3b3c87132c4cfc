// Kandji device endpoints
//
// `GET devices?limit=N&offset=M` returns a bare JSON array. The API has no
// total count or next link; the end of the inventory is an empty page.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::kandji::client::KandjiClient;
use crate::kandji::models::DeviceRecord;
use crate::query::{self, QueryParams};

/// Page size used when walking the full inventory.
pub const DEFAULT_PAGE_LIMIT: u32 = 300;

/// Offset pagination window for `GET devices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceListParams {
    pub limit: u32,
    pub offset: u32,
}

impl Default for DeviceListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl DeviceListParams {
    /// The window immediately after this one.
    pub fn next_page(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

impl QueryParams for DeviceListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        query::push_non_empty(&mut pairs, "limit", self.limit.to_string());
        query::push_non_empty(&mut pairs, "offset", self.offset.to_string());
        pairs
    }
}

impl KandjiClient {
    /// Fetch one page of devices.
    ///
    /// `GET /api/v1/devices?limit={limit}&offset={offset}`
    pub async fn list_devices(&self, params: &DeviceListParams) -> Result<Vec<DeviceRecord>, Error> {
        self.get_with_params("devices", &params.to_query()).await
    }

    /// Walk every page until the API returns an empty one.
    ///
    /// Any page failure aborts the walk; no partial inventory is returned.
    /// A page holding only devices already seen also ends the walk, so a
    /// server that ignores `offset` cannot loop it forever.
    pub async fn list_all_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        let mut params = DeviceListParams::default();
        let mut seen = HashSet::new();
        let mut all = Vec::new();

        loop {
            let page = self.list_devices(&params).await?;
            if page.is_empty() {
                break;
            }
            debug!(offset = params.offset, received = page.len(), "fetched device page");

            let before = all.len();
            all.extend(
                page.into_iter()
                    .filter(|device| seen.insert(device.device_id.clone())),
            );
            if all.len() == before {
                warn!(
                    offset = params.offset,
                    "device page repeats earlier results; stopping pagination"
                );
                break;
            }
            params = params.next_page();
        }

        info!(devices = all.len(), "listed kandji devices");
        Ok(all)
    }
}
