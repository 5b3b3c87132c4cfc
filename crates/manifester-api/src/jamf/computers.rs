// Jamf computer endpoints
//
// `GET computers` returns `{ "computers": [{ "id", "name" }] }`; user
// assignment only appears in `GET computers/id/{id}`. Detail lookups run on
// a bounded pool local to each `list_computer_details` call.

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::error::Error;
use crate::jamf::client::JamfClient;
use crate::jamf::models::{
    ComputerDetails, ComputerDetailsResponse, ComputerSummary, ComputersResponse,
};

/// Concurrent detail lookups when the caller does not choose.
pub const DEFAULT_DETAIL_WORKERS: usize = 5;

impl JamfClient {
    /// List every computer record (id + name only).
    ///
    /// `GET /JSSResource/computers`
    pub async fn list_computers(&self) -> Result<Vec<ComputerSummary>, Error> {
        let resp: ComputersResponse = self.get("computers").await?;
        debug!(computers = resp.computers.len(), "listed jamf computers");
        Ok(resp.computers)
    }

    /// Fetch the full record for one computer.
    ///
    /// `GET /JSSResource/computers/id/{id}`
    pub async fn computer_details(&self, id: i64) -> Result<ComputerDetails, Error> {
        let resp: ComputerDetailsResponse = self.get(&format!("computers/id/{id}")).await?;
        Ok(resp.computer)
    }

    /// List every computer and resolve its details with at most `workers`
    /// requests in flight.
    ///
    /// Results arrive in completion order, not list order. The first failed
    /// lookup aborts the whole call so callers never see a partial inventory.
    pub async fn list_computer_details(&self, workers: usize) -> Result<Vec<ComputerDetails>, Error> {
        let computers = self.list_computers().await?;
        let workers = workers.max(1);

        let details: Vec<ComputerDetails> = stream::iter(computers)
            .map(|summary| async move {
                debug!(id = summary.id, name = %summary.name, "fetching computer details");
                self.computer_details(summary.id).await
            })
            .buffer_unordered(workers)
            .try_collect()
            .await?;

        info!(computers = details.len(), workers, "resolved jamf computer details");
        Ok(details)
    }
}
