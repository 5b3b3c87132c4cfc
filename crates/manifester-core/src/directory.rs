// ── Directory seam ──
//
// `GroupDirectory` lists groups and their member emails. `OktaDirectory`
// is the production implementation.

use std::future::Future;

use manifester_api::OktaClient;
use manifester_api::okta::{GroupListParams, MemberListParams};
use tracing::debug;

use crate::config::DirectoryConfig;
use crate::error::CoreError;
use crate::model::Group;

/// Okta's maximum page size for both groups and group members.
const PAGE_LIMIT: u32 = 200;

/// Anything that can list groups and group members.
pub trait GroupDirectory: Send + Sync {
    /// Every group in the directory.
    fn list_groups(&self) -> impl Future<Output = Result<Vec<Group>, CoreError>> + Send;

    /// Member email addresses of one group.
    fn list_members(
        &self,
        group_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, CoreError>> + Send;
}

/// Okta-backed group directory.
pub struct OktaDirectory {
    client: OktaClient,
}

impl OktaDirectory {
    pub fn setup(config: &DirectoryConfig) -> Result<Self, CoreError> {
        let transport = config.tls.transport(config.timeout);
        let client = OktaClient::new(config.url.as_str(), &config.token, &transport)?;
        debug!(url = %client.base_url(), "okta directory ready");
        Ok(Self { client })
    }
}

impl GroupDirectory for OktaDirectory {
    async fn list_groups(&self) -> Result<Vec<Group>, CoreError> {
        let params = GroupListParams {
            limit: Some(PAGE_LIMIT),
            q: None,
        };
        let groups = self.client.list_groups(&params).await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<String>, CoreError> {
        let params = MemberListParams {
            limit: Some(PAGE_LIMIT),
        };
        let members = self.client.list_group_members(group_id, &params).await?;
        Ok(members.into_iter().map(|m| m.profile.email).collect())
    }
}
