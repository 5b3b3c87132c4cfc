// Okta group endpoints
//
// `GET groups` and `GET groups/{id}/users` both return bare JSON arrays,
// paginated by `Link` header.

use tracing::{debug, info};

use crate::error::Error;
use crate::okta::client::OktaClient;
use crate::okta::models::{Group, GroupMember};
use crate::query::{self, QueryParams};

/// Query parameters for `GET groups`.
#[derive(Debug, Clone, Default)]
pub struct GroupListParams {
    /// Page size; Okta caps this server-side.
    pub limit: Option<u32>,
    /// Server-side name prefix search.
    pub q: Option<String>,
}

impl QueryParams for GroupListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        query::push_opt(&mut pairs, "q", self.q.as_ref());
        query::push_opt(&mut pairs, "limit", self.limit.as_ref());
        pairs
    }
}

/// Query parameters for `GET groups/{id}/users`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberListParams {
    pub limit: Option<u32>,
}

impl QueryParams for MemberListParams {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(1);
        query::push_opt(&mut pairs, "limit", self.limit.as_ref());
        pairs
    }
}

impl OktaClient {
    /// List every group in the org.
    ///
    /// `GET /api/v1/groups`
    pub async fn list_groups(&self, params: &GroupListParams) -> Result<Vec<Group>, Error> {
        let groups: Vec<Group> = self.get_all("groups", &params.to_query()).await?;
        info!(groups = groups.len(), "listed okta groups");
        Ok(groups)
    }

    /// List every member of one group.
    ///
    /// `GET /api/v1/groups/{id}/users`
    pub async fn list_group_members(
        &self,
        group_id: &str,
        params: &MemberListParams,
    ) -> Result<Vec<GroupMember>, Error> {
        let members: Vec<GroupMember> = self
            .get_all(&format!("groups/{group_id}/users"), &params.to_query())
            .await?;
        debug!(group_id, members = members.len(), "listed okta group members");
        Ok(members)
    }
}
