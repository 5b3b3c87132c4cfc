// ── Group resolver ──
//
// Turns the directory's groups into department -> member emails. A group
// listing failure is returned to the caller; a member listing failure
// only drops that one group.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::directory::GroupDirectory;
use crate::error::CoreError;
use crate::model::Group;

/// Department display name -> member email addresses.
pub type DepartmentMembers = BTreeMap<String, BTreeSet<String>>;

/// Which directory groups count as departments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    prefix: String,
    excluded: BTreeSet<String>,
}

impl GroupFilter {
    /// `prefix` is a case-sensitive name prefix (empty matches every group).
    /// `excluded` entries match a group's name or id.
    pub fn new<I, S>(prefix: impl Into<String>, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, group: &Group) -> bool {
        group.name.starts_with(&self.prefix)
            && !self.excluded.contains(&group.name)
            && !self.excluded.contains(&group.id)
    }
}

/// Groups passing `filter`, keyed by id.
pub fn id_name_map(groups: &[Group], filter: &GroupFilter) -> BTreeMap<String, String> {
    groups
        .iter()
        .filter(|group| filter.matches(group))
        .map(|group| (group.id.clone(), group.name.clone()))
        .collect()
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupResolution {
    pub departments: DepartmentMembers,
    /// Names of groups whose members could not be listed.
    pub failed_groups: Vec<String>,
}

/// List groups, keep the matching ones and collect their members' emails.
///
/// Groups sharing a display name are merged and groups with no members
/// produce no department. Members without an email are kept as `""`.
pub async fn resolve_departments<G: GroupDirectory>(
    directory: &G,
    filter: &GroupFilter,
) -> Result<GroupResolution, CoreError> {
    let groups = directory.list_groups().await?;
    let selected = id_name_map(&groups, filter);
    debug!(
        listed = groups.len(),
        selected = selected.len(),
        "filtered directory groups"
    );

    let mut resolution = GroupResolution::default();
    for (id, name) in &selected {
        let emails = match directory.list_members(id).await {
            Ok(emails) => emails,
            Err(e) => {
                warn!(group_id = %id, department = %name, error = %e, "failed to list group members; skipping group");
                resolution.failed_groups.push(name.clone());
                continue;
            }
        };

        let emails: BTreeSet<String> = emails.into_iter().collect();
        if emails.is_empty() {
            debug!(department = %name, "group has no members");
            continue;
        }
        resolution
            .departments
            .entry(name.clone())
            .or_default()
            .extend(emails);
    }

    info!(
        departments = resolution.departments.len(),
        failed = resolution.failed_groups.len(),
        "resolved department memberships"
    );
    Ok(resolution)
}
