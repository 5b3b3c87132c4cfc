// ── Directory group ──

use serde::Serialize;

/// A directory group. Only `id` and `name` drive reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}
