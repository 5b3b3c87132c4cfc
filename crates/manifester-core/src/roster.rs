// ── Roster builder ──
//
// The device roster and its username -> serial lookup, rebuilt every run.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{MachineInfo, MachineRecord};
use crate::provider::DeviceSource;

/// Local part of an email address; the whole string when there is no `@`.
pub fn username_from_email(email: &str) -> &str {
    email.split_once('@').map_or(email, |(local, _)| local)
}

/// Ordered machine records plus a username index.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<MachineRecord>,
    by_username: HashMap<String, String>,
}

impl Roster {
    /// Index `machines` in order.
    ///
    /// The index keeps one serial per username with the last record
    /// winning, so every unassigned device shares the single `""` key.
    pub fn from_machines(machines: &[MachineInfo]) -> Self {
        let records: Vec<MachineRecord> = machines.iter().map(MachineRecord::from).collect();
        let mut by_username = HashMap::with_capacity(records.len());
        for record in &records {
            if let Some(previous) = by_username.insert(record.username.clone(), record.serial.clone())
            {
                debug!(
                    username = %record.username,
                    previous = %previous,
                    serial = %record.serial,
                    "username already mapped; keeping the later device"
                );
            }
        }
        Self {
            records,
            by_username,
        }
    }

    pub fn records(&self) -> &[MachineRecord] {
        &self.records
    }

    pub fn serial_for(&self, username: &str) -> Option<&str> {
        self.by_username.get(username).map(String::as_str)
    }

    /// Number of distinct usernames in the index.
    pub fn usernames(&self) -> usize {
        self.by_username.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch the full inventory once and index it. No retries.
pub async fn build_roster<D: DeviceSource>(source: &D) -> Result<Roster, CoreError> {
    let machines = source.list_all_devices().await?;
    let roster = Roster::from_machines(&machines);
    info!(
        devices = roster.len(),
        usernames = roster.usernames(),
        "built device roster"
    );
    Ok(roster)
}
