/// User settings stored alongside the backups

use crate::error::Result;
use crate::grouping::GroupPolicy;
use crate::operations::SortKey;
use crate::storage::{self, KeyValueStore, SETTINGS_KEY};
use serde::{Deserialize, Serialize};

pub const BACKUP_ALARM: &str = "tabBackup";
pub const STATS_ALARM: &str = "statsRefresh";

/// Extension settings; every field falls back to its default when missing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_backup_period")]
    pub backup_period_minutes: u32,

    #[serde(default = "default_stats_period")]
    pub stats_period_minutes: u32,

    /// Domains with fewer open tabs are left ungrouped
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    #[serde(default)]
    pub group_policy: GroupPolicy,

    #[serde(default)]
    pub default_sort: SortKey,
}

fn default_backup_period() -> u32 {
    60
}

fn default_stats_period() -> u32 {
    30
}

fn default_min_group_size() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backup_period_minutes: default_backup_period(),
            stats_period_minutes: default_stats_period(),
            min_group_size: default_min_group_size(),
            group_policy: GroupPolicy::default(),
            default_sort: SortKey::default(),
        }
    }
}

/// A periodic alarm for `chrome.alarms.create`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSchedule {
    pub name: &'static str,
    pub period_in_minutes: u32,
}

impl Settings {
    pub async fn load<S: KeyValueStore>(store: &S) -> Result<Settings> {
        storage::load(store, SETTINGS_KEY).await
    }

    pub fn alarms(&self) -> Vec<AlarmSchedule> {
        vec![
            AlarmSchedule {
                name: BACKUP_ALARM,
                period_in_minutes: self.backup_period_minutes.max(1),
            },
            AlarmSchedule {
                name: STATS_ALARM,
                period_in_minutes: self.stats_period_minutes.max(1),
            },
        ]
    }
}
