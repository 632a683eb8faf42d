/// Data structures for Tab Vault
use crate::domain::extract_domain;
use serde::{Deserialize, Serialize};

/// A browser tab as reported by `chrome.tabs.query`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    /// Absent for some non-browser tabs (devtools windows, for one)
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub window_id: i32,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub index: i32,
}

impl TabInfo {
    pub fn new(id: i32, url: String, title: String, window_id: i32) -> TabInfo {
        TabInfo {
            id: Some(id),
            url,
            title,
            active: false,
            window_id,
            pinned: false,
            index: id,
        }
    }
}

/// One tab captured at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabRecord {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub timestamp: i64,
}

impl TabRecord {
    pub fn capture(tab: &TabInfo, now: i64) -> TabRecord {
        TabRecord {
            title: tab.title.clone(),
            url: tab.url.clone(),
            domain: extract_domain(&tab.url),
            timestamp: now,
        }
    }
}

/// An open tab as listed in the popup: the host tab plus its captured record
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTab {
    pub info: TabInfo,
    pub record: TabRecord,
}

impl OpenTab {
    pub fn capture(info: TabInfo, now: i64) -> OpenTab {
        let record = TabRecord::capture(&info, now);
        OpenTab { info, record }
    }

    pub fn id(&self) -> Option<i32> {
        self.info.id
    }

    pub fn domain(&self) -> &str {
        &self.record.domain
    }
}

/// Summary computed once when a snapshot is taken
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub total_tabs: usize,
    pub unique_domains: usize,
    pub most_active_domain: String,
}

/// One backup of every open tab
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub timestamp: i64,
    pub tabs: Vec<TabRecord>,
    pub stats: SnapshotStats,
}
