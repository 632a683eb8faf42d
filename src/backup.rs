/// Backup snapshots: construction, merging and the local/remote sync

use crate::domain::{count_domains, most_frequent};
use crate::error::Result;
use crate::storage::{self, BACKUP_DATA_KEY, KeyValueStore, TAB_BACKUPS_KEY};
use crate::tab_data::{Snapshot, SnapshotStats, TabInfo, TabRecord};
use std::collections::HashMap;

/// Number of snapshots kept in a backup history
pub const MAX_BACKUPS: usize = 10;

/// Reported as the most active domain of an empty snapshot
pub const NO_DOMAIN: &str = "None";

/// Build a snapshot of `tabs` taken at `now`
pub fn build_snapshot(tabs: Vec<TabRecord>, now: i64) -> Snapshot {
    let stats = snapshot_stats(&tabs);
    Snapshot {
        timestamp: now,
        tabs,
        stats,
    }
}

/// Summary stats; ties for the most active domain go to the first domain seen
pub fn snapshot_stats(tabs: &[TabRecord]) -> SnapshotStats {
    let counts = count_domains(tabs.iter().map(|tab| tab.domain.as_str()));

    SnapshotStats {
        total_tabs: tabs.len(),
        unique_domains: counts.len(),
        most_active_domain: most_frequent(&counts).unwrap_or(NO_DOMAIN).to_string(),
    }
}

/// Merge two backup histories into one
///
/// Entries are keyed by timestamp. `first` is applied before `second`, so
/// when both hold a snapshot with the same timestamp the one from `second`
/// is kept. The result is sorted newest first and capped at [`MAX_BACKUPS`].
pub fn merge_backups(first: &[Snapshot], second: &[Snapshot]) -> Vec<Snapshot> {
    let mut by_timestamp: HashMap<i64, &Snapshot> = HashMap::new();
    for snapshot in first.iter().chain(second) {
        by_timestamp.insert(snapshot.timestamp, snapshot);
    }

    let mut merged: Vec<Snapshot> = by_timestamp.into_values().cloned().collect();
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    merged.truncate(MAX_BACKUPS);
    merged
}

/// Add a snapshot to a history, keeping it ordered and capped
pub fn push_snapshot(history: &[Snapshot], snapshot: Snapshot) -> Vec<Snapshot> {
    merge_backups(history, std::slice::from_ref(&snapshot))
}

pub fn find_snapshot(history: &[Snapshot], timestamp: i64) -> Option<&Snapshot> {
    history.iter().find(|s| s.timestamp == timestamp)
}

/// Drop the snapshot with `timestamp`; returns whether one was removed
pub fn remove_snapshot(history: &mut Vec<Snapshot>, timestamp: i64) -> bool {
    let original_len = history.len();
    history.retain(|s| s.timestamp != timestamp);
    history.len() < original_len
}

/// Capture `tabs` and append the snapshot to the local history
pub async fn record_backup<S: KeyValueStore>(
    local: &S,
    tabs: &[TabInfo],
    now: i64,
) -> Result<Snapshot> {
    let records: Vec<TabRecord> = tabs.iter().map(|tab| TabRecord::capture(tab, now)).collect();
    let snapshot = build_snapshot(records, now);

    let history: Vec<Snapshot> = storage::load(local, TAB_BACKUPS_KEY).await?;
    let history = push_snapshot(&history, snapshot.clone());
    storage::save(local, TAB_BACKUPS_KEY, &history).await?;

    log::info!(
        "Backed up {} tabs ({} snapshots kept)",
        snapshot.stats.total_tabs,
        history.len()
    );
    Ok(snapshot)
}

/// Reconcile the local and remote histories and write the result to both
///
/// The remote list is merged first, so the local copy of a snapshot wins.
pub async fn sync_backups<L, R>(local: &L, remote: &R) -> Result<Vec<Snapshot>>
where
    L: KeyValueStore,
    R: KeyValueStore,
{
    let local_history: Vec<Snapshot> = storage::load(local, TAB_BACKUPS_KEY).await?;
    let remote_history: Vec<Snapshot> = storage::load(remote, BACKUP_DATA_KEY).await?;

    let merged = merge_backups(&remote_history, &local_history);

    storage::save(remote, BACKUP_DATA_KEY, &merged).await?;
    storage::save(local, TAB_BACKUPS_KEY, &merged).await?;

    log::info!("Cloud sync completed ({} snapshots)", merged.len());
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn record(domain: &str) -> TabRecord {
        TabRecord {
            title: format!("Page on {}", domain),
            url: format!("https://{}/", domain),
            domain: domain.to_string(),
            timestamp: 0,
        }
    }

    fn snapshot(timestamp: i64, titles: &[&str]) -> Snapshot {
        let tabs = titles
            .iter()
            .map(|title| TabRecord {
                title: title.to_string(),
                url: "https://example.com".to_string(),
                domain: "example.com".to_string(),
                timestamp,
            })
            .collect();
        build_snapshot(tabs, timestamp)
    }

    fn timestamps(history: &[Snapshot]) -> Vec<i64> {
        history.iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn test_build_snapshot_empty() {
        let snap = build_snapshot(Vec::new(), 42);

        assert_eq!(snap.timestamp, 42);
        assert_eq!(snap.stats.total_tabs, 0);
        assert_eq!(snap.stats.unique_domains, 0);
        assert_eq!(snap.stats.most_active_domain, "None");
    }

    #[test]
    fn test_build_snapshot_counts_domains() {
        let tabs = vec![record("a.com"), record("b.com"), record("a.com")];

        let snap = build_snapshot(tabs, 1);

        assert_eq!(snap.stats.total_tabs, 3);
        assert_eq!(snap.stats.unique_domains, 2);
        assert_eq!(snap.stats.most_active_domain, "a.com");
    }

    #[test]
    fn test_build_snapshot_tie_goes_to_first_seen() {
        let tabs = vec![record("b.com"), record("a.com"), record("a.com"), record("b.com")];

        let snap = build_snapshot(tabs, 1);

        assert_eq!(snap.stats.most_active_domain, "b.com");
    }

    #[test]
    fn test_merge_second_wins_on_same_timestamp() {
        let merged = merge_backups(&[snapshot(100, &["W"])], &[snapshot(100, &["X"])]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].timestamp, 100);
        assert_eq!(merged[0].tabs.len(), 1);
        assert_eq!(merged[0].tabs[0].title, "X");
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let first = vec![snapshot(300, &[]), snapshot(100, &[])];
        let second = vec![snapshot(200, &[]), snapshot(400, &[])];

        let merged = merge_backups(&first, &second);

        assert_eq!(timestamps(&merged), vec![400, 300, 200, 100]);
    }

    #[test]
    fn test_merge_caps_at_ten_keeping_newest() {
        let first: Vec<Snapshot> = (1..=8).map(|t| snapshot(t, &[])).collect();
        let second: Vec<Snapshot> = (5..=14).map(|t| snapshot(t, &[])).collect();

        let merged = merge_backups(&first, &second);

        assert_eq!(merged.len(), MAX_BACKUPS);
        assert_eq!(timestamps(&merged), (5..=14).rev().collect::<Vec<i64>>());
    }

    #[test]
    fn test_merge_with_empty_side_is_symmetric() {
        let history = vec![snapshot(5, &[]), snapshot(9, &[]), snapshot(7, &[])];

        let left = merge_backups(&history, &[]);
        let right = merge_backups(&[], &history);

        assert_eq!(left, right);
        assert_eq!(timestamps(&left), vec![9, 7, 5]);
    }

    #[test]
    fn test_merge_both_empty() {
        assert!(merge_backups(&[], &[]).is_empty());
    }

    #[test]
    fn test_merge_keeps_every_distinct_timestamp_under_cap() {
        let first = vec![snapshot(1, &["a"]), snapshot(2, &["a"]), snapshot(3, &["a"])];
        let second = vec![snapshot(3, &["b"]), snapshot(4, &["b"])];

        let merged = merge_backups(&first, &second);

        assert_eq!(timestamps(&merged), vec![4, 3, 2, 1]);
        assert_eq!(merged[1].tabs[0].title, "b");
        assert_eq!(merged[2].tabs[0].title, "a");
    }

    #[test]
    fn test_merge_does_not_touch_inputs() {
        let first = vec![snapshot(1, &[]), snapshot(3, &[])];
        let second = vec![snapshot(2, &[])];

        let _ = merge_backups(&first, &second);

        assert_eq!(timestamps(&first), vec![1, 3]);
        assert_eq!(timestamps(&second), vec![2]);
    }

    #[test]
    fn test_push_snapshot_evicts_oldest() {
        let history: Vec<Snapshot> = (1..=10).rev().map(|t| snapshot(t, &[])).collect();

        let history = push_snapshot(&history, snapshot(11, &[]));

        assert_eq!(history.len(), MAX_BACKUPS);
        assert_eq!(history[0].timestamp, 11);
        assert_eq!(history[9].timestamp, 2);
    }

    #[test]
    fn test_find_and_remove_snapshot() {
        let mut history = vec![snapshot(3, &[]), snapshot(2, &[])];

        assert!(find_snapshot(&history, 2).is_some());
        assert!(find_snapshot(&history, 7).is_none());

        assert!(remove_snapshot(&mut history, 3));
        assert!(!remove_snapshot(&mut history, 3));
        assert_eq!(timestamps(&history), vec![2]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_record_backup_appends_to_local_history() {
        let local = MemoryStore::new();
        let tabs = vec![
            TabInfo::new(1, "https://www.a.com/x".to_string(), "A".to_string(), 1),
            TabInfo::new(2, "https://b.com".to_string(), "B".to_string(), 1),
            TabInfo::new(3, "https://a.com/y".to_string(), "A2".to_string(), 2),
        ];

        record_backup(&local, &tabs, 1_000).await.unwrap();
        let snap = record_backup(&local, &tabs[..1], 2_000).await.unwrap();

        assert_eq!(snap.stats.total_tabs, 1);
        let history: Vec<Snapshot> = storage::load(&local, TAB_BACKUPS_KEY).await.unwrap();
        assert_eq!(timestamps(&history), vec![2_000, 1_000]);
        assert_eq!(history[1].stats.most_active_domain, "a.com");
        assert_eq!(history[1].tabs[0].timestamp, 1_000);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_sync_prefers_local_copy_and_writes_both() {
        let local = MemoryStore::new();
        let remote = MemoryStore::new();
        storage::save(&local, TAB_BACKUPS_KEY, &vec![snapshot(100, &["local"])]).await.unwrap();
        storage::save(
            &remote,
            BACKUP_DATA_KEY,
            &vec![snapshot(100, &["remote"]), snapshot(50, &["remote"])],
        ).await
        .unwrap();

        let merged = sync_backups(&local, &remote).await.unwrap();

        assert_eq!(timestamps(&merged), vec![100, 50]);
        assert_eq!(merged[0].tabs[0].title, "local");

        let stored_local: Vec<Snapshot> = storage::load(&local, TAB_BACKUPS_KEY).await.unwrap();
        let stored_remote: Vec<Snapshot> = storage::load(&remote, BACKUP_DATA_KEY).await.unwrap();
        assert_eq!(stored_local, merged);
        assert_eq!(stored_remote, merged);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_sync_with_nothing_stored() {
        let local = MemoryStore::new();
        let remote = MemoryStore::new();

        let merged = sync_backups(&local, &remote).await.unwrap();

        assert!(merged.is_empty());
        assert_eq!(local.len(), 1);
        assert_eq!(remote.len(), 1);
    }
}
