/// Tab actions carried out against the browser

use crate::backup::find_snapshot;
use crate::error::Result;
use crate::grouping::{ExistingGroup, GroupPlan, GroupPolicy, plan_domain_groups};
use crate::operations::duplicate_tab_ids;
use crate::storage::{self, KeyValueStore, TAB_BACKUPS_KEY};
use crate::tab_data::{OpenTab, Snapshot, TabInfo, TabRecord};

/// Browser tab, group and bookmark APIs
#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>>;

    async fn remove_tabs(&self, tab_ids: &[i32]) -> Result<()>;

    async fn create_tab(&self, url: &str, active: bool) -> Result<()>;

    async fn query_groups(&self) -> Result<Vec<ExistingGroup>>;

    /// Group tabs, into `group_id` when given; returns the group id
    async fn group_tabs(&self, tab_ids: &[i32], group_id: Option<i32>) -> Result<i32>;

    async fn update_group(&self, group_id: i32, title: &str, color: &str) -> Result<()>;

    async fn create_bookmark(&self, title: &str, url: &str) -> Result<()>;
}

/// Replace every open tab with the tabs of the backup taken at `timestamp`
///
/// Returns false when no such backup exists. Tabs already closed stay closed
/// if reopening fails part way.
pub async fn restore_backup<S, H>(local: &S, host: &H, timestamp: i64) -> Result<bool>
where
    S: KeyValueStore,
    H: TabHost,
{
    let history: Vec<Snapshot> = storage::load(local, TAB_BACKUPS_KEY).await?;
    let Some(backup) = find_snapshot(&history, timestamp) else {
        log::warn!("No backup with timestamp {}", timestamp);
        return Ok(false);
    };

    let current: Vec<i32> = host.query_tabs().await?.iter().filter_map(|tab| tab.id).collect();
    if !current.is_empty() {
        host.remove_tabs(&current).await?;
    }

    for tab in &backup.tabs {
        host.create_tab(&tab.url, false).await?;
    }

    log::info!("Restored {} tabs from backup {}", backup.tabs.len(), timestamp);
    Ok(true)
}

/// Close every tab whose URL already appeared earlier; returns the closed ids
pub async fn remove_duplicates<H: TabHost>(host: &H, tabs: &[TabInfo]) -> Result<Vec<i32>> {
    let remove_ids = duplicate_tab_ids(tabs);
    if remove_ids.is_empty() {
        log::debug!("No duplicates found");
    } else {
        host.remove_tabs(&remove_ids).await?;
    }
    Ok(remove_ids)
}

/// Put tabs sharing a domain into one colored group titled after the domain
pub async fn group_by_domain<H: TabHost>(
    host: &H,
    tabs: &[OpenTab],
    policy: GroupPolicy,
    min_size: usize,
) -> Result<Vec<GroupPlan>> {
    let existing = match policy {
        GroupPolicy::ReuseExisting => host.query_groups().await?,
        GroupPolicy::AlwaysCreate => Vec::new(),
    };
    let plans = plan_domain_groups(tabs, &existing, policy, min_size);

    for plan in &plans {
        let group_id = host.group_tabs(&plan.tab_ids, plan.existing_group_id).await?;
        host.update_group(group_id, &plan.domain, plan.color.as_str()).await?;
    }

    Ok(plans)
}

pub async fn bookmark_tabs<H: TabHost>(host: &H, tabs: &[TabRecord]) -> Result<usize> {
    for tab in tabs {
        host.create_bookmark(&tab.title, &tab.url).await?;
    }
    Ok(tabs.len())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeHost;
    use super::*;
    use crate::backup::build_snapshot;
    use crate::grouping::color_for;
    use crate::storage::MemoryStore;

    fn tab(id: i32, url: &str) -> TabInfo {
        TabInfo::new(id, url.to_string(), format!("Tab {}", id), 1)
    }

    fn saved(url: &str) -> TabRecord {
        TabRecord::capture(&tab(0, url), 500)
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_restore_closes_then_reopens() {
        let local = MemoryStore::new();
        let history = vec![build_snapshot(vec![saved("https://a.com"), saved("https://b.com")], 500)];
        storage::save(&local, TAB_BACKUPS_KEY, &history).await.unwrap();
        let host = FakeHost {
            tabs: vec![tab(1, "https://x.com"), tab(2, "https://y.com")],
            ..FakeHost::default()
        };

        let restored = restore_backup(&local, &host, 500).await.unwrap();

        assert!(restored);
        assert_eq!(
            host.calls(),
            vec![
                "remove [1, 2]",
                "create https://a.com active=false",
                "create https://b.com active=false",
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_restore_unknown_timestamp_does_nothing() {
        let local = MemoryStore::new();
        let host = FakeHost {
            tabs: vec![tab(1, "https://x.com")],
            ..FakeHost::default()
        };

        let restored = restore_backup(&local, &host, 123).await.unwrap();

        assert!(!restored);
        assert!(host.calls().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_remove_duplicates() {
        let host = FakeHost::default();
        let tabs = vec![
            tab(1, "https://a.com"),
            tab(2, "https://a.com"),
            tab(3, "https://b.com"),
        ];

        let removed = remove_duplicates(&host, &tabs).await.unwrap();

        assert_eq!(removed, vec![2]);
        assert_eq!(host.calls(), vec!["remove [2]"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_remove_duplicates_without_duplicates_skips_host() {
        let host = FakeHost::default();

        let removed = remove_duplicates(&host, &[tab(1, "https://a.com")]).await.unwrap();

        assert!(removed.is_empty());
        assert!(host.calls().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_group_by_domain_reuses_group() {
        let host = FakeHost {
            groups: vec![ExistingGroup { id: 7, title: "a.com".to_string() }],
            ..FakeHost::default()
        };
        let tabs: Vec<OpenTab> = vec![
            OpenTab::capture(tab(1, "https://a.com/1"), 0),
            OpenTab::capture(tab(2, "https://b.com/1"), 0),
            OpenTab::capture(tab(3, "https://a.com/2"), 0),
            OpenTab::capture(tab(4, "https://b.com/2"), 0),
        ];

        let plans = group_by_domain(&host, &tabs, GroupPolicy::ReuseExisting, 2).await.unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(
            host.calls(),
            vec![
                "group [1, 3] into Some(7)".to_string(),
                format!("update 7 a.com {}", color_for("a.com")),
                "group [2, 4] into None".to_string(),
                format!("update 100 b.com {}", color_for("b.com")),
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_bookmark_tabs() {
        let host = FakeHost::default();

        let count = bookmark_tabs(&host, &[saved("https://a.com/")]).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(host.calls(), vec!["bookmark Tab 0 https://a.com/"]);
    }
}
