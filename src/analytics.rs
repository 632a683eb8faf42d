/// Domain usage analytics and tab activity counters

use crate::domain::extract_domain;
use crate::error::Result;
use crate::storage::{self, DOMAIN_STATS_KEY, KeyValueStore, USAGE_STATS_KEY};
use crate::tab_data::TabInfo;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

/// Usage of one domain across all open tabs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainUsage {
    pub name: String,
    pub tab_count: usize,
    pub unique_titles: usize,
    pub window_count: usize,
    pub popularity_score: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub generated_at: i64,
    pub domains: Vec<DomainUsage>,
}

#[derive(Default)]
struct UsageAccumulator<'a> {
    count: usize,
    titles: HashSet<&'a str>,
    windows: HashSet<i32>,
}

/// Aggregate tabs per domain, most popular first
///
/// Popularity is tab count times the number of windows the domain is open
/// in. Domains with equal popularity keep the order they were first seen.
pub fn aggregate_domain_usage(tabs: &[TabInfo]) -> Vec<DomainUsage> {
    let mut order: Vec<String> = Vec::new();
    let mut by_domain: HashMap<String, UsageAccumulator> = HashMap::new();

    for tab in tabs {
        let domain = extract_domain(&tab.url);
        let acc = by_domain.entry(domain.clone()).or_insert_with(|| {
            order.push(domain);
            UsageAccumulator::default()
        });
        acc.count += 1;
        acc.titles.insert(tab.title.as_str());
        acc.windows.insert(tab.window_id);
    }

    let mut usage: Vec<DomainUsage> = order
        .into_iter()
        .filter_map(|name| {
            let acc = by_domain.remove(&name)?;
            Some(DomainUsage {
                tab_count: acc.count,
                unique_titles: acc.titles.len(),
                window_count: acc.windows.len(),
                popularity_score: acc.count * acc.windows.len(),
                name,
            })
        })
        .collect();

    usage.sort_by(|a, b| b.popularity_score.cmp(&a.popularity_score));
    usage
}

/// Recompute domain stats from `tabs` and store them
pub async fn refresh_domain_stats<S: KeyValueStore>(
    local: &S,
    tabs: &[TabInfo],
    now: i64,
) -> Result<DomainStats> {
    let stats = DomainStats {
        generated_at: now,
        domains: aggregate_domain_usage(tabs),
    };
    storage::save(local, DOMAIN_STATS_KEY, &stats).await?;
    log::debug!("Domain stats refreshed ({} domains)", stats.domains.len());
    Ok(stats)
}

/// Tab lifecycle events counted in [`UsageStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created,
    Removed,
    Updated,
}

impl TabEvent {
    pub fn parse(name: &str) -> Option<TabEvent> {
        match name {
            "created" => Some(TabEvent::Created),
            "removed" => Some(TabEvent::Removed),
            "updated" => Some(TabEvent::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub tab_creations: u64,
    pub tab_closures: u64,
    pub tab_updates: u64,
    pub last_updated: i64,
}

impl UsageStats {
    pub fn record(&mut self, event: TabEvent, now: i64) {
        match event {
            TabEvent::Created => self.tab_creations += 1,
            TabEvent::Removed => self.tab_closures += 1,
            TabEvent::Updated => self.tab_updates += 1,
        }
        self.last_updated = now;
    }
}

pub async fn record_tab_event<S: KeyValueStore>(
    local: &S,
    event: TabEvent,
    now: i64,
) -> Result<UsageStats> {
    let mut stats: UsageStats = storage::load(local, USAGE_STATS_KEY).await?;
    stats.record(event, now);
    storage::save(local, USAGE_STATS_KEY, &stats).await?;
    Ok(stats)
}

/// Serializes [`record_tab_event`] calls that may overlap
///
/// Tab events arrive in bursts and each one is a load-modify-save on the
/// same key. Events are queued and applied one at a time by whichever call
/// finds the queue idle, so no increment is lost.
#[derive(Debug, Default)]
pub struct UsageQueue {
    pending: RefCell<VecDeque<(TabEvent, i64)>>,
    draining: Cell<bool>,
}

impl UsageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event`, and apply the queue unless another call already is
    pub async fn record<S: KeyValueStore>(&self, local: &S, event: TabEvent, now: i64) -> Result<()> {
        self.pending.borrow_mut().push_back((event, now));
        if self.draining.replace(true) {
            return Ok(());
        }

        let result = self.drain(local).await;
        self.draining.set(false);
        result
    }

    async fn drain<S: KeyValueStore>(&self, local: &S) -> Result<()> {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some((event, now)) = next else {
                return Ok(());
            };
            record_tab_event(local, event, now).await?;
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::Value;

    /// Store whose reads yield to the runtime before returning
    struct YieldingStore(MemoryStore);

    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            let value = self.0.get(key).await?;
            tokio::task::yield_now().await;
            Ok(value)
        }

        async fn set(&self, key: &str, value: Value) -> Result<()> {
            self.0.set(key, value).await
        }
    }

    fn tab(id: i32, url: &str, title: &str, window_id: i32) -> TabInfo {
        TabInfo::new(id, url.to_string(), title.to_string(), window_id)
    }

    #[test]
    fn test_aggregate_counts_titles_and_windows() {
        let tabs = vec![
            tab(1, "https://github.com/a", "Repo", 1),
            tab(2, "https://github.com/b", "Repo", 2),
            tab(3, "https://www.github.com/c", "Issues", 2),
            tab(4, "https://docs.rs", "Docs", 1),
        ];

        let usage = aggregate_domain_usage(&tabs);

        assert_eq!(usage.len(), 2);
        assert_eq!(
            usage[0],
            DomainUsage {
                name: "github.com".to_string(),
                tab_count: 3,
                unique_titles: 2,
                window_count: 2,
                popularity_score: 6,
            }
        );
        assert_eq!(usage[1].name, "docs.rs");
        assert_eq!(usage[1].popularity_score, 1);
    }

    #[test]
    fn test_aggregate_ties_keep_first_seen_order() {
        let tabs = vec![
            tab(1, "https://c.com", "C", 1),
            tab(2, "https://a.com", "A", 1),
            tab(3, "https://b.com", "B", 1),
            tab(4, "https://b.com/2", "B2", 1),
        ];

        let names: Vec<String> = aggregate_domain_usage(&tabs).into_iter().map(|u| u.name).collect();

        assert_eq!(names, ["b.com", "c.com", "a.com"]);
    }

    #[test]
    fn test_aggregate_unparsable_urls_share_unknown() {
        let tabs = vec![tab(1, "::nope::", "X", 1), tab(2, "", "Y", 3)];

        let usage = aggregate_domain_usage(&tabs);

        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].name, "Unknown");
        assert_eq!(usage[0].popularity_score, 4);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_domain_usage(&[]).is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_refresh_domain_stats_replaces_previous() {
        let local = MemoryStore::new();

        refresh_domain_stats(&local, &[tab(1, "https://a.com", "A", 1)], 10).await.unwrap();
        refresh_domain_stats(&local, &[], 20).await.unwrap();

        let stored: DomainStats = storage::load(&local, DOMAIN_STATS_KEY).await.unwrap();
        assert_eq!(stored.generated_at, 20);
        assert!(stored.domains.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_record_tab_events() {
        let local = MemoryStore::new();

        record_tab_event(&local, TabEvent::Created, 1).await.unwrap();
        record_tab_event(&local, TabEvent::Created, 2).await.unwrap();
        let stats = record_tab_event(&local, TabEvent::Removed, 3).await.unwrap();

        assert_eq!(stats.tab_creations, 2);
        assert_eq!(stats.tab_closures, 1);
        assert_eq!(stats.tab_updates, 0);
        assert_eq!(stats.last_updated, 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_queue_keeps_every_overlapping_event() {
        let local = YieldingStore(MemoryStore::new());
        let queue = UsageQueue::new();

        let results = tokio::join!(
            queue.record(&local, TabEvent::Updated, 1),
            queue.record(&local, TabEvent::Updated, 2),
            queue.record(&local, TabEvent::Created, 3),
        );
        results.0.unwrap();
        results.1.unwrap();
        results.2.unwrap();

        let stats: UsageStats = storage::load(&local, USAGE_STATS_KEY).await.unwrap();
        assert_eq!(stats.tab_updates, 2);
        assert_eq!(stats.tab_creations, 1);
        assert_eq!(stats.last_updated, 3);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_queue_recovers_after_idle() {
        let local = MemoryStore::new();
        let queue = UsageQueue::new();

        queue.record(&local, TabEvent::Removed, 1).await.unwrap();
        queue.record(&local, TabEvent::Removed, 2).await.unwrap();

        let stats: UsageStats = storage::load(&local, USAGE_STATS_KEY).await.unwrap();
        assert_eq!(stats.tab_closures, 2);
    }

    #[test]
    fn test_tab_event_parse() {
        assert_eq!(TabEvent::parse("updated"), Some(TabEvent::Updated));
        assert_eq!(TabEvent::parse("moved"), None);
    }
}
