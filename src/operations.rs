/// Tab list operations: filtering, sorting, searching, uniqueness

use crate::tab_data::{OpenTab, TabInfo};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

const HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFilter {
    #[default]
    All,
    /// Only tabs that are active in their window
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    LastHour,
    LastDay,
    LastWeek,
}

impl TimeFilter {
    pub fn max_age_ms(self) -> Option<i64> {
        match self {
            TimeFilter::All => None,
            TimeFilter::LastHour => Some(HOUR_MS),
            TimeFilter::LastDay => Some(24 * HOUR_MS),
            TimeFilter::LastWeek => Some(7 * 24 * HOUR_MS),
        }
    }

    pub fn parse(value: &str) -> TimeFilter {
        match value {
            "1hour" => TimeFilter::LastHour,
            "24hours" => TimeFilter::LastDay,
            "week" => TimeFilter::LastWeek,
            _ => TimeFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Host order
    #[default]
    Default,
    Title,
    Url,
    Domain,
}

impl SortKey {
    pub fn parse(value: &str) -> SortKey {
        match value {
            "title" => SortKey::Title,
            "url" => SortKey::Url,
            "domain" => SortKey::Domain,
            _ => SortKey::Default,
        }
    }
}

/// Criteria for the popup's tab list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabFilter {
    pub window: WindowFilter,
    /// `None` keeps every domain
    pub domain: Option<String>,
    pub time: TimeFilter,
}

impl TabFilter {
    pub fn matches(&self, tab: &OpenTab, now: i64) -> bool {
        if self.window == WindowFilter::Active && !tab.info.active {
            return false;
        }
        if let Some(domain) = &self.domain {
            if tab.domain() != domain {
                return false;
            }
        }
        match self.time.max_age_ms() {
            Some(max_age) => now - tab.record.timestamp <= max_age,
            None => true,
        }
    }
}

/// Filter then sort; sorting is stable so equal keys keep host order
pub fn filter_and_sort(tabs: &[OpenTab], filter: &TabFilter, sort: SortKey, now: i64) -> Vec<OpenTab> {
    let mut listed: Vec<OpenTab> = tabs
        .iter()
        .filter(|tab| filter.matches(tab, now))
        .cloned()
        .collect();

    match sort {
        SortKey::Default => {}
        SortKey::Title => listed.sort_by(|a, b| compare_text(&a.record.title, &b.record.title)),
        SortKey::Url => listed.sort_by(|a, b| compare_text(&a.record.url, &b.record.url)),
        SortKey::Domain => listed.sort_by(|a, b| compare_text(a.domain(), b.domain())),
    }

    listed
}

/// Case-insensitive ordering, falling back to the raw text
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Build a case-insensitive matcher; invalid patterns are matched literally
pub fn search_pattern(query: &str) -> Option<Regex> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

/// Keep tabs whose title, URL or domain match `query`
pub fn search_tabs(tabs: &[OpenTab], query: &str) -> Vec<OpenTab> {
    match search_pattern(query) {
        None => tabs.to_vec(),
        Some(pattern) => tabs
            .iter()
            .filter(|tab| {
                pattern.is_match(&tab.record.title)
                    || pattern.is_match(&tab.record.url)
                    || pattern.is_match(tab.domain())
            })
            .cloned()
            .collect(),
    }
}

/// Ids of tabs whose URL already appeared earlier in `tabs`
///
/// The first occurrence of each URL is kept. Tabs without an id cannot be
/// closed and are never reported.
pub fn duplicate_tab_ids(tabs: &[TabInfo]) -> Vec<i32> {
    let mut seen_urls = HashSet::new();
    let mut remove_ids = Vec::new();

    for tab in tabs {
        if !seen_urls.insert(tab.url.as_str()) {
            remove_ids.extend(tab.id);
        }
    }

    remove_ids
}
