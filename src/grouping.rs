/// Domain grouping: group colors and planning which tabs go in which group

use crate::domain::count_domains;
use crate::tab_data::OpenTab;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tab group colors, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
}

pub const PALETTE: [GroupColor; 7] = [
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
];

impl GroupColor {
    /// Name understood by `chrome.tabGroups.update`
    pub fn as_str(self) -> &'static str {
        match self {
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 32-bit string hash over UTF-16 code units, wrapping
///
/// Each step is `(hash << 5) - hash + unit`, i.e. `hash * 31 + unit`.
fn domain_hash(domain: &str) -> i32 {
    domain.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

/// Pick the group color for a domain
///
/// Deterministic: the same domain always gets the same color. Different
/// domains may share one.
pub fn color_for(domain: &str) -> GroupColor {
    let index = domain_hash(domain).unsigned_abs() % PALETTE.len() as u32;
    PALETTE[index as usize]
}

/// What to do when a group titled after the domain already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupPolicy {
    /// Move the tabs into the existing group
    #[default]
    ReuseExisting,
    /// Always create a new group
    AlwaysCreate,
}

/// A tab group already present in the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExistingGroup {
    pub id: i32,
    #[serde(default)]
    pub title: String,
}

/// One group to create or extend
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub domain: String,
    pub tab_ids: Vec<i32>,
    pub color: GroupColor,
    pub existing_group_id: Option<i32>,
}

impl GroupPlan {
    pub fn creates_group(&self) -> bool {
        self.existing_group_id.is_none()
    }
}

/// Plan one group per domain that has at least `min_size` tabs
///
/// Groups come out in the order their domain was first seen among `tabs`.
pub fn plan_domain_groups(
    tabs: &[OpenTab],
    existing: &[ExistingGroup],
    policy: GroupPolicy,
    min_size: usize,
) -> Vec<GroupPlan> {
    let groupable: Vec<&OpenTab> = tabs.iter().filter(|tab| tab.id().is_some()).collect();

    count_domains(groupable.iter().map(|tab| tab.domain()))
        .into_iter()
        .filter(|(_, count)| *count >= min_size.max(1))
        .map(|(domain, _)| {
            let tab_ids = groupable
                .iter()
                .filter(|tab| tab.domain() == domain)
                .filter_map(|tab| tab.id())
                .collect();
            let existing_group_id = match policy {
                GroupPolicy::ReuseExisting => existing
                    .iter()
                    .find(|group| group.title == domain)
                    .map(|group| group.id),
                GroupPolicy::AlwaysCreate => None,
            };
            GroupPlan {
                color: color_for(&domain),
                domain,
                tab_ids,
                existing_group_id,
            }
        })
        .collect()
}
