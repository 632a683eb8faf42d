/// Reusable UI components

use crate::grouping::color_for;
use crate::tab_data::{OpenTab, SnapshotStats};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DomainBadgeProps {
    pub domain: AttrValue,
    #[prop_or_default]
    pub count: Option<usize>,
}

/// Domain label tinted with the color its tab group would get
#[function_component(DomainBadge)]
pub fn domain_badge(props: &DomainBadgeProps) -> Html {
    let color = color_for(&props.domain);
    let text = match props.count {
        Some(count) => format!("{} ({})", props.domain, count),
        None => props.domain.to_string(),
    };

    html! {
        <span class={classes!("domain-badge", format!("group-color-{}", color))} title={color.as_str()}>
            {text}
        </span>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    pub tab: OpenTab,
    pub selected: bool,
    pub on_toggle: Callback<i32>,
}

#[function_component(TabRow)]
pub fn tab_row(props: &TabRowProps) -> Html {
    let tab = &props.tab;
    let tab_id = tab.id();
    let on_toggle = props.on_toggle.clone();
    let onchange = Callback::from(move |_: Event| {
        if let Some(id) = tab_id {
            on_toggle.emit(id);
        }
    });

    html! {
        <div class="tab-row">
            <input type="checkbox" class="tab-checkbox" checked={props.selected} disabled={tab_id.is_none()} {onchange} />
            <label class="tab-label">
                <span class="tab-title">
                    {if tab.info.pinned { "📌 " } else { "" }}
                    {&tab.record.title}
                </span>
                <small class="tab-url">{&tab.record.url}</small>
            </label>
            <DomainBadge domain={tab.record.domain.clone()} />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatsSummaryProps {
    pub stats: SnapshotStats,
}

#[function_component(StatsSummary)]
pub fn stats_summary(props: &StatsSummaryProps) -> Html {
    let stats = &props.stats;

    html! {
        <div class="stats-summary">
            <span class="stat-item">{format!("{} tabs", stats.total_tabs)}</span>
            <span class="stat-item">{format!("{} domains", stats.unique_domains)}</span>
            <span class="stat-item">{"Top: "}{&stats.most_active_domain}</span>
        </div>
    }
}
