/// Backup history viewer page

use yew::prelude::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use std::collections::BTreeMap;
use crate::backup::{remove_snapshot, sync_backups};
use crate::error::Result;
use crate::host::{self, ChromeStorage};
use crate::operations::search_pattern;
use crate::storage::{self, TAB_BACKUPS_KEY};
use crate::tab_data::{Snapshot, TabRecord};
use crate::ui::components::{DomainBadge, StatsSummary};

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Notice(String),
    Error(String),
}

#[function_component(BackupViewer)]
pub fn backup_viewer() -> Html {
    let state = use_state(|| ViewState::Loading);
    let history = use_state(Vec::<Snapshot>::new);
    let search_query = use_state(String::new);

    // Load history on mount
    {
        let state = state.clone();
        let history = history.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_history().await {
                    Ok(data) => {
                        history.set(data);
                        state.set(ViewState::Idle);
                    }
                    Err(e) => {
                        state.set(ViewState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Search handler
    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
            }
        })
    };

    // Sync with the synced storage area
    let on_sync = {
        let state = state.clone();
        let history = history.clone();

        Callback::from(move |_: MouseEvent| {
            let state = state.clone();
            let history = history.clone();

            spawn_local(async move {
                match sync_backups(&ChromeStorage::local(), &ChromeStorage::sync()).await {
                    Ok(merged) => {
                        state.set(ViewState::Notice(format!("Synced {} backups", merged.len())));
                        history.set(merged);
                    }
                    Err(e) => state.set(ViewState::Error(format!("Sync failed: {}", e))),
                }
            });
        })
    };

    // Delete backup handler
    let on_delete = {
        let history = history.clone();
        let state = state.clone();

        Callback::from(move |timestamp: i64| {
            let mut new_history = (*history).clone();
            if !remove_snapshot(&mut new_history, timestamp) {
                return;
            }
            history.set(new_history.clone());

            let state = state.clone();
            spawn_local(async move {
                if let Err(e) = storage::save(&ChromeStorage::local(), TAB_BACKUPS_KEY, &new_history).await {
                    state.set(ViewState::Error(format!("Failed to save: {}", e)));
                }
            });
        })
    };

    // Restore backup handler
    let on_restore = {
        let state = state.clone();

        Callback::from(move |timestamp: i64| {
            let state = state.clone();
            spawn_local(async move {
                if let Err(e) = host::request_restore(timestamp).await {
                    state.set(ViewState::Error(format!("Restore failed: {}", e)));
                }
            });
        })
    };

    // Export single backup
    let on_export = Callback::from(move |snapshot: Snapshot| {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => {
                let filename = format!("tab-backup-{}.json", snapshot.timestamp);
                host::download(&json, &filename, "application/json");
            }
            Err(e) => {
                log::error!("Export failed: {:?}", e);
            }
        }
    });

    // Filter backups by search query
    let filtered: Vec<Snapshot> = match search_pattern(&search_query) {
        None => (*history).clone(),
        Some(pattern) => history
            .iter()
            .filter(|snapshot| {
                pattern.is_match(&snapshot.stats.most_active_domain)
                    || snapshot.tabs.iter().any(|tab| {
                        pattern.is_match(&tab.url)
                            || pattern.is_match(&tab.title)
                            || pattern.is_match(&tab.domain)
                    })
            })
            .cloned()
            .collect(),
    };

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"Tab Backups"}</h1>
                <Button onclick={on_sync} variant={ButtonVariant::Secondary}>
                    {"🔄 Sync"}
                </Button>
            </div>

            // Status display
            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading backups..."}</p>
                    </div>
                },
                ViewState::Notice(msg) => html! {
                    <Alert r#type={AlertType::Info} title={msg.clone()} inline={true}>
                    </Alert>
                },
                ViewState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Idle => html! {}
            }}

            // Search bar
            <div class="search-container">
                <input
                    type="text"
                    placeholder="Search backups by title, domain, or URL..."
                    value={(*search_query).clone()}
                    oninput={on_search_input}
                    class="search-input"
                />
            </div>

            if filtered.is_empty() {
                <div class="empty-state">
                    if search_query.is_empty() {
                        <p>{"No backups yet."}</p>
                        <p class="empty-state-hint">{"Backups are taken every hour, or from the popup."}</p>
                    } else {
                        <p>{"No backups match your search."}</p>
                    }
                </div>
            } else {
                <div class="sessions-list">
                    {for filtered.iter().map(|snapshot| html! {
                        <BackupCard
                            key={snapshot.timestamp}
                            snapshot={snapshot.clone()}
                            on_delete={on_delete.clone()}
                            on_restore={on_restore.clone()}
                            on_export={on_export.clone()}
                        />
                    })}
                </div>
            }

            <div class="footer">
                {format!("{} backups • {} tabs",
                    history.len(),
                    history.iter().map(|s| s.tabs.len()).sum::<usize>()
                )}
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct BackupCardProps {
    snapshot: Snapshot,
    on_delete: Callback<i64>,
    on_restore: Callback<i64>,
    on_export: Callback<Snapshot>,
}

#[function_component(BackupCard)]
fn backup_card(props: &BackupCardProps) -> Html {
    let expanded = use_state(|| false);
    let snapshot = &props.snapshot;
    let timestamp = snapshot.timestamp;

    let toggle_expanded = {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| {
            expanded.set(!*expanded);
        })
    };

    let mut domain_groups: BTreeMap<&str, Vec<&TabRecord>> = BTreeMap::new();
    for tab in &snapshot.tabs {
        domain_groups.entry(tab.domain.as_str()).or_default().push(tab);
    }

    html! {
        <div class="session-card">
            <div class="session-header">
                <div class="session-title-container">
                    <h3 class="session-title">{format_timestamp(timestamp)}</h3>
                    <StatsSummary stats={snapshot.stats.clone()} />
                </div>

                <div class="session-actions">
                    <Button onclick={toggle_expanded} variant={ButtonVariant::Secondary}>
                        {if *expanded { "▲ Collapse" } else { "▼ Expand" }}
                    </Button>
                    <Button onclick={props.on_restore.reform(move |_: MouseEvent| timestamp)}>
                        {"🔄 Restore"}
                    </Button>
                    <Button
                        onclick={props.on_export.reform({
                            let snapshot = snapshot.clone();
                            move |_: MouseEvent| snapshot.clone()
                        })}
                        variant={ButtonVariant::Secondary}
                    >
                        {"📥"}
                    </Button>
                    <Button
                        onclick={props.on_delete.reform(move |_: MouseEvent| timestamp)}
                        variant={ButtonVariant::Danger}
                    >
                        {"🗑️"}
                    </Button>
                </div>
            </div>

            if *expanded {
                <div class="tabs-container">
                    {for domain_groups.iter().map(|(domain, tabs)| html! {
                        <div key={domain.to_string()} class="domain-group">
                            <h4 class="domain-title">
                                <DomainBadge domain={domain.to_string()} count={Some(tabs.len())} />
                            </h4>
                            <div class="tabs-list">
                                {for tabs.iter().map(|tab| html! {
                                    <div class="tab-item">
                                        <div class="tab-title">{&tab.title}</div>
                                        <div class="tab-url">{&tab.url}</div>
                                    </div>
                                })}
                            </div>
                        </div>
                    })}
                </div>
            }
        </div>
    }
}

// Helper functions

async fn load_history() -> Result<Vec<Snapshot>> {
    storage::load(&ChromeStorage::local(), TAB_BACKUPS_KEY).await
}

fn format_timestamp(timestamp: i64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(timestamp as f64));
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes()
    )
}
