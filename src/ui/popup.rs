/// Popup UI for Tab Vault extension

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use patternfly_yew::prelude::*;
use std::collections::HashSet;
use crate::actions::{self, TabHost};
use crate::analytics::aggregate_domain_usage;
use crate::backup;
use crate::config::Settings;
use crate::domain::count_domains;
use crate::error::{Error, Result};
use crate::export::{ExportFormat, export_tabs};
use crate::host::{self, ChromeStorage, ChromeTabs};
use crate::operations::{SortKey, TabFilter, TimeFilter, WindowFilter, filter_and_sort, search_tabs};
use crate::tab_data::{OpenTab, TabInfo, TabRecord};
use crate::ui::components::{DomainBadge, TabRow};

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Notice(String),
    Error(String),
}

#[derive(Clone, PartialEq)]
enum ActiveTab {
    Tabs,
    Organize,
    Export,
    Backups,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading("Loading tabs...".to_string()));
    let active_tab = use_state(|| ActiveTab::Tabs);
    let tabs = use_state(Vec::<OpenTab>::new);
    let selected = use_state(HashSet::<i32>::new);
    let settings = use_state(Settings::default);
    let reload = use_state(|| 0u32);

    let window_filter = use_state(WindowFilter::default);
    let domain_filter = use_state(|| None::<String>);
    let time_filter = use_state(TimeFilter::default);
    let sort = use_state(SortKey::default);
    let search_query = use_state(String::new);

    // Load settings on mount
    {
        let settings = settings.clone();
        let sort = sort.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match Settings::load(&ChromeStorage::local()).await {
                    Ok(loaded) => {
                        sort.set(loaded.default_sort);
                        settings.set(loaded);
                    }
                    Err(e) => log::warn!("Using default settings: {}", e),
                }
            });
            || ()
        });
    }

    // (Re)load tabs whenever the reload counter changes
    {
        let state = state.clone();
        let tabs = tabs.clone();
        let selected = selected.clone();
        use_effect_with(*reload, move |_| {
            spawn_local(async move {
                match load_open_tabs().await {
                    Ok(loaded) => {
                        tabs.set(loaded);
                        selected.set(HashSet::new());
                        if matches!(*state, AppState::Loading(_)) {
                            state.set(AppState::Idle);
                        }
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to get tabs: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let now = host::now_ms();
    let filter = TabFilter {
        window: *window_filter,
        domain: (*domain_filter).clone(),
        time: *time_filter,
    };
    let visible = search_tabs(&filter_and_sort(&tabs, &filter, *sort, now), &search_query);
    let domain_counts = count_domains(tabs.iter().map(|tab| tab.domain()));

    // Filter handlers
    let on_window_change = {
        let window_filter = window_filter.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                window_filter.set(if select.value() == "active" {
                    WindowFilter::Active
                } else {
                    WindowFilter::All
                });
            }
        })
    };

    let on_domain_change = {
        let domain_filter = domain_filter.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let value = select.value();
                domain_filter.set(if value == "all" { None } else { Some(value) });
            }
        })
    };

    let on_time_change = {
        let time_filter = time_filter.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                time_filter.set(TimeFilter::parse(&select.value()));
            }
        })
    };

    let on_sort_change = {
        let sort = sort.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                sort.set(SortKey::parse(&select.value()));
            }
        })
    };

    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
            }
        })
    };

    // Selection handlers
    let on_toggle = {
        let selected = selected.clone();
        Callback::from(move |tab_id: i32| {
            let mut next = (*selected).clone();
            if !next.remove(&tab_id) {
                next.insert(tab_id);
            }
            selected.set(next);
        })
    };

    let on_select_all = {
        let selected = selected.clone();
        let visible_ids: HashSet<i32> = visible.iter().filter_map(|tab| tab.id()).collect();
        Callback::from(move |_: MouseEvent| {
            selected.set(visible_ids.clone());
        })
    };

    let on_deselect_all = {
        let selected = selected.clone();
        Callback::from(move |_: MouseEvent| {
            selected.set(HashSet::new());
        })
    };

    // Close selected tabs handler
    let on_close_selected = {
        let state = state.clone();
        let selected = selected.clone();
        let reload = reload.clone();

        Callback::from(move |_: MouseEvent| {
            let ids: Vec<i32> = selected.iter().copied().collect();
            if ids.is_empty() {
                return;
            }
            let state = state.clone();
            let reload = reload.clone();

            spawn_local(async move {
                match ChromeTabs.remove_tabs(&ids).await {
                    Ok(_) => reload.set(*reload + 1),
                    Err(e) => state.set(AppState::Error(format!("Close failed: {}", e))),
                }
            });
        })
    };

    // Bookmark selected tabs handler
    let on_bookmark_selected = {
        let state = state.clone();
        let tabs = tabs.clone();
        let selected = selected.clone();

        Callback::from(move |_: MouseEvent| {
            let records = selected_records(&tabs, &selected);
            if records.is_empty() {
                host::alert("Select at least one tab to bookmark.");
                return;
            }
            let state = state.clone();

            spawn_local(async move {
                match actions::bookmark_tabs(&ChromeTabs, &records).await {
                    Ok(count) => state.set(AppState::Notice(format!("Bookmarked {} tabs", count))),
                    Err(e) => state.set(AppState::Error(format!("Bookmark failed: {}", e))),
                }
            });
        })
    };

    // Make unique handler
    let on_unique = {
        let state = state.clone();
        let reload = reload.clone();

        Callback::from(move |_: MouseEvent| {
            let state = state.clone();
            let reload = reload.clone();

            state.set(AppState::Loading("Removing duplicates...".to_string()));

            spawn_local(async move {
                match remove_duplicate_tabs().await {
                    Ok(0) => state.set(AppState::Notice("No duplicates found".to_string())),
                    Ok(count) => {
                        state.set(AppState::Notice(format!("Closed {} duplicate tabs", count)));
                        reload.set(*reload + 1);
                    }
                    Err(e) => state.set(AppState::Error(format!("Remove failed: {}", e))),
                }
            });
        })
    };

    // Group by domain handler
    let on_group = {
        let state = state.clone();
        let tabs = tabs.clone();
        let settings = settings.clone();

        Callback::from(move |_: MouseEvent| {
            let state = state.clone();
            let open_tabs = (*tabs).clone();
            let settings = (*settings).clone();

            state.set(AppState::Loading("Grouping tabs...".to_string()));

            spawn_local(async move {
                let grouped = actions::group_by_domain(
                    &ChromeTabs,
                    &open_tabs,
                    settings.group_policy,
                    settings.min_group_size,
                )
                .await;
                match grouped {
                    Ok(plans) => {
                        let created = plans.iter().filter(|plan| plan.creates_group()).count();
                        state.set(AppState::Notice(format!(
                            "Created {} groups, extended {}",
                            created,
                            plans.len() - created
                        )));
                    }
                    Err(e) => state.set(AppState::Error(format!("Grouping failed: {}", e))),
                }
            });
        })
    };

    // Export handlers
    let on_export = {
        let tabs = tabs.clone();
        let selected = selected.clone();
        move |format: ExportFormat| {
            let tabs = tabs.clone();
            let selected = selected.clone();
            Callback::from(move |_: MouseEvent| {
                let records = selected_records(&tabs, &selected);
                match export_tabs(format, &records) {
                    Ok(file) => host::download(&file.content, file.filename, file.mime_type),
                    Err(Error::EmptySelection) => host::alert("Select at least one tab to export."),
                    Err(e) => log::error!("Export failed: {}", e),
                }
            })
        }
    };

    // Backup handlers
    let on_backup_now = {
        let state = state.clone();
        let tabs = tabs.clone();

        Callback::from(move |_: MouseEvent| {
            let state = state.clone();
            let infos: Vec<TabInfo> = tabs.iter().map(|tab| tab.info.clone()).collect();

            state.set(AppState::Loading("Backing up...".to_string()));

            spawn_local(async move {
                match backup_now(&infos).await {
                    Ok(kept) => state.set(AppState::Notice(format!("Backup saved ({} kept)", kept))),
                    Err(e) => state.set(AppState::Error(format!("Backup failed: {}", e))),
                }
            });
        })
    };

    let on_view_backups = {
        Callback::from(move |_: MouseEvent| {
            spawn_local(async move {
                if let Err(e) = host::open_backup_viewer().await {
                    log::error!("{}", e);
                }
            });
        })
    };

    let is_busy = matches!(*state, AppState::Loading(_));

    // Tab click handlers
    let on_tab_click = {
        let active_tab = active_tab.clone();
        move |tab: ActiveTab| {
            let active_tab = active_tab.clone();
            Callback::from(move |_: MouseEvent| {
                active_tab.set(tab.clone());
            })
        }
    };

    let nav_item = |tab: ActiveTab, label: &'static str| {
        let class = if *active_tab == tab { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" };
        html! {
            <li class={class}>
                <button class="pf-v5-c-tabs__link" onclick={on_tab_click(tab)}>
                    <span class="pf-v5-c-tabs__item-text">{label}</span>
                </button>
            </li>
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Vault"}</h1>

            // Tab navigation
            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    {nav_item(ActiveTab::Tabs, "Tabs")}
                    {nav_item(ActiveTab::Organize, "Organize")}
                    {nav_item(ActiveTab::Export, "Export")}
                    {nav_item(ActiveTab::Backups, "Backups")}
                </ul>
            </div>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Notice(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Info} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            // Tab content
            <div class="tab-pane-content">
                {match &*active_tab {
                    ActiveTab::Tabs => html! {
                        <div class="flex-column-gap">
                            <div class="filters">
                                <select class="filter-select" onchange={on_window_change}>
                                    <option value="all" selected={*window_filter == WindowFilter::All}>{"All tabs"}</option>
                                    <option value="active" selected={*window_filter == WindowFilter::Active}>{"Active tabs"}</option>
                                </select>
                                <select class="filter-select" onchange={on_domain_change}>
                                    <option value="all" selected={domain_filter.is_none()}>{"All domains"}</option>
                                    {for domain_counts.iter().map(|(domain, count)| html! {
                                        <option
                                            value={domain.clone()}
                                            selected={domain_filter.as_deref() == Some(domain.as_str())}
                                        >
                                            {format!("{} ({})", domain, count)}
                                        </option>
                                    })}
                                </select>
                                <select class="filter-select" onchange={on_time_change}>
                                    <option value="all" selected={*time_filter == TimeFilter::All}>{"Any time"}</option>
                                    <option value="1hour" selected={*time_filter == TimeFilter::LastHour}>{"Last hour"}</option>
                                    <option value="24hours" selected={*time_filter == TimeFilter::LastDay}>{"Last 24 hours"}</option>
                                    <option value="week" selected={*time_filter == TimeFilter::LastWeek}>{"Last week"}</option>
                                </select>
                                <select class="filter-select" onchange={on_sort_change}>
                                    <option value="default" selected={*sort == SortKey::Default}>{"Browser order"}</option>
                                    <option value="title" selected={*sort == SortKey::Title}>{"Title"}</option>
                                    <option value="url" selected={*sort == SortKey::Url}>{"URL"}</option>
                                    <option value="domain" selected={*sort == SortKey::Domain}>{"Domain"}</option>
                                </select>
                            </div>

                            <input
                                type="text"
                                placeholder="Search titles, URLs or domains..."
                                value={(*search_query).clone()}
                                oninput={on_search_input}
                                class="search-input"
                            />

                            <div class="selection-actions">
                                <Button onclick={on_select_all} variant={ButtonVariant::Secondary}>{"Select all"}</Button>
                                <Button onclick={on_deselect_all} variant={ButtonVariant::Secondary}>{"Deselect all"}</Button>
                                <Button onclick={on_close_selected} disabled={is_busy} variant={ButtonVariant::Danger}>{"Close selected"}</Button>
                                <Button onclick={on_bookmark_selected} disabled={is_busy} variant={ButtonVariant::Secondary}>{"Bookmark selected"}</Button>
                            </div>

                            <div class="tabs-list">
                                {for visible.iter().map(|tab| html! {
                                    <TabRow
                                        key={format!("{}-{}", tab.info.window_id, tab.info.index)}
                                        tab={tab.clone()}
                                        selected={tab.id().is_some_and(|id| selected.contains(&id))}
                                        on_toggle={on_toggle.clone()}
                                    />
                                })}
                            </div>
                            <p class="list-footer">
                                {format!("{} of {} tabs • {} selected", visible.len(), tabs.len(), selected.len())}
                            </p>
                        </div>
                    },
                    ActiveTab::Organize => html! {
                        <div class="flex-column-gap">
                            <Button onclick={on_unique} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"🗑️ Remove Duplicate Tabs"}
                            </Button>
                            <Button onclick={on_group} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"🎨 Group Tabs by Domain"}
                            </Button>

                            <div class="stats-container">
                                <h2 class="stats-title">{"Domains"}</h2>
                                <div class="stats-box">
                                    {for aggregate_domain_usage(&tabs.iter().map(|tab| tab.info.clone()).collect::<Vec<TabInfo>>())
                                        .into_iter()
                                        .map(|usage| html! {
                                            <div class="stat-item">
                                                <DomainBadge domain={usage.name.clone()} count={Some(usage.tab_count)} />
                                                <span class="stat-count">
                                                    {format!("{} windows • score {}", usage.window_count, usage.popularity_score)}
                                                </span>
                                            </div>
                                        })}
                                </div>
                            </div>
                        </div>
                    },
                    ActiveTab::Export => html! {
                        <div class="flex-column-gap">
                            <p class="message-text">{format!("{} tabs selected", selected.len())}</p>
                            {for ExportFormat::ALL.iter().map(|format| html! {
                                <Button onclick={on_export(*format)} variant={ButtonVariant::Secondary} block={true}>
                                    {format!("📥 Export {}", format.label())}
                                </Button>
                            })}
                            <Button onclick={on_bookmark_selected.clone()} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"🔖 Export to Bookmarks"}
                            </Button>
                        </div>
                    },
                    ActiveTab::Backups => html! {
                        <div class="flex-column-gap">
                            <Button onclick={on_backup_now} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"💾 Back Up Now"}
                            </Button>
                            <Button onclick={on_view_backups} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"📂 View Backups"}
                            </Button>
                        </div>
                    },
                }}
            </div>

            <p class="footer-popup">
                {"Tab Vault v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

fn selected_records(tabs: &[OpenTab], selected: &HashSet<i32>) -> Vec<TabRecord> {
    tabs.iter()
        .filter(|tab| tab.id().is_some_and(|id| selected.contains(&id)))
        .map(|tab| tab.record.clone())
        .collect()
}

async fn load_open_tabs() -> Result<Vec<OpenTab>> {
    let now = host::now_ms();
    let infos = ChromeTabs.query_tabs().await?;
    Ok(infos.into_iter().map(|info| OpenTab::capture(info, now)).collect())
}

async fn remove_duplicate_tabs() -> Result<usize> {
    let current = ChromeTabs.query_tabs().await?;
    let removed = actions::remove_duplicates(&ChromeTabs, &current).await?;
    Ok(removed.len())
}

async fn backup_now(tabs: &[TabInfo]) -> Result<usize> {
    let local = ChromeStorage::local();
    backup::record_backup(&local, tabs, host::now_ms()).await?;
    let merged = backup::sync_backups(&local, &ChromeStorage::sync()).await?;
    Ok(merged.len())
}
