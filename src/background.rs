/// Entry points for the background service worker
///
/// Every host failure ends here: it is logged and the operation is dropped.
use crate::actions::{self, TabHost};
use crate::analytics::{self, TabEvent, UsageQueue};
use crate::backup;
use crate::config::{BACKUP_ALARM, STATS_ALARM, Settings};
use crate::error;
use crate::host::{self, ChromeStorage, ChromeTabs};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static USAGE_QUEUE: Rc<UsageQueue> = Rc::new(UsageQueue::new());
}

/// Alarms to register on install, as `[{name, periodInMinutes}]`
#[wasm_bindgen]
pub async fn alarm_schedule() -> Result<JsValue, JsValue> {
    let settings = match Settings::load(&ChromeStorage::local()).await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Using default settings: {}", e);
            Settings::default()
        }
    };
    serde_wasm_bindgen::to_value(&settings.alarms()).map_err(JsValue::from)
}

#[wasm_bindgen]
pub async fn handle_alarm(name: String) {
    match name.as_str() {
        BACKUP_ALARM => {
            if let Err(e) = backup_tabs().await {
                log::error!("Backup failed: {}", e);
            }
            if let Err(e) = backup::sync_backups(&ChromeStorage::local(), &ChromeStorage::sync()).await {
                log::error!("Sync failed: {}", e);
            }
        }
        STATS_ALARM => {
            if let Err(e) = refresh_stats().await {
                log::error!("Stats refresh failed: {}", e);
            }
        }
        other => log::debug!("Ignoring alarm {}", other),
    }
}

async fn backup_tabs() -> error::Result<()> {
    let tabs = ChromeTabs.query_tabs().await?;
    backup::record_backup(&ChromeStorage::local(), &tabs, host::now_ms()).await?;
    Ok(())
}

async fn refresh_stats() -> error::Result<()> {
    let tabs = ChromeTabs.query_tabs().await?;
    analytics::refresh_domain_stats(&ChromeStorage::local(), &tabs, host::now_ms()).await?;
    Ok(())
}

/// Handle a `restoreBackup` runtime message
#[wasm_bindgen]
pub async fn restore_backup(timestamp: f64) {
    let timestamp = timestamp as i64;
    if let Err(e) = actions::restore_backup(&ChromeStorage::local(), &ChromeTabs, timestamp).await {
        log::error!("Restore of backup {} failed: {}", timestamp, e);
    }
}

/// Count a tab lifecycle event (`created`, `removed` or `updated`)
#[wasm_bindgen]
pub async fn handle_tab_event(kind: String) {
    let Some(event) = TabEvent::parse(&kind) else {
        log::debug!("Ignoring tab event {}", kind);
        return;
    };
    let queue = USAGE_QUEUE.with(Rc::clone);
    if let Err(e) = queue.record(&ChromeStorage::local(), event, host::now_ms()).await {
        log::error!("Failed to update usage stats: {}", e);
    }
}
