/// Bridge to the chrome.* extension APIs

use crate::actions::TabHost;
use crate::error::{Error, Result};
use crate::grouping::ExistingGroup;
use crate::storage::KeyValueStore;
use crate::tab_data::TabInfo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::JsValue;

#[allow(non_snake_case)]
mod js {
    use wasm_bindgen::prelude::*;

    // Import JS bridge functions
    #[wasm_bindgen(module = "/extension/host.js")]
    extern "C" {
        #[wasm_bindgen(catch)]
        pub async fn queryTabs() -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn removeTabs(tab_ids: JsValue) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn createTab(url: &str, active: bool) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn queryGroups() -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn groupTabs(tab_ids: JsValue, group_id: Option<i32>) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn updateGroup(group_id: i32, title: &str, color: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn createBookmark(title: &str, url: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn getStorage(area: &str, key: &str) -> Result<JsValue, JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn setStorage(area: &str, key: &str, value: JsValue) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn requestRestore(timestamp: f64) -> Result<(), JsValue>;

        #[wasm_bindgen(catch)]
        pub async fn openBackupViewer() -> Result<(), JsValue>;

        pub fn downloadFile(content: &str, filename: &str, mime_type: &str);
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    // chrome.storage cannot hold ES Maps, so maps must become plain objects
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::host("Failed to serialize", e))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| Error::host("Failed to parse", e))
}

/// Which chrome.storage namespace to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    /// Synced across the user's browsers; stands in for cloud backup
    Sync,
}

impl StorageArea {
    fn as_str(self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChromeStorage {
    area: StorageArea,
}

impl ChromeStorage {
    pub fn local() -> Self {
        ChromeStorage { area: StorageArea::Local }
    }

    pub fn sync() -> Self {
        ChromeStorage { area: StorageArea::Sync }
    }
}

impl KeyValueStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = js::getStorage(self.area.as_str(), key)
            .await
            .map_err(|e| Error::host("Failed to get storage", e))?;

        if value.is_null() || value.is_undefined() {
            Ok(None)
        } else {
            from_js(value).map(Some)
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        js::setStorage(self.area.as_str(), key, to_js(&value)?)
            .await
            .map_err(|e| Error::host("Failed to save storage", e))
    }
}

/// Tab, group and bookmark APIs of the running browser
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

impl TabHost for ChromeTabs {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        let tabs_js = js::queryTabs()
            .await
            .map_err(|e| Error::host("Failed to get tabs", e))?;
        from_js(tabs_js)
    }

    async fn remove_tabs(&self, tab_ids: &[i32]) -> Result<()> {
        js::removeTabs(to_js(tab_ids)?)
            .await
            .map_err(|e| Error::host("Remove failed", e))
    }

    async fn create_tab(&self, url: &str, active: bool) -> Result<()> {
        js::createTab(url, active)
            .await
            .map_err(|e| Error::host("Create failed", e))
    }

    async fn query_groups(&self) -> Result<Vec<ExistingGroup>> {
        let groups_js = js::queryGroups()
            .await
            .map_err(|e| Error::host("Failed to get groups", e))?;
        from_js(groups_js)
    }

    async fn group_tabs(&self, tab_ids: &[i32], group_id: Option<i32>) -> Result<i32> {
        let id_js = js::groupTabs(to_js(tab_ids)?, group_id)
            .await
            .map_err(|e| Error::host("Group failed", e))?;
        from_js(id_js)
    }

    async fn update_group(&self, group_id: i32, title: &str, color: &str) -> Result<()> {
        js::updateGroup(group_id, title, color)
            .await
            .map_err(|e| Error::host("Group update failed", e))
    }

    async fn create_bookmark(&self, title: &str, url: &str) -> Result<()> {
        js::createBookmark(title, url)
            .await
            .map_err(|e| Error::host("Bookmark failed", e))
    }
}

/// Ask the background worker to restore a backup
pub async fn request_restore(timestamp: i64) -> Result<()> {
    js::requestRestore(timestamp as f64)
        .await
        .map_err(|e| Error::host("Restore request failed", e))
}

pub async fn open_backup_viewer() -> Result<()> {
    js::openBackupViewer()
        .await
        .map_err(|e| Error::host("Failed to open backups", e))
}

/// Offer `content` as a download with a save dialog
pub fn download(content: &str, filename: &str, mime_type: &str) {
    js::downloadFile(content, filename, mime_type);
}

pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Blocking notification shown in the page
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.alert_with_message(message) {
            log::warn!("Alert failed: {:?}", e);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde_json::json;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_maps_cross_as_plain_objects() {
        let value = to_js(&json!({"tabUpdates": 2, "domains": ["a.com"]})).unwrap();

        assert!(!value.is_instance_of::<js_sys::Map>());
        let back: Value = from_js(value).unwrap();
        assert_eq!(back["tabUpdates"], 2);
        assert_eq!(back["domains"][0], "a.com");
    }

    #[wasm_bindgen_test]
    fn test_tab_list_without_ids_decodes() {
        let tabs = to_js(&json!([{"id": 1, "url": "https://a.com"}, {"url": "devtools://x"}])).unwrap();

        let decoded: Vec<TabInfo> = from_js(tabs).unwrap();

        assert_eq!(decoded[0].id, Some(1));
        assert_eq!(decoded[1].id, None);
    }
}
