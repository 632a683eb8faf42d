/// Tab Vault - Chrome Extension for Tab Backups and Management
/// Built with Rust + WASM + Yew

pub mod actions;
pub mod analytics;
pub mod background;
pub mod backup;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod grouping;
pub mod host;
pub mod operations;
pub mod storage;
pub mod tab_data;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export core domain functions for JavaScript access
#[wasm_bindgen]
pub fn extract_domain(url: &str) -> String {
    domain::extract_domain(url)
}

#[wasm_bindgen]
pub fn color_for_domain(domain: &str) -> String {
    grouping::color_for(domain).to_string()
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the Yew app for the backup history viewer
#[wasm_bindgen]
pub fn start_backup_viewer() {
    yew::Renderer::<ui::backups::BackupViewer>::new().render();
}
