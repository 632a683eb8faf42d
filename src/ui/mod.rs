/// UI module exports
pub mod backups;
pub mod components;
pub mod popup;
