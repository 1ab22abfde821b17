//! bwdash: terminal dashboard over a bandwidth collector's published
//! status and history documents.

pub mod app;
pub mod chart;
pub mod fetch;
pub mod poller;
pub mod prefs;
pub mod reconcile;
pub mod snapshot;
pub mod source;
pub mod stream;
pub mod types;
pub mod ui;
