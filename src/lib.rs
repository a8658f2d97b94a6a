pub mod api;
pub mod config;
pub mod handlers;
pub mod mock;
pub mod models;
pub mod offline;
pub mod panel;
pub mod prefs;
pub mod routes;
pub mod templates;
pub mod ui;
pub mod utils;
