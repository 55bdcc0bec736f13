pub mod api;
pub mod config;
pub mod data;
pub mod debouncer;
pub mod notice;
pub mod page;
pub mod prefs;
pub mod session;
pub mod utils;
pub mod view;
