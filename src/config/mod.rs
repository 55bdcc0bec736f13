//! Configuration module
//!
//! User settings loaded from `config.toml`: display defaults, search
//! behaviour, export naming, API endpoint and preference storage.

pub mod config;

pub use config::Config;
