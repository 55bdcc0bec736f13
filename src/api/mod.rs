//! Backend access: an async JSON client bound to a session, and the
//! single-flight policy for overlapping list requests.

pub mod client;
pub mod single_flight;

use thiserror::Error;

pub use client::{extract_rows, ApiClient};
pub use single_flight::SingleFlight;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response has no row array at '{0}'")]
    NoRows(String),

    #[error("request superseded by a newer one")]
    Superseded,

    #[error("request task failed: {0}")]
    Task(String),
}
