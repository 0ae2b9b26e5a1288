//! Error types shared across the kpi_report crate.

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while fetching metrics or producing the report document.
#[derive(Debug, Error)]
pub enum Error {
    /// The summary service answered with a status other than 200.
    #[error("summary service returned status {status}")]
    Remote {
        /// HTTP status code reported by the service.
        status: u16,
    },

    /// The request never produced a usable response.
    #[error("failed to reach the summary service: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered 200 with a body that is not the expected JSON map.
    #[error("malformed summary response: {0}")]
    Parse(#[from] serde_json::Error),

    /// PDF assembly failed.
    #[error("failed to render the report document: {0}")]
    Render(#[from] genpdf::error::Error),

    /// Outline injection failed after rendering.
    #[cfg(feature = "bookmarks")]
    #[error("failed to add section bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}
