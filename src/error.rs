//! Error types shared by ingestion, planning and emission.

use thiserror::Error;

/// Errors surfaced to callers of the report pipeline.
///
/// Planning itself never fails: malformed records are dropped during ingestion and empty inputs
/// produce a placeholder. Errors therefore come from the boundaries, namely reading the snapshot
/// and drawing the document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The snapshot document could not be parsed as a whole.
    #[error("failed to parse request snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// No usable font family could be loaded for PDF output.
    #[error("failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// genpdf reported an error while laying out or writing the document.
    #[error("failed to render report: {0}")]
    Render(#[source] genpdf::error::Error),

    /// The rendered document could not be post-processed with bookmarks.
    #[cfg(feature = "bookmarks")]
    #[error("failed to add bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),

    /// A date argument did not match `YYYY-MM-DD`.
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Reading input or writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
