//! Error types for the planner binary.
//!
//! [`PlannerError`] is the top-level error type that wraps all possible
//! failure modes around a planning run. The engine itself never fails on
//! well-formed input; everything here is about getting bytes in and out.

/// Top-level error for the planner binary.
///
/// Each variant wraps a specific failure, providing a single error type
/// that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Reading the request file or stdin failed.
    #[error("failed to read plan request: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The request or result JSON could not be (de)serialized.
    #[error("plan request JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
