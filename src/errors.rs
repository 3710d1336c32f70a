use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for configuration, source, and export failures.
///
/// Scoring, coercion and classification never produce errors; these variants only
/// surface at the adapter boundary and in the outer config/export layers.
#[derive(Debug, Error)]
pub enum DigestError {
    /// A source could not produce its records.
    #[error("record source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Id of the failing source.
        source_id: SourceId,
        /// Human-readable cause.
        reason: String,
    },
    /// Invalid weights, field names or taxonomy.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Filesystem failure while loading config or writing an export.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Malformed config or list JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
