//! Core error types for kairos-core.
//!
//! Permission gaps are deliberately NOT errors: a calendar read without the
//! grant returns an empty list, and a schedule call without the exact-alarm
//! capability is a no-op. Errors here are the genuinely fallible paths --
//! durable stores and the replication channel.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for kairos-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Calendar provider read failed (not a permission gap).
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Durable store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Replication channel errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the durable preference and snapshot-cache stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to persist a store document
    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors from the phone-to-watch replication channel.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Data channel delivery failed. The hosting periodic-work scheduler
    /// owns retry and backoff; nothing is retried here.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Snapshot could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

impl SyncError {
    /// Whether the hosting work scheduler should retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
