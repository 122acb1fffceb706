//! Replication channel boundary.

use crate::error::SyncError;

use super::watch::WatchSyncListener;

/// One-directional data channel from phone to watch.
///
/// `put` has replace-semantics per path: the newest body for a path
/// supersedes earlier ones. Failures surface as retryable transport
/// errors; the hosting periodic-work scheduler owns backoff, nothing is
/// retried here.
pub trait SyncTransport: Send {
    fn put(&mut self, path: &str, body: &[u8]) -> Result<(), SyncError>;
}

/// In-process channel delivering puts straight to a watch listener.
/// Used by tests and the single-process CLI host.
pub struct LoopbackTransport {
    listener: WatchSyncListener,
}

impl LoopbackTransport {
    pub fn new(listener: WatchSyncListener) -> Self {
        Self { listener }
    }

    pub fn listener(&self) -> &WatchSyncListener {
        &self.listener
    }
}

impl SyncTransport for LoopbackTransport {
    fn put(&mut self, path: &str, body: &[u8]) -> Result<(), SyncError> {
        self.listener
            .on_data_changed(path, body)
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(())
    }
}
