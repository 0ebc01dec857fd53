use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pagelog_protocol::{CaptureSnapshot, Channel};

/// Capture buffer shared between a page context, its hooks and the registry.
pub type SharedBuffer = Arc<Mutex<CaptureBuffer>>;

/// Append-only store of captured entries, split into three channels.
///
/// Entries are never removed, replaced or reordered. Iteration order is
/// oldest → newest within each channel.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    error: Vec<String>,
    warning: Vec<String>,
    info: Vec<String>,
}

impl CaptureBuffer {
    /// Create a buffer with three empty channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer already wrapped for sharing.
    pub fn shared() -> SharedBuffer {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Append an entry to the end of a channel.
    pub fn push(&mut self, channel: Channel, entry: String) {
        self.channel_mut(channel).push(entry);
    }

    /// Entries of a channel, oldest first.
    pub fn channel(&self, channel: Channel) -> &[String] {
        match channel {
            Channel::Error => &self.error,
            Channel::Warning => &self.warning,
            Channel::Info => &self.info,
        }
    }

    /// Total number of entries across all channels.
    pub fn len(&self) -> usize {
        self.error.len() + self.warning.len() + self.info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the buffer into its retrieval layout.
    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            error: self.error.clone(),
            warning: self.warning.clone(),
            info: self.info.clone(),
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut Vec<String> {
        match channel {
            Channel::Error => &mut self.error,
            Channel::Warning => &mut self.warning,
            Channel::Info => &mut self.info,
        }
    }
}

/// Locks a shared buffer.
///
/// Entries are plain strings appended whole, so a poisoned lock still holds
/// a consistent buffer and is recovered instead of propagated.
pub(crate) fn lock(buffer: &SharedBuffer) -> MutexGuard<'_, CaptureBuffer> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}
