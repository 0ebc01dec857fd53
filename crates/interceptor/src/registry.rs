use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use pagelog_protocol::CaptureSnapshot;

use crate::buffer::{self, CaptureBuffer, SharedBuffer};

/// Identity of a page context. Unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Well-known accessor for capture buffers, keyed by context identity.
///
/// Holds weak references only: a buffer lives as long as its page context,
/// and disappears from the registry when the context is dropped.
#[derive(Debug, Default)]
pub struct CaptureRegistry {
    buffers: Mutex<HashMap<ContextId, Weak<Mutex<CaptureBuffer>>>>,
}

impl CaptureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<CaptureRegistry> {
        static GLOBAL: OnceLock<Arc<CaptureRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(CaptureRegistry::new())))
    }

    /// Registers a context's buffer. Entries of dropped contexts are pruned.
    pub(crate) fn register(&self, id: ContextId, buffer: &SharedBuffer) {
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        buffers.retain(|_, weak| weak.strong_count() > 0);
        buffers.insert(id, Arc::downgrade(buffer));
        tracing::debug!(context = %id, live = buffers.len(), "capture buffer registered");
    }

    /// The buffer of a live context, if one was registered.
    pub fn get(&self, id: ContextId) -> Option<SharedBuffer> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .and_then(Weak::upgrade)
    }

    /// Read-only copy of a live context's buffer.
    pub fn snapshot(&self, id: ContextId) -> Option<CaptureSnapshot> {
        self.get(id).map(|buf| buffer::lock(&buf).snapshot())
    }

    /// Whether a live buffer is registered for `id`.
    pub fn contains(&self, id: ContextId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of all live contexts, sorted.
    pub fn context_ids(&self) -> Vec<ContextId> {
        let buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ContextId> = buffers
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
