use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// In-memory transport that records every frame it is handed.
///
/// Clones share the same log, so a clone can be handed to a session while the
/// original is inspected afterwards. An optional write budget makes the
/// transport reject every write after the first `n`.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<RecordingState>>,
}

#[derive(Default)]
struct RecordingState {
    writes: Vec<Vec<u8>>,
    fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that accepts `n` writes and rejects the rest.
    pub fn failing_after(n: usize) -> Self {
        let transport = Self::new();
        transport.lock().fail_after = Some(n);
        transport
    }

    /// Snapshot of all accepted writes, oldest first.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.lock().writes.clone()
    }

    /// Number of accepted writes.
    pub fn len(&self) -> usize {
        self.lock().writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        // A poisoned log is still a valid log.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for RecordingTransport {
    async fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if let Some(limit) = state.fail_after {
            if state.writes.len() >= limit {
                return Err(TransportError::Rejected(format!(
                    "write budget of {limit} exhausted"
                )));
            }
        }
        state.writes.push(bytes.to_vec());
        trace!(len = bytes.len(), total = state.writes.len(), "frame recorded");
        Ok(())
    }
}

impl std::fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("RecordingTransport")
            .field("writes", &state.writes.len())
            .field("fail_after", &state.fail_after)
            .finish()
    }
}
