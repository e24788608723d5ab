use cranelink_transport::{Transport, TransportError};
use tracing::{error, warn};

use crate::emit::Emitter;

/// Owns a session's emitter while axes may be moving.
///
/// While armed, dropping the guard spawns the stop burst on the current tokio
/// runtime, so a session future dropped between ticks still centers the
/// axes. `stop` and `disarm` clear the arm.
pub(crate) struct StopGuard<T: Transport + 'static> {
    emitter: Emitter<T>,
    armed: bool,
}

impl<T: Transport + 'static> StopGuard<T> {
    pub(crate) fn new(emitter: Emitter<T>) -> Self {
        Self {
            emitter,
            armed: true,
        }
    }

    pub(crate) fn emitter(&mut self) -> &mut Emitter<T> {
        &mut self.emitter
    }

    /// Send the stop burst now.
    ///
    /// The guard stays armed until the burst has finished, so dropping this
    /// future part way through re-sends the whole burst from `Drop`.
    pub(crate) async fn stop(&mut self) -> Result<(), TransportError> {
        let result = self.emitter.stop_burst().await;
        self.armed = false;
        result
    }

    /// Give up the stop guarantee.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    pub(crate) fn next_sequence(&self) -> u8 {
        self.emitter.next_sequence()
    }

    pub(crate) fn sent(&self) -> u64 {
        self.emitter.sent()
    }
}

impl<T: Transport + 'static> Drop for StopGuard<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut emitter = self.emitter.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    seq = emitter.next_sequence(),
                    "session dropped while streaming, sending stop burst"
                );
                handle.spawn(async move {
                    if let Err(err) = emitter.stop_burst().await {
                        error!(%err, "stop burst after drop failed");
                    }
                });
            }
            Err(_) => {
                error!("session dropped outside a tokio runtime, stop burst not sent");
            }
        }
    }
}
