//! Handle to a running background scan.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Channel buffer size for scan events.
///
/// A full channel blocks the worker, which keeps a slow consumer from
/// letting events pile up without bound.
pub const EVENT_CHANNEL_SIZE: usize = 256;

/// Receiving end of a scan: its event stream plus the token its scanner
/// cancels on `stop`.
///
/// Dropping the handle closes the channel; the worker notices at its next
/// checkpoint and winds down.
#[derive(Debug)]
pub struct ScanHandle<E> {
    events: mpsc::Receiver<E>,
    cancel: CancellationToken,
}

impl<E> ScanHandle<E> {
    /// Wrap a receiver and its cancellation token.
    pub fn new(events: mpsc::Receiver<E>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Wait for the next event. `None` once the worker is gone.
    pub async fn recv(&mut self) -> Option<E> {
        self.events.recv().await
    }

    /// Take the next event if one is ready.
    pub fn try_recv(&mut self) -> Result<E, mpsc::error::TryRecvError> {
        self.events.try_recv()
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
