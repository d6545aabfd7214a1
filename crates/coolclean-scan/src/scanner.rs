//! Background large-file scanner.

use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use coolclean_core::{ScanConfig, ScanWarning, ScannedFile};

use crate::handle::{EVENT_CHANNEL_SIZE, ScanHandle};
use crate::progress::ScanEvent;
use crate::traverse::{TraversalVisitor, traverse};

/// Runs large-file scans on a blocking worker, one at a time.
///
/// Starting a scan cancels the one before it, so a consumer that keeps the
/// latest handle never sees events from an earlier run.
#[derive(Debug, Default)]
pub struct LargeFileScanner {
    current: Option<CancellationToken>,
}

impl LargeFileScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scanning `config.root` in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, config: ScanConfig) -> ScanHandle<ScanEvent> {
        self.stop();

        let cancel = CancellationToken::new();
        self.current = Some(cancel.clone());

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let worker_cancel = cancel.clone();

        tokio::task::spawn_blocking(move || {
            info!(
                "Large-file scan of {} (min size {} bytes)",
                config.root.display(),
                config.min_size
            );

            let mut visitor = ChannelVisitor {
                tx: tx.clone(),
                cancel: worker_cancel,
            };

            let event = match traverse(&config, &mut visitor) {
                Ok(summary) => {
                    info!(
                        "Large-file scan finished: {} found in {} entries ({:?}{})",
                        summary.files_found,
                        summary.entries_visited,
                        summary.elapsed,
                        if summary.cancelled { ", cancelled" } else { "" }
                    );
                    ScanEvent::Completed(summary)
                }
                Err(err) => {
                    warn!("Large-file scan failed: {err}");
                    ScanEvent::Failed(err)
                }
            };

            let _ = tx.blocking_send(event);
        });

        ScanHandle::new(rx, cancel)
    }

    /// Cancel the running scan, if any.
    pub fn stop(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Whether a scan started by this scanner has not been stopped.
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

/// Forwards traversal output into the event channel.
struct ChannelVisitor {
    tx: mpsc::Sender<ScanEvent>,
    cancel: CancellationToken,
}

impl TraversalVisitor for ChannelVisitor {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }

    fn on_entry(&mut self, entry: ScannedFile) {
        let _ = self.tx.blocking_send(ScanEvent::FileFound(entry));
    }

    fn on_progress(&mut self, path: &Path) {
        let _ = self.tx.blocking_send(ScanEvent::PathUpdate(path.to_path_buf()));
    }

    fn on_warning(&mut self, warning: ScanWarning) {
        debug!("{}: {}", warning.path.display(), warning.message);
    }
}
