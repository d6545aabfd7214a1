//! The scan session: one large-file scan and one duplicate scan, with their
//! results.
//!
//! Scans run on background workers and report through channels. The session
//! is the only place results are changed: events are applied by [`pump`] or
//! by the `wait_*` methods, and deletions update the same state once they
//! finish. Failures never propagate as errors; they end up in the
//! `last_error` of the state they concern.
//!
//! [`pump`]: ScanSession::pump

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use coolclean_analyze::{DuplicateEvent, DuplicatePhase, DuplicateScanner};
use coolclean_core::{DeleteError, DuplicateConfig, FileId, GroupId, ScanConfig, ScanError};
use coolclean_ops::{
    DeletionComplete, DeletionEvent, DeletionTarget, FallbackDeleter, NoFallback, TrashDeleter,
    start_deletion,
};
use coolclean_scan::{LargeFileScanner, ScanEvent, ScanHandle};

use crate::collab::{AccessManager, Entitlement, FsAccess, ScanQuota};
use crate::settings::SessionSettings;
use crate::state::{DuplicateState, LargeFileState};

/// Coordinates scans, their results and deletions for one window or run.
pub struct ScanSession {
    settings: SessionSettings,
    access: Box<dyn AccessManager>,
    entitlement: Box<dyn Entitlement>,
    fallback: Arc<dyn FallbackDeleter>,

    large_scanner: LargeFileScanner,
    large_rx: Option<ScanHandle<ScanEvent>>,
    large: LargeFileState,

    duplicate_scanner: DuplicateScanner,
    duplicate_rx: Option<ScanHandle<DuplicateEvent>>,
    duplicates: DuplicateState,
}

impl ScanSession {
    /// Create a session with filesystem access checks, no scan quota and
    /// the trash as deletion fallback when `use_trash` is set.
    pub fn new(settings: SessionSettings) -> Self {
        let fallback: Arc<dyn FallbackDeleter> = if settings.use_trash {
            Arc::new(TrashDeleter)
        } else {
            Arc::new(NoFallback)
        };

        Self {
            settings,
            access: Box::new(FsAccess),
            entitlement: Box::new(ScanQuota::unlimited()),
            fallback,
            large_scanner: LargeFileScanner::new(),
            large_rx: None,
            large: LargeFileState::default(),
            duplicate_scanner: DuplicateScanner::new(),
            duplicate_rx: None,
            duplicates: DuplicateState::default(),
        }
    }

    /// Use `access` to decide which folders may be scanned.
    pub fn with_access(mut self, access: impl AccessManager + 'static) -> Self {
        self.access = Box::new(access);
        self
    }

    /// Use `entitlement` to gate top-level scans.
    pub fn with_entitlement(mut self, entitlement: impl Entitlement + 'static) -> Self {
        self.entitlement = Box::new(entitlement);
        self
    }

    /// Use `fallback` when a direct delete fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackDeleter>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn large_files(&self) -> &LargeFileState {
        &self.large
    }

    pub fn duplicates(&self) -> &DuplicateState {
        &self.duplicates
    }

    /// Whether either scan is in flight.
    pub fn is_busy(&self) -> bool {
        self.large.is_scanning || self.duplicates.is_scanning
    }

    /// Whether the entitlement allows another top-level scan.
    pub fn can_scan(&self) -> bool {
        self.entitlement.can_scan()
    }

    /// Ask the access manager for a folder to scan.
    pub fn request_access(&mut self) -> Option<PathBuf> {
        self.access.request_access()
    }

    // Large-file scan

    /// Start a user-initiated large-file scan, consuming one scan from the
    /// entitlement. Returns `false`, without starting, when none is left.
    pub fn start_top_level_large_file_scan(&mut self, root: impl Into<PathBuf>) -> bool {
        if !self.entitlement.can_scan() {
            debug!("Top-level scan refused: no scans left");
            return false;
        }
        self.entitlement.consume_one_scan();
        self.start_large_file_scan(root);
        true
    }

    /// Rescan a folder the user navigated into. Never consumes quota.
    pub fn drill_down(&mut self, dir: impl Into<PathBuf>) {
        self.start_large_file_scan(dir);
    }

    /// Start a large-file scan of `root`, replacing any running one and its
    /// results.
    pub fn start_large_file_scan(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        self.stop_large_file_scan();
        self.large.reset();

        if !self.access.has_access(&root) {
            let err = ScanError::AccessDenied { path: root };
            warn!("{err}");
            self.large.last_error = Some(err.to_string());
            return;
        }

        let config = ScanConfig {
            root,
            min_size: self.settings.large_file_min_size,
            include_hidden: self.settings.include_hidden,
            apparent_size: self.settings.apparent_size,
        };
        self.large_rx = Some(self.large_scanner.start(config));
        self.large.is_scanning = true;
    }

    /// Stop the large-file scan. Results found so far are kept; events still
    /// in flight are discarded.
    pub fn stop_large_file_scan(&mut self) {
        self.large_scanner.stop();
        self.large_rx = None;
        self.large.is_scanning = false;
        self.large.current_path = None;
    }

    /// Wait until the large-file scan ends, applying its events.
    pub async fn wait_large_file_scan(&mut self) {
        loop {
            let event = match self.large_rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => return,
            };
            match event {
                Some(event) => self.apply_scan_event(event),
                None => self.finish_large_file_scan(),
            }
        }
    }

    fn apply_scan_event(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::FileFound(file) => {
                let cap = self.settings.result_cap();
                self.large.insert(file, cap);
            }
            ScanEvent::PathUpdate(path) => {
                self.large.current_path = Some(path);
            }
            ScanEvent::Completed(summary) => {
                self.large.summary = Some(summary);
                self.finish_large_file_scan();
            }
            ScanEvent::Failed(err) => {
                self.large.last_error = Some(err.to_string());
                self.finish_large_file_scan();
            }
        }
    }

    fn finish_large_file_scan(&mut self) {
        self.large_rx = None;
        self.large.is_scanning = false;
        self.large.current_path = None;
    }

    /// Delete a large-file result from disk and from the results.
    ///
    /// Returns whether it was deleted. On failure the entry stays and
    /// `last_error` names it.
    pub async fn delete_entry(&mut self, id: FileId) -> bool {
        let Some(file) = self.large.get(id).cloned() else {
            self.large.last_error = Some(stale(id).to_string());
            return false;
        };

        let target = DeletionTarget::new(file);
        match run_target(target.clone(), Arc::clone(&self.fallback)).await {
            Ok(()) => {
                self.large.remove(id);
                self.duplicates.forget_path(&target.file.path);
                true
            }
            Err(err) => {
                self.large.last_error = Some(err.to_string());
                false
            }
        }
    }

    // Duplicate scan

    /// Start a user-initiated duplicate scan, consuming one scan from the
    /// entitlement. Returns `false`, without starting, when none is left.
    pub fn start_top_level_duplicate_scan(&mut self, root: impl Into<PathBuf>) -> bool {
        if !self.entitlement.can_scan() {
            debug!("Top-level scan refused: no scans left");
            return false;
        }
        self.entitlement.consume_one_scan();
        self.start_duplicate_scan(root);
        true
    }

    /// Start a duplicate scan of `root`, replacing any running one and its
    /// results.
    pub fn start_duplicate_scan(&mut self, root: impl Into<PathBuf>) {
        let root = root.into();
        self.stop_duplicate_scan();
        self.duplicates.reset();

        if !self.access.has_access(&root) {
            let err = ScanError::AccessDenied { path: root };
            warn!("{err}");
            self.duplicates.last_error = Some(err.to_string());
            return;
        }

        let mut config = DuplicateConfig::new(root, self.settings.duplicate_min_size);
        config.include_hidden = self.settings.include_hidden;
        self.duplicate_rx = Some(self.duplicate_scanner.start(config));
        self.duplicates.is_scanning = true;
    }

    /// Stop the duplicate scan. Groups found so far are kept; events still
    /// in flight are discarded.
    pub fn stop_duplicate_scan(&mut self) {
        self.duplicate_scanner.stop();
        self.duplicate_rx = None;
        self.duplicates.is_scanning = false;
        self.duplicates.phase = DuplicatePhase::Idle;
        self.duplicates.current_path = None;
    }

    /// Wait until the duplicate scan ends, applying its events.
    pub async fn wait_duplicate_scan(&mut self) {
        loop {
            let event = match self.duplicate_rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => return,
            };
            match event {
                Some(event) => self.apply_duplicate_event(event),
                None => self.finish_duplicate_scan(),
            }
        }
    }

    fn apply_duplicate_event(&mut self, event: DuplicateEvent) {
        match event {
            DuplicateEvent::PhaseChanged(phase) => {
                self.duplicates.phase = phase;
            }
            DuplicateEvent::PathUpdate(path) => {
                self.duplicates.current_path = Some(path);
            }
            DuplicateEvent::Progress(fraction) => {
                self.duplicates.progress = fraction.clamp(0.0, 1.0);
            }
            DuplicateEvent::GroupFound(group) => {
                self.duplicates.insert(group);
            }
            DuplicateEvent::Completed(summary) => {
                if !summary.cancelled {
                    self.duplicates.progress = 1.0;
                }
                self.duplicates.summary = Some(summary);
                self.finish_duplicate_scan();
            }
            DuplicateEvent::Failed(err) => {
                self.duplicates.last_error = Some(err.to_string());
                self.finish_duplicate_scan();
            }
        }
    }

    fn finish_duplicate_scan(&mut self) {
        self.duplicate_rx = None;
        self.duplicates.is_scanning = false;
        self.duplicates.phase = DuplicatePhase::Idle;
        self.duplicates.current_path = None;
    }

    /// Delete one member of a group. The group goes away once fewer than
    /// two members remain.
    ///
    /// With `verify_before_delete`, the file is only removed if another
    /// member still on disk has the same full content.
    pub async fn delete_duplicate_file(&mut self, file: FileId, group: GroupId) -> bool {
        let Some(found) = self.duplicates.get(group) else {
            self.duplicates.last_error = Some(stale(file).to_string());
            return false;
        };
        let Some(member) = found.files.iter().find(|f| f.id == file).cloned() else {
            self.duplicates.last_error = Some(stale(file).to_string());
            return false;
        };

        let target = if self.settings.verify_before_delete {
            let survivors = found
                .files
                .iter()
                .filter(|f| f.id != file)
                .map(|f| f.path.clone())
                .collect();
            DeletionTarget::verified(member, survivors)
        } else {
            DeletionTarget::new(member)
        };

        match run_target(target.clone(), Arc::clone(&self.fallback)).await {
            Ok(()) => {
                if let Some(mut updated) = self.duplicates.take(group) {
                    updated.remove_file(file);
                    self.duplicates.restore(updated);
                }
                self.large.forget_path(&target.file.path);
                true
            }
            Err(err) => {
                self.duplicates.last_error = Some(err.to_string());
                false
            }
        }
    }

    /// Delete every member of a group except, with `keep_first`, the first.
    ///
    /// The group is removed unless deletions failed and two or more members
    /// are left, in which case it stays with the survivors and `last_error`
    /// lists the failures.
    pub async fn delete_all_duplicates_in_group(
        &mut self,
        group: GroupId,
        keep_first: bool,
    ) -> DeletionComplete {
        let Some(mut found) = self.duplicates.take(group) else {
            let err = DeleteError::Stale {
                name: format!("group #{}", group.0),
            };
            self.duplicates.last_error = Some(err.to_string());
            return DeletionComplete::default();
        };

        let keeper = found.keeper().filter(|_| keep_first).map(|f| f.path.clone());
        let skip = usize::from(keep_first);
        let targets: Vec<DeletionTarget> = found
            .files
            .iter()
            .skip(skip)
            .map(|f| match (&keeper, self.settings.verify_before_delete) {
                (Some(keeper), true) => DeletionTarget::verified(f.clone(), vec![keeper.clone()]),
                _ => DeletionTarget::new(f.clone()),
            })
            .collect();

        let mut rx = start_deletion(targets, Arc::clone(&self.fallback));
        let mut result = DeletionComplete::default();
        while let Some(event) = rx.recv().await {
            if let DeletionEvent::Complete(done) = event {
                result = done;
            }
        }

        for id in &result.deleted {
            if let Some(removed) = found.remove_file(*id) {
                self.large.forget_path(&removed.path);
            }
        }
        info!("Group {}: {}", found.fingerprint, result.summary());

        if !result.is_success() {
            let messages: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
            self.duplicates.last_error = Some(messages.join("; "));
        }
        self.duplicates.restore(found);

        result
    }

    /// Space reclaimable by keeping one copy in every current group.
    pub fn total_savings(&self) -> u64 {
        self.duplicates.total_savings()
    }

    /// Apply every event that has already arrived, without waiting.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;

        while let Some(rx) = self.large_rx.as_mut() {
            match rx.try_recv() {
                Ok(event) => {
                    self.apply_scan_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finish_large_file_scan(),
            }
        }

        while let Some(rx) = self.duplicate_rx.as_mut() {
            match rx.try_recv() {
                Ok(event) => {
                    self.apply_duplicate_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finish_duplicate_scan(),
            }
        }

        applied
    }

    /// Stop both scans.
    pub fn stop_all(&mut self) {
        self.stop_large_file_scan();
        self.stop_duplicate_scan();
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Run a deletion target on a blocking worker.
async fn run_target(
    target: DeletionTarget,
    fallback: Arc<dyn FallbackDeleter>,
) -> Result<(), DeleteError> {
    let name = target.file.name.to_string();
    tokio::task::spawn_blocking(move || target.execute(fallback.as_ref()))
        .await
        .unwrap_or_else(|e| {
            Err(DeleteError::Failed {
                name,
                reason: e.to_string(),
            })
        })
}

fn stale(id: FileId) -> DeleteError {
    DeleteError::Stale {
        name: format!("entry #{}", id.0),
    }
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("settings", &self.settings)
            .field("large", &self.large)
            .field("duplicates", &self.duplicates)
            .finish_non_exhaustive()
    }
}
