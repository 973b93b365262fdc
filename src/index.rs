//! Index coordinator: owns the active entry repository, serves queries while
//! rescans run in the background, and flushes snapshots.
//!
//! The only shared mutable resource is the active repository `Arc`. Readers
//! clone it under a short read lock once per query; a completed rescan
//! installs its result with one short write-lock pointer swap. A query in
//! flight keeps iterating the generation it grabbed — there is never a
//! query-visible gap or a mixed generation.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::scan;
use crate::score::match_and_score_entries;
use crate::settings::Settings;
use crate::snapshot::SnapshotStore;
use crate::types::{Freshness, ProgramEntry, QueryContext, SearchHit};

pub struct ProgramIndex {
    settings: Settings,
    store: SnapshotStore,
    entries: Arc<RwLock<Arc<Vec<ProgramEntry>>>>,
    fresh: Arc<AtomicBool>,
    is_scanning: Arc<AtomicBool>,
    scan_thread: Mutex<Option<JoinHandle<()>>>,
}

impl ProgramIndex {
    /// Build an index over the given settings. Invalid settings are the only
    /// hard error; the index starts empty until `start` or `reindex`.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let store = SnapshotStore::new(settings.snapshot_dir.clone());
        Ok(Self {
            settings,
            store,
            entries: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            fresh: Arc::new(AtomicBool::new(false)),
            is_scanning: Arc::new(AtomicBool::new(false)),
            scan_thread: Mutex::new(None),
        })
    }

    /// Preload the cached snapshots so queries have something to work with
    /// immediately, then kick off the first background rescan.
    pub fn start(&self) -> Result<()> {
        let preloaded = self.load_snapshots();
        info!(count = preloaded.len(), "preloaded entries from snapshots");
        *self.entries.write() = Arc::new(preloaded);
        self.fresh.store(false, Ordering::SeqCst);

        self.reindex()
    }

    fn load_snapshots(&self) -> Vec<ProgramEntry> {
        let per_category = scan::built_in_categories(&self.settings)
            .iter()
            .map(|category| self.store.load(category.kind().key()))
            .collect::<Vec<_>>();

        // Category files on disk can come from different generations (a
        // partial save, or a run with other categories enabled), so the same
        // resolved path may appear in more than one snapshot. Apply the
        // scanner's last-write-wins merge to keep paths unique.
        scan::merge_entries(per_category)
    }

    /// The latest fully-built repository. Never blocks on an in-flight scan.
    pub fn current(&self) -> Arc<Vec<ProgramEntry>> {
        Arc::clone(&self.entries.read())
    }

    pub fn freshness(&self) -> Freshness {
        if self.fresh.load(Ordering::SeqCst) {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.is_scanning.load(Ordering::SeqCst)
    }

    /// Rebuild the repository off the calling path. The currently served
    /// repository stays active until the new one is fully built; a rescan
    /// already in flight is not restarted.
    pub fn reindex(&self) -> Result<()> {
        self.settings.validate()?;

        if self.is_scanning.swap(true, Ordering::SeqCst) {
            debug!("scan already in progress, skipping reindex");
            return Ok(());
        }

        let settings = self.settings.clone();
        let entries = Arc::clone(&self.entries);
        let fresh = Arc::clone(&self.fresh);
        let is_scanning = Arc::clone(&self.is_scanning);

        let handle = std::thread::spawn(move || {
            match scan::scan(&settings) {
                Ok(scanned) => {
                    let repository = Arc::new(scanned);
                    *entries.write() = Arc::clone(&repository);
                    fresh.store(true, Ordering::SeqCst);
                    info!(count = repository.len(), "installed fresh program index");
                }
                // settings were validated before spawning, so this only
                // fires if validation rules change under our feet
                Err(error) => error!(%error, "background scan failed"),
            }
            is_scanning.store(false, Ordering::SeqCst);
        });

        // A finished previous handle is simply dropped; joining happens at
        // shutdown for whichever scan is last in flight.
        *self.scan_thread.lock() = Some(handle);
        Ok(())
    }

    /// Poll until the in-flight scan finishes or the timeout elapses.
    /// Returns false on timeout.
    pub fn wait_for_scan(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let mut sleep_duration = Duration::from_millis(1);

        while self.is_scanning.load(Ordering::SeqCst) {
            if start.elapsed() >= timeout {
                warn!(?timeout, "wait_for_scan timed out");
                return false;
            }
            std::thread::sleep(sleep_duration);
            sleep_duration = (sleep_duration * 2).min(Duration::from_millis(50));
        }
        true
    }

    /// Score the current repository against `query_text`. The repository
    /// reference is taken once; a swap mid-query does not affect the list
    /// this query iterates.
    pub fn query(&self, query_text: &str) -> Vec<SearchHit> {
        self.query_with_context(QueryContext::new(query_text))
    }

    pub fn query_with_context(&self, context: QueryContext<'_>) -> Vec<SearchHit> {
        let snapshot = self.current();
        match_and_score_entries(&snapshot, &context)
            .into_iter()
            .map(|(entry, score)| SearchHit {
                entry: entry.clone(),
                score,
            })
            .collect()
    }

    /// Flush the active repository to the snapshot store, one blob per
    /// category. Safe while a reindex is in flight: it persists whatever is
    /// currently active, never a torn state. The first failure is returned
    /// after all categories were attempted.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.current();

        let mut first_error = None;
        for category in scan::built_in_categories(&self.settings) {
            let kind = category.kind();
            let grouped: Vec<ProgramEntry> = snapshot
                .iter()
                .filter(|entry| entry.category == kind)
                .cloned()
                .collect();

            if let Err(error) = self.store.save(kind.key(), &grouped) {
                error!(%error, key = kind.key(), "failed to save snapshot");
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Persist the current state and join any scan still in flight. Save
    /// failures are returned but do not prevent the join.
    pub fn shutdown(&self) -> Result<()> {
        let save_result = self.save();

        if let Some(handle) = self.scan_thread.lock().take() {
            if handle.join().is_err() {
                warn!("scan thread panicked during shutdown");
            }
        }

        save_result
    }
}
