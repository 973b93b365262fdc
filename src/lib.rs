//! launch-index - program indexing and fuzzy query engine
//!
//! Discovers launchable entries on the host filesystem, caches them in
//! per-category binary snapshots for instant cold starts, and answers
//! fuzzy-search queries against the active repository while rescans run in
//! the background.

mod error;
pub mod index;
pub mod launch;
pub mod logging;
pub mod scan;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod types;

pub use error::{Error, Result};
pub use index::ProgramIndex;
pub use launch::{EntryAction, LaunchOutcome, LaunchSpec, launch};
pub use scan::{ScanCategory, scan};
pub use score::match_and_score_entries;
pub use settings::Settings;
pub use snapshot::SnapshotStore;
pub use types::{
    CategoryKind, Freshness, MatcherKind, ProgramEntry, QueryContext, Score, SearchHit,
};
