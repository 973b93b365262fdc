use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::launch::{EntryAction, LaunchSpec};

/// A scan category. Each category is an independent sub-scan with its own
/// snapshot key; merged repositories keep entries in this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Recursive walks of configured program directories (start-menu style).
    Programs,
    /// Shallow enumeration of PATH-like directories.
    PathEnv,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 2] = [CategoryKind::Programs, CategoryKind::PathEnv];

    /// Logical snapshot key for this category.
    pub fn key(self) -> &'static str {
        match self {
            CategoryKind::Programs => "programs",
            CategoryKind::PathEnv => "path",
        }
    }
}

/// Which matching heuristic applies to an entry. PATH binaries are matched
/// primarily by executable name, discovered programs by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatcherKind {
    DisplayName,
    ExecutableName,
}

/// One discoverable launchable item. Immutable once constructed — rescans
/// build new entries, concurrent readers never observe partial state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    /// Resolved executable/activation path; unique within one repository.
    pub path: PathBuf,
    pub name: String,
    pub name_lower: String,
    /// Lowercased executable file stem, precomputed for matching.
    pub stem_lower: String,
    pub description: Option<String>,
    pub icon_path: Option<PathBuf>,
    pub category: CategoryKind,
    pub matcher: MatcherKind,
    pub launch: LaunchSpec,
    pub actions: Vec<EntryAction>,
}

impl ProgramEntry {
    pub fn new(
        name: impl Into<String>,
        path: PathBuf,
        category: CategoryKind,
        matcher: MatcherKind,
    ) -> Self {
        let name = name.into();
        let name_lower = name.to_lowercase();
        let stem_lower = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let launch = LaunchSpec::for_path(path.clone());
        let mut actions = Vec::new();
        if let Some(parent) = path.parent() {
            actions.push(EntryAction::OpenLocation(parent.to_path_buf()));
        }
        actions.push(EntryAction::CopyPath(path.clone()));

        Self {
            icon_path: Some(path.clone()),
            path,
            name,
            name_lower,
            stem_lower,
            description: None,
            category,
            matcher,
            launch,
            actions,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Relevance score for one entry against one query, broken into components
/// so ranking decisions stay debuggable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    pub total: i32,
    pub base_score: i32,
    pub name_bonus: i32,
    pub exact_bonus: i32,
    pub exact_match: bool,
    pub match_type: &'static str,
}

/// One ranked query result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry: ProgramEntry,
    pub score: Score,
}

/// Context for scoring entries during one query.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub raw_query: &'a str,
    pub max_typos: u16,
    /// Maximum number of hits to return; 0 means unlimited.
    pub limit: usize,
}

impl<'a> QueryContext<'a> {
    pub fn new(raw_query: &'a str) -> Self {
        // Short queries get no typo budget, longer ones a small one, so a
        // two-letter query can't match half the index.
        let trimmed = raw_query.trim();
        let max_typos = (trimmed.len() as u16 / 4).min(3);
        Self {
            raw_query,
            max_typos,
            limit: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Serving state of the index: `Stale` right after a snapshot preload,
/// `Fresh` once the most recent completed rescan has been installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Stale,
    Fresh,
}
