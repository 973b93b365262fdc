//! Filesystem scanner: builds a fresh entry repository from the configured
//! scan categories.
//!
//! Each category is an independent, I/O-bound sub-scan; they run on their
//! own threads and are joined before the merge. A broken item skips that
//! item, a broken category yields an empty category — only invalid settings
//! abort the whole scan.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::settings::Settings;
use crate::types::{CategoryKind, MatcherKind, ProgramEntry};

/// One scan category. `supported` is a runtime capability check so optional
/// sources degrade to an empty result instead of failing the scan.
pub trait ScanCategory: Send + Sync {
    fn kind(&self) -> CategoryKind;
    fn supported(&self, settings: &Settings) -> bool;
    fn scan(&self, settings: &Settings) -> Vec<ProgramEntry>;
}

/// Categories enabled by the given settings, in fixed category order. The
/// merge below relies on this order for its last-write-wins dedup.
pub fn built_in_categories(settings: &Settings) -> Vec<Box<dyn ScanCategory>> {
    let mut categories: Vec<Box<dyn ScanCategory>> = Vec::new();
    if settings.enable_program_dirs {
        categories.push(Box::new(ProgramDirsCategory));
    }
    if settings.enable_path_dirs {
        categories.push(Box::new(PathDirsCategory));
    }
    categories
}

/// Run every enabled category concurrently and merge the results into one
/// repository. Pure with respect to shared state: the only inputs are the
/// settings and the filesystem.
pub fn scan(settings: &Settings) -> Result<Vec<ProgramEntry>> {
    settings.validate()?;

    let categories = built_in_categories(settings);
    let scan_start = Instant::now();

    let per_category: Vec<Vec<ProgramEntry>> = thread::scope(|s| {
        let handles: Vec<_> = categories
            .iter()
            .map(|category| {
                s.spawn(move || {
                    if !category.supported(settings) {
                        debug!(
                            category = category.kind().key(),
                            "category unsupported here, yielding empty result"
                        );
                        return Vec::new();
                    }
                    let start = Instant::now();
                    let entries = category.scan(settings);
                    debug!(
                        category = category.kind().key(),
                        count = entries.len(),
                        elapsed = ?start.elapsed(),
                        "category scan completed"
                    );
                    entries
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    error!("category scan thread panicked, yielding empty result");
                    Vec::new()
                })
            })
            .collect()
    });

    let merged = merge_entries(per_category);
    info!(
        count = merged.len(),
        elapsed = ?scan_start.elapsed(),
        "filesystem scan completed"
    );
    Ok(merged)
}

/// Merge category results in category order, keeping discovery order within
/// each category. Duplicate resolved paths are last-write-wins: the later
/// entry replaces the earlier one in place, so the survivor keeps the first
/// discovery position and the overall order stays deterministic.
///
/// Also used when preloading per-category snapshots, which may disagree
/// across generations on disk.
pub(crate) fn merge_entries(per_category: Vec<Vec<ProgramEntry>>) -> Vec<ProgramEntry> {
    let mut merged: Vec<ProgramEntry> = Vec::new();
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();

    for entries in per_category {
        for entry in entries {
            match seen.entry(entry.path.clone()) {
                std::collections::hash_map::Entry::Occupied(slot) => {
                    merged[*slot.get()] = entry;
                }
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push(entry);
                }
            }
        }
    }

    merged
}

/// Recursive walk of the configured program roots, accepting files by
/// suffix and resolving symlinked shortcuts to their targets.
struct ProgramDirsCategory;

impl ScanCategory for ProgramDirsCategory {
    fn kind(&self) -> CategoryKind {
        CategoryKind::Programs
    }

    fn supported(&self, settings: &Settings) -> bool {
        !settings.program_roots.is_empty()
    }

    fn scan(&self, settings: &Settings) -> Vec<ProgramEntry> {
        let mut entries = Vec::new();

        for root in &settings.program_roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "program root missing, skipping");
                continue;
            }

            let walker = ignore::WalkBuilder::new(root)
                .standard_filters(false)
                .follow_links(false)
                // readdir order is OS-dependent; sorting keeps repeated scans
                // over an unchanged tree byte-for-byte identical
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for result in walker {
                let dir_entry = match result {
                    Ok(dir_entry) => dir_entry,
                    Err(error) => {
                        warn!(%error, root = %root.display(), "skipping unreadable item");
                        continue;
                    }
                };

                let is_candidate = dir_entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file() || ft.is_symlink());
                if !is_candidate || !settings.accepts_suffix(dir_entry.path()) {
                    continue;
                }

                match resolve_program(dir_entry.path()) {
                    Some(entry) => entries.push(entry),
                    None => {
                        warn!(
                            path = %dir_entry.path().display(),
                            "skipping unresolvable shortcut"
                        );
                    }
                }
            }
        }

        entries
    }
}

/// Build an entry for one discovered program file. Symlinked shortcuts are
/// resolved to their target; the display name stays the shortcut's stem.
/// Returns `None` when resolution fails — the per-item failure case.
fn resolve_program(path: &Path) -> Option<ProgramEntry> {
    let name = path.file_stem()?.to_string_lossy().into_owned();

    let resolved = if path.is_symlink() {
        let resolved = fs::canonicalize(path).ok()?;
        // a shortcut can point at a directory; that is not launchable
        if !resolved.is_file() {
            return None;
        }
        resolved
    } else {
        path.to_path_buf()
    };

    Some(ProgramEntry::new(
        name,
        resolved,
        CategoryKind::Programs,
        MatcherKind::DisplayName,
    ))
}

/// Shallow enumeration of PATH-like directories. Entries are matched by
/// executable name rather than display name.
struct PathDirsCategory;

impl ScanCategory for PathDirsCategory {
    fn kind(&self) -> CategoryKind {
        CategoryKind::PathEnv
    }

    fn supported(&self, settings: &Settings) -> bool {
        !settings.effective_path_dirs().is_empty()
    }

    fn scan(&self, settings: &Settings) -> Vec<ProgramEntry> {
        let mut entries = Vec::new();

        for dir in settings.effective_path_dirs() {
            let read_dir = match fs::read_dir(&dir) {
                Ok(read_dir) => read_dir,
                Err(error) => {
                    debug!(%error, dir = %dir.display(), "skipping unreadable PATH dir");
                    continue;
                }
            };

            let mut found: Vec<ProgramEntry> = read_dir
                .filter_map(|item| {
                    let item = match item {
                        Ok(item) => item,
                        Err(error) => {
                            warn!(%error, dir = %dir.display(), "skipping unreadable item");
                            return None;
                        }
                    };
                    let path = item.path();
                    let metadata = fs::metadata(&path).ok()?;
                    if !is_executable(&path, &metadata) {
                        return None;
                    }
                    let name = path.file_name()?.to_string_lossy().into_owned();
                    Some(ProgramEntry::new(
                        name,
                        path,
                        CategoryKind::PathEnv,
                        MatcherKind::ExecutableName,
                    ))
                })
                .collect();

            found.sort_by(|a, b| a.path.cmp(&b.path));
            entries.extend(found);
        }

        entries
    }
}

#[cfg(unix)]
fn is_executable(_path: &Path, metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(path: &Path, metadata: &fs::Metadata) -> bool {
    const EXECUTABLE_SUFFIXES: [&str; 4] = ["exe", "bat", "cmd", "com"];
    metadata.is_file()
        && path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| EXECUTABLE_SUFFIXES.contains(&ext.as_str()))
}
