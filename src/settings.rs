//! Scan configuration. Loaded once, read-only for the duration of a scan.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Roots walked recursively for launchable files (start-menu style).
    pub program_roots: Vec<PathBuf>,
    /// File suffixes accepted by the program-directories category, without
    /// the leading dot and lowercase.
    pub program_suffixes: Vec<String>,
    /// PATH-like directories enumerated shallowly. Empty means "use the
    /// `PATH` environment variable".
    pub path_dirs: Vec<PathBuf>,
    pub enable_program_dirs: bool,
    pub enable_path_dirs: bool,
    /// Directory holding the per-category binary snapshots.
    pub snapshot_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program_roots: default_program_roots(),
            program_suffixes: vec![
                "exe".into(),
                "lnk".into(),
                "appref-ms".into(),
                "desktop".into(),
                "sh".into(),
            ],
            path_dirs: Vec::new(),
            enable_program_dirs: true,
            enable_path_dirs: true,
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(Error::SettingsRead)?;
        let settings: Settings = toml::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// The single hard-error gate of `reindex`/`scan`: everything else
    /// degrades to fewer entries, but a configuration that cannot describe
    /// any scan at all is reported to the caller.
    pub fn validate(&self) -> Result<()> {
        if !self.enable_program_dirs && !self.enable_path_dirs {
            return Err(Error::InvalidSettings(
                "every scan category is disabled".into(),
            ));
        }
        if self.enable_program_dirs && self.program_suffixes.is_empty() {
            return Err(Error::InvalidSettings(
                "program directory scan enabled with an empty suffix list".into(),
            ));
        }
        Ok(())
    }

    /// Effective PATH-like directories: the configured list, or the process
    /// `PATH` variable when the list is empty.
    pub fn effective_path_dirs(&self) -> Vec<PathBuf> {
        if !self.path_dirs.is_empty() {
            return self.path_dirs.clone();
        }
        std::env::var_os("PATH")
            .map(|raw| std::env::split_paths(&raw).collect())
            .unwrap_or_default()
    }

    pub fn accepts_suffix(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.program_suffixes.iter().any(|s| *s == ext))
    }
}

fn default_program_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(data) = dirs::data_dir() {
        roots.push(data.join("applications"));
    }
    if cfg!(unix) {
        roots.push(PathBuf::from("/usr/share/applications"));
    }
    roots
}

fn default_snapshot_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("launch-index")
}
