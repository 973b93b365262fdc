//! Launch capability for indexed entries.
//!
//! The index only captures enough information to start a program later
//! (resolved path, arguments, working directory). Actually spawning the
//! process is delegated to the host; a failed spawn is reported as an
//! outcome message, never as a crate error.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Everything needed to start one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub path: PathBuf,
    pub arguments: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn for_path(path: PathBuf) -> Self {
        let working_dir = path.parent().map(PathBuf::from);
        Self {
            path,
            arguments: Vec::new(),
            working_dir,
        }
    }
}

/// Secondary context-menu style actions attached to an entry. Invocation is
/// up to the host; the variants only carry the data needed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryAction {
    OpenLocation(PathBuf),
    CopyPath(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub started: bool,
    /// User-facing message when the launch failed.
    pub message: Option<String>,
}

/// Spawn the program described by `spec`. Never panics and never returns an
/// `Error` — the caller gets a boolean outcome plus a displayable message.
pub fn launch(spec: &LaunchSpec) -> LaunchOutcome {
    let mut command = Command::new(&spec.path);
    command.args(&spec.arguments);
    if let Some(dir) = &spec.working_dir {
        command.current_dir(dir);
    }

    match command.spawn() {
        Ok(child) => {
            debug!(pid = child.id(), path = %spec.path.display(), "launched program");
            LaunchOutcome {
                started: true,
                message: None,
            }
        }
        Err(error) => {
            warn!(%error, path = %spec.path.display(), "failed to launch program");
            LaunchOutcome {
                started: false,
                message: Some(format!("Can't start: {}", spec.path.display())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_reports_message_instead_of_crashing() {
        let spec = LaunchSpec::for_path(PathBuf::from("/definitely/not/a/real/binary"));
        let outcome = launch(&spec);

        assert!(!outcome.started);
        let message = outcome.message.expect("failed launch must carry a message");
        assert!(message.contains("Can't start"));
    }

    #[test]
    fn for_path_captures_working_dir() {
        let spec = LaunchSpec::for_path(PathBuf::from("/usr/bin/true"));
        assert_eq!(spec.working_dir, Some(PathBuf::from("/usr/bin")));
        assert!(spec.arguments.is_empty());
    }
}
