//! Binary snapshot persistence for entry repositories.
//!
//! One bincode blob per logical category key, written atomically via a temp
//! file. A missing, truncated, corrupt, or version-mismatched snapshot loads
//! as an empty repository — cold start is never an error.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::ProgramEntry;

const SNAPSHOT_MAGIC: [u8; 4] = *b"LIDX";
const SNAPSHOT_VERSION: u8 = 1;
const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn snapshot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.idx"))
    }

    /// Load the snapshot for `key`. Any failure is swallowed into an empty
    /// repository so startup can proceed.
    pub fn load(&self, key: &str) -> Vec<ProgramEntry> {
        let path = self.snapshot_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(key, "no snapshot on disk, starting cold");
                return Vec::new();
            }
            Err(error) => {
                warn!(%error, key, "failed to read snapshot, starting cold");
                return Vec::new();
            }
        };

        if bytes.len() < HEADER_LEN || bytes[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
            warn!(key, "snapshot has an unknown header, ignoring it");
            return Vec::new();
        }
        if bytes[SNAPSHOT_MAGIC.len()] != SNAPSHOT_VERSION {
            info!(
                key,
                found = bytes[SNAPSHOT_MAGIC.len()],
                expected = SNAPSHOT_VERSION,
                "snapshot format version mismatch, rebuilding from scratch"
            );
            return Vec::new();
        }

        match bincode::serde::decode_from_slice::<Vec<ProgramEntry>, _>(
            &bytes[HEADER_LEN..],
            bincode::config::standard(),
        ) {
            Ok((entries, _)) => {
                debug!(key, count = entries.len(), "loaded snapshot");
                entries
            }
            Err(error) => {
                warn!(%error, key, "snapshot is corrupt, starting cold");
                Vec::new()
            }
        }
    }

    /// Persist `entries` under `key`. Write failures are real errors for the
    /// caller to log; the previous snapshot stays intact because the new one
    /// is written to a temp file first and renamed over it.
    pub fn save(&self, key: &str, entries: &[ProgramEntry]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(Error::CreateDir)?;

        let payload =
            bincode::serde::encode_to_vec(entries, bincode::config::standard())?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&SNAPSHOT_MAGIC);
        bytes.push(SNAPSHOT_VERSION);
        bytes.extend_from_slice(&payload);

        let tmp_path = self.dir.join(format!("{key}.idx.tmp"));
        let final_path = self.snapshot_path(key);
        fs::write(&tmp_path, &bytes).map_err(Error::SnapshotWrite)?;
        fs::rename(&tmp_path, &final_path).map_err(Error::SnapshotWrite)?;

        debug!(key, count = entries.len(), "saved snapshot");
        Ok(())
    }
}
