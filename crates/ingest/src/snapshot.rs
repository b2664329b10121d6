use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempDir;

use crate::types::{IngestError, Result};

const SNAPSHOT_FILE: &str = "History";
const REQUIRED_TABLES: &[&str] = &["urls", "visits"];

/// Private copy of a history store. The directory is removed on drop.
pub(crate) struct Snapshot {
    dir: TempDir,
    source: PathBuf,
    bytes: u64,
}

impl Snapshot {
    pub(crate) fn take(source: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(source).map_err(|err| IngestError::unavailable(source, err))?;
        if !metadata.is_file() {
            return Err(IngestError::unavailable(source, "not a regular file"));
        }
        if metadata.len() == 0 {
            return Err(IngestError::unavailable(source, "file is empty"));
        }

        let dir = tempfile::Builder::new()
            .prefix("youknow-history-")
            .tempdir()
            .map_err(|err| IngestError::unavailable(source, err))?;
        let target = dir.path().join(SNAPSHOT_FILE);
        let bytes = fs::copy(source, &target).map_err(|err| IngestError::unavailable(source, err))?;

        // The browser keeps recent writes in the WAL until checkpoint.
        let wal = sidecar(source, "-wal");
        if wal.is_file() {
            if let Err(err) = fs::copy(&wal, sidecar(&target, "-wal")) {
                tracing::warn!(path = %wal.display(), %err, "could not copy history WAL, reading main file only");
            }
        }

        tracing::debug!(
            source = %source.display(),
            snapshot = %target.display(),
            bytes,
            "history snapshot taken"
        );
        Ok(Self {
            dir,
            source: source.to_path_buf(),
            bytes,
        })
    }

    pub(crate) fn source(&self) -> &Path {
        &self.source
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Opens the copy and checks it carries the visit and URL tables.
    pub(crate) fn open(&self) -> Result<Connection> {
        let path = self.dir.path().join(SNAPSHOT_FILE);
        let conn = Connection::open(&path).map_err(|err| self.malformed(err))?;
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('urls', 'visits')",
                [],
                |row| row.get(0),
            )
            .map_err(|err| self.malformed(err))?;
        if found < REQUIRED_TABLES.len() as i64 {
            return Err(self.malformed(format!(
                "expected tables {} not found",
                REQUIRED_TABLES.join(", ")
            )));
        }
        Ok(conn)
    }

    pub(crate) fn malformed(&self, reason: impl ToString) -> IngestError {
        IngestError::malformed(&self.source, reason)
    }
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
