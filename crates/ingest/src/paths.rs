use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{IngestError, Result};

/// Extra candidate paths, `;`-separated, checked before the defaults.
pub const HISTORY_PATHS_ENV: &str = "YOUKNOW_HISTORY_PATHS";

const PROFILES: &[&str] = &["Default", "Profile 1", "Profile 2", "Profile 3"];

pub fn default_history_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(paths) = std::env::var(HISTORY_PATHS_ENV) {
        candidates.extend(
            paths
                .split(';')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
        );
    }
    let Ok(home) = std::env::var("HOME") else {
        return candidates;
    };
    let home = PathBuf::from(home);
    let roots = [
        home.join(".config/google-chrome"),
        home.join(".config/chromium"),
        home.join("Library/Application Support/Google/Chrome"),
        home.join("Library/Application Support/Chromium"),
    ];
    for root in roots {
        for profile in PROFILES {
            candidates.push(root.join(profile).join("History"));
        }
    }
    candidates
}

/// First readable, non-empty history file: the explicit path if given, else the defaults.
pub fn locate_history(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return check_candidate(path).map(|_| path.to_path_buf());
    }
    let candidates = default_history_candidates();
    for candidate in &candidates {
        match check_candidate(candidate) {
            Ok(()) => {
                tracing::debug!(path = %candidate.display(), "found history store");
                return Ok(candidate.clone());
            }
            Err(err) => tracing::trace!(%err, "skipping history candidate"),
        }
    }
    Err(IngestError::unavailable(
        "<default locations>",
        format!("no readable history among {} candidates", candidates.len()),
    ))
}

fn check_candidate(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|err| IngestError::unavailable(path, err))?;
    if !metadata.is_file() {
        return Err(IngestError::unavailable(path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(IngestError::unavailable(path, "file is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_unavailable() {
        let err = locate_history(Some(Path::new("/definitely/not/here/History")))
            .expect_err("missing");
        assert!(err.is_unavailable());
    }

    #[test]
    fn explicit_empty_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("History");
        fs::write(&path, b"").expect("write");
        let err = locate_history(Some(&path)).expect_err("empty");
        assert!(err.to_string().contains("empty"));
    }
}
