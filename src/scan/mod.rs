//! Media file discovery under library roots.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// The one file extension a library is made of.
pub const MEDIA_EXTENSION: &str = "mkv";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot traverse {}: {source}", root.display())]
    Unreadable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot traverse {}: not a directory", root.display())]
    NotADirectory { root: PathBuf },
}

/// Everything collected across all configured roots.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Absolute media paths, deduplicated and sorted.
    pub paths: Vec<PathBuf>,
    /// Roots that were traversed, canonicalized.
    pub scanned: Vec<PathBuf>,
    /// Roots that could not be traversed at all.
    pub failures: Vec<ScanError>,
}

/// Recursively collect media files under `root` as absolute paths.
///
/// The root itself must be a readable directory. Unreadable entries below it
/// are logged and skipped so one locked folder does not hide the rest of the
/// library.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let root = root.canonicalize().map_err(|source| ScanError::Unreadable {
        root: root.to_path_buf(),
        source,
    })?;

    if !root.is_dir() {
        return Err(ScanError::NotADirectory { root });
    }

    let mut found = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(ScanError::Unreadable {
                    root,
                    source: e.into(),
                });
            }
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_else(|| "unknown path".to_string());
                tracing::warn!(%path, error = %e, "skipping unreadable entry");
                continue;
            }
        };

        // symlinked files count, symlinked directories are not descended
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());

        if is_file && has_media_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), files = found.len(), "scanned library root");
    Ok(found)
}

/// Scan every root, keeping whatever the readable ones yield.
pub fn scan_roots(roots: &[PathBuf]) -> ScanOutcome {
    let mut paths = BTreeSet::new();
    let mut scanned = Vec::new();
    let mut failures = Vec::new();

    for root in roots {
        match scan(root) {
            Ok(found) => {
                paths.extend(found);
                scanned.push(root.canonicalize().unwrap_or_else(|_| root.clone()));
            }
            Err(e) => {
                tracing::warn!("{e}");
                failures.push(e);
            }
        }
    }

    ScanOutcome {
        paths: paths.into_iter().collect(),
        scanned,
        failures,
    }
}

fn has_media_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(MEDIA_EXTENSION)
}

// shell globbing never matches dot-prefixed names, neither do we
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
