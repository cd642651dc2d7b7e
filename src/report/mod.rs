pub mod html;

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metadata::{LookupError, PosterLookup};

pub const ADDITIONS_FILE: &str = "newmovies.html";
pub const REMOVALS_FILE: &str = "removedmovies.html";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One title as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportItem {
    pub name: String,
    pub image: Option<String>,
}

/// Writes the addition and removal reports into one directory.
pub struct ReportEmitter {
    out_dir: PathBuf,
    lookup: Box<dyn PosterLookup>,
}

impl ReportEmitter {
    pub fn new(out_dir: PathBuf, lookup: Box<dyn PosterLookup>) -> Self {
        ReportEmitter { out_dir, lookup }
    }

    /// Write the new-titles report. Nothing is written when there are no
    /// additions, the previous report is left as it was.
    pub fn emit_additions(&self, names: &[String]) -> Result<Option<PathBuf>, ReportError> {
        if names.is_empty() {
            return Ok(None);
        }

        let items = self.resolve(names);
        let path = self.out_dir.join(ADDITIONS_FILE);
        write_atomic(&path, &html::render_additions(&items))?;
        Ok(Some(path))
    }

    /// Write the removed-titles report, replacing any earlier one even when
    /// nothing was removed.
    pub fn emit_removals(&self, names: &[String]) -> Result<PathBuf, ReportError> {
        let items = self.resolve(names);
        let path = self.out_dir.join(REMOVALS_FILE);
        write_atomic(&path, &html::render_removals(&items))?;
        Ok(path)
    }

    fn resolve(&self, names: &[String]) -> Vec<ReportItem> {
        let mut cache: HashMap<&str, Option<String>> = HashMap::new();

        names
            .iter()
            .map(|name| {
                let image = cache
                    .entry(name.as_str())
                    .or_insert_with(|| image_for(self.lookup.as_ref(), name))
                    .clone();

                ReportItem {
                    name: name.clone(),
                    image,
                }
            })
            .collect()
    }
}

// a failed lookup costs the item its poster, never the report
fn image_for(lookup: &dyn PosterLookup, name: &str) -> Option<String> {
    match lookup.fetch_image_reference(name) {
        Ok(url) => Some(url),
        Err(LookupError::Disabled) => None,
        Err(e) => {
            tracing::warn!(%name, error = %e, "poster lookup failed");
            None
        }
    }
}

// readers never observe a half-written report
fn write_atomic(path: &Path, contents: &str) -> Result<(), ReportError> {
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::debug!(path = %path.display(), "wrote report");
    Ok(())
}
