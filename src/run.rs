//! One complete tracking run.
//!
//! Order matters: the lock is taken first, the store is only opened once the
//! scan found something, and reports are only written after reconciliation
//! succeeded. Any fatal error therefore leaves the store and the previous
//! reports as they were.

use std::path::PathBuf;

use crate::config::Config;
use crate::context::RunContext;
use crate::error::RunError;
use crate::lock::RunLock;
use crate::metadata::{DisabledLookup, OmdbLookup, PosterLookup};
use crate::reconcile::{self, Reconciliation};
use crate::report::ReportEmitter;
use crate::scan;
use crate::store::Store;

#[derive(Debug)]
pub struct RunSummary {
    pub files_seen: usize,
    pub failed_roots: usize,
    pub reconciliation: Reconciliation,
    pub additions_report: Option<PathBuf>,
    pub removals_report: PathBuf,
}

/// Poster provider for this run, or a disabled one when lookups are off or
/// no API key is configured.
pub fn poster_lookup(config: &Config) -> Box<dyn PosterLookup> {
    if !config.lookup_enabled {
        return Box::new(DisabledLookup);
    }

    match &config.omdb_api_key {
        Some(key) => Box::new(OmdbLookup::new(key.clone(), config.lookup_timeout)),
        None => {
            tracing::info!("no OMDb API key configured, reports will have no posters");
            Box::new(DisabledLookup)
        }
    }
}

pub fn run(config: &Config, lookup: Box<dyn PosterLookup>) -> Result<RunSummary, RunError> {
    let _lock = RunLock::acquire(&config.database)?;

    let outcome = scan::scan_roots(&config.roots);
    let failed_roots = outcome.failures.len();

    if outcome.paths.is_empty() {
        return Err(if failed_roots > 0 {
            RunError::Traversal { failed: failed_roots }
        } else {
            RunError::NoMedia
        });
    }

    let store = Store::open(&config.database)?;
    let ctx = RunContext::new(store, outcome.scanned);
    tracing::debug!(roots = ctx.roots.len(), files = outcome.paths.len(), "reconciling");

    let reconciliation = reconcile::reconcile(&ctx, &outcome.paths)?;

    let emitter = ReportEmitter::new(config.report_dir.clone(), lookup);
    let additions_report = emitter.emit_additions(&reconciliation.new_names)?;
    let removals_report = emitter.emit_removals(&reconciliation.lost_names)?;

    Ok(RunSummary {
        files_seen: outcome.paths.len(),
        failed_roots,
        reconciliation,
        additions_report,
        removals_report,
    })
}
