//! Reconciliation engine.
//!
//! Compares the files on disk now against the recorded inventory:
//! - Persists each newly observed path exactly once (identity is the path)
//! - Reports recorded display names absent from this scan as lost
//!   (identity for loss is the display name, so a move that keeps the
//!   name is not a loss, while a rename reads as one loss plus one addition)
//!
//! Lost records stay in the store. Pruning is an explicit `forget`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::store::{InsertOutcome, StoreError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per newly inserted path, in path order. Two new paths with
    /// the same display name contribute the name twice.
    pub new_names: Vec<String>,
    /// Recorded names missing from this scan, each listed once, in path order.
    pub lost_names: Vec<String>,
}

/// Display name of a media path: the file name cut at its first `.`.
///
/// `/lib/Some.Movie.2021.mkv` becomes `Some`. Titles containing dots are
/// truncated; existing inventories were recorded with this rule, so changing
/// it would make every such title read as lost plus new.
pub fn derive_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    file_name.split('.').next().unwrap_or_default().to_string()
}

/// Record every new path and classify differences against the inventory.
pub fn reconcile(ctx: &RunContext, paths: &[PathBuf]) -> Result<Reconciliation, StoreError> {
    // plain string order, not component order
    let mut ordered: Vec<&PathBuf> = paths.iter().collect();
    ordered.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut current_names: HashSet<String> = HashSet::new();
    let mut new_names = Vec::new();

    for path in ordered {
        let name = derive_name(path);
        let found = ctx.clock.now();

        match ctx.store.insert_if_absent(path, &name, &found)? {
            InsertOutcome::Inserted => {
                tracing::info!(%name, %found, "added to the inventory");
                new_names.push(name.clone());
            }
            InsertOutcome::AlreadyPresent => {
                tracing::debug!(path = %path.display(), "already recorded");
            }
        }

        current_names.insert(name);
    }

    let recorded = ctx.store.list_all()?;
    let mut lost_names = Vec::new();
    let mut reported: HashSet<&str> = HashSet::new();

    for (path, name) in &recorded {
        if current_names.contains(name) || !reported.insert(name.as_str()) {
            continue;
        }

        if ctx.covers(path) {
            tracing::warn!(%name, path = %path.display(), "no longer present in the library");
        } else {
            tracing::warn!(%name, path = %path.display(), "missing, its library was not scanned this run");
        }
        lost_names.push(name.clone());
    }

    Ok(Reconciliation { new_names, lost_names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Clock;
    use crate::store::Store;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct TickingClock(Cell<u32>);

    impl Clock for TickingClock {
        fn now(&self) -> String {
            let tick = self.0.get();
            self.0.set(tick + 1);
            format!("2021-01-01 00:00:{tick:02}.000000")
        }
    }

    fn context(dir: &TempDir) -> RunContext {
        let store = Store::open(&dir.path().join("movies.db")).unwrap();
        RunContext::new(store, vec![PathBuf::from("/lib")]).with_clock(Box::new(TickingClock(Cell::new(0))))
    }

    fn paths(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(|p| PathBuf::from(*p)).collect()
    }

    #[test]
    fn name_is_cut_at_first_dot() {
        assert_eq!(derive_name(Path::new("/lib/Some.Movie.2021.mkv")), "Some");
        assert_eq!(derive_name(Path::new("/lib/Alien.mkv")), "Alien");
        assert_eq!(derive_name(Path::new("/lib/dir.with.dots/Heat.mkv")), "Heat");
    }

    #[test]
    fn new_items_detected_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let result = reconcile(&ctx, &paths(&["/lib/Y.mkv", "/lib/X.mkv"])).unwrap();

        assert_eq!(result.new_names, vec!["X", "Y"]);
        assert!(result.lost_names.is_empty());
    }

    #[test]
    fn second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let scan = paths(&["/lib/X.mkv", "/lib/Y.mkv"]);

        reconcile(&ctx, &scan).unwrap();
        let count = ctx.store.count().unwrap();
        let second = reconcile(&ctx, &scan).unwrap();

        assert!(second.new_names.is_empty());
        assert!(second.lost_names.is_empty());
        assert_eq!(ctx.store.count().unwrap(), count);
    }

    #[test]
    fn missing_name_is_lost() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/lib/A.mkv", "/lib/B.mkv", "/lib/C.mkv"])).unwrap();
        let result = reconcile(&ctx, &paths(&["/lib/A.mkv", "/lib/C.mkv"])).unwrap();

        assert!(result.new_names.is_empty());
        assert_eq!(result.lost_names, vec!["B"]);
    }

    #[test]
    fn lost_records_stay_recorded() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/lib/A.mkv", "/lib/B.mkv"])).unwrap();
        reconcile(&ctx, &paths(&["/lib/A.mkv"])).unwrap();
        let again = reconcile(&ctx, &paths(&["/lib/A.mkv"])).unwrap();

        assert_eq!(ctx.store.count().unwrap(), 2);
        assert_eq!(again.lost_names, vec!["B"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_separate_records() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let scan = vec![
            PathBuf::from(OsStr::from_bytes(b"/lib/Film\xff.mkv")),
            PathBuf::from(OsStr::from_bytes(b"/lib/Film\xfe.mkv")),
        ];

        let result = reconcile(&ctx, &scan).unwrap();

        assert_eq!(result.new_names.len(), 2);
        assert_eq!(ctx.store.count().unwrap(), 2);
        assert!(reconcile(&ctx, &scan).unwrap().new_names.is_empty());
    }

    #[test]
    fn same_name_on_two_paths_both_persist() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        let result = reconcile(&ctx, &paths(&["/b/Heat.mkv", "/a/Heat.mkv"])).unwrap();

        assert_eq!(result.new_names, vec!["Heat", "Heat"]);
        assert_eq!(ctx.store.count().unwrap(), 2);
    }

    #[test]
    fn move_keeping_name_is_not_lost() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/old/Heat.mkv"])).unwrap();
        let result = reconcile(&ctx, &paths(&["/new/Heat.mkv"])).unwrap();

        assert_eq!(result.new_names, vec!["Heat"]);
        assert!(result.lost_names.is_empty());
    }

    #[test]
    fn rename_is_one_loss_and_one_addition() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/lib/Heat.mkv"])).unwrap();
        let result = reconcile(&ctx, &paths(&["/lib/Heat1995.mkv"])).unwrap();

        assert_eq!(result.new_names, vec!["Heat1995"]);
        assert_eq!(result.lost_names, vec!["Heat"]);
    }

    #[test]
    fn lost_name_is_reported_once() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/a/Heat.mkv", "/b/Heat.mkv", "/a/Ran.mkv"])).unwrap();
        let result = reconcile(&ctx, &paths(&["/a/Ran.mkv"])).unwrap();

        assert_eq!(result.lost_names, vec!["Heat"]);
    }

    #[test]
    fn first_seen_comes_from_the_clock_in_path_order() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        reconcile(&ctx, &paths(&["/lib/B.mkv", "/lib/A.mkv"])).unwrap();

        let records = ctx.store.list_records().unwrap();
        assert_eq!(records[0].name, "A");
        assert_eq!(records[0].first_seen, "2021-01-01 00:00:00.000000");
        assert_eq!(records[1].name, "B");
        assert_eq!(records[1].first_seen, "2021-01-01 00:00:01.000000");
    }

    #[test]
    fn processing_order_is_string_order() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);

        // ' ' sorts before '/', so the spaced directory comes first
        let result = reconcile(&ctx, &paths(&["/a/Up.mkv", "/a b/Ran.mkv"])).unwrap();

        assert_eq!(result.new_names, vec!["Ran", "Up"]);
    }
}
