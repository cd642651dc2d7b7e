use std::path::{Path, PathBuf};

use crate::store::Store;

/// First-seen timestamps sort lexicographically in chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Source of first-seen timestamps.
pub trait Clock {
    fn now(&self) -> String;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Everything one run needs, passed explicitly into the engine.
pub struct RunContext {
    pub store: Store,
    /// Library roots traversed this run, canonicalized.
    pub roots: Vec<PathBuf>,
    pub clock: Box<dyn Clock>,
}

impl RunContext {
    pub fn new(store: Store, roots: Vec<PathBuf>) -> Self {
        RunContext {
            store,
            roots,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether `path` lies under one of the roots scanned this run.
    pub fn covers(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn covers_only_paths_under_scanned_roots() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("movies.db")).unwrap();
        let ctx = RunContext::new(store, vec![PathBuf::from("/srv/movies")]);

        assert!(ctx.covers(Path::new("/srv/movies/Heat.mkv")));
        assert!(ctx.covers(Path::new("/srv/movies/nested/Ran.mkv")));
        assert!(!ctx.covers(Path::new("/srv/movies2/Alien.mkv")));
        assert!(!ctx.covers(Path::new("/mnt/usb/Up.mkv")));
    }

    #[test]
    fn system_timestamps_sort_chronologically() {
        let earlier = chrono::NaiveDate::from_ymd_opt(2021, 9, 30)
            .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let later = chrono::NaiveDate::from_ymd_opt(2021, 10, 1)
            .and_then(|d| d.and_hms_micro_opt(0, 0, 0, 0))
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();

        assert_eq!(earlier, "2021-09-30 23:59:59.999999");
        assert!(earlier < later);
    }
}
