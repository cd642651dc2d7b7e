//! Run-level error taxonomy.
//!
//! Each layer owns its error enum; `RunError` aggregates the fatal ones and
//! maps every failure state to a distinct process exit code.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lock::LockError;
use crate::report::ReportError;
use crate::store::StoreError;

pub const EXIT_NO_ROOTS: i32 = 2;
pub const EXIT_NO_MEDIA: i32 = 3;
pub const EXIT_TRAVERSAL: i32 = 4;
pub const EXIT_STORE_UNAVAILABLE: i32 = 5;
pub const EXIT_LOCKED: i32 = 6;
pub const EXIT_REPORT: i32 = 7;
pub const EXIT_STORE: i32 = 8;
pub const EXIT_NOT_FOUND: i32 = 9;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not find any media files, there's nothing else to do")]
    NoMedia,

    #[error("none of the {failed} library root(s) could be traversed")]
    Traversal { failed: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(ConfigError::NoRoots) => EXIT_NO_ROOTS,
            // an unreadable config leaves us with no usable roots either
            RunError::Config(_) => EXIT_NO_ROOTS,
            RunError::NoMedia => EXIT_NO_MEDIA,
            RunError::Traversal { .. } => EXIT_TRAVERSAL,
            RunError::Store(StoreError::Unavailable { .. }) => EXIT_STORE_UNAVAILABLE,
            RunError::Store(_) => EXIT_STORE,
            RunError::Lock(LockError::Held { .. }) => EXIT_LOCKED,
            // the inventory location itself is unusable
            RunError::Lock(_) => EXIT_STORE_UNAVAILABLE,
            RunError::Report(_) => EXIT_REPORT,
        }
    }
}
