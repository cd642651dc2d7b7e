pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod lock;
pub mod logging;
pub mod metadata;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod run;
pub mod scan;
pub mod store;
