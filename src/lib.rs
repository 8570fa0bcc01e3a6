//! JobTrail core: record stores for a personal job-search tracker.
//!
//! Two independent variants share the model types: a flat-file store
//! (tasks + job applications as pipe-delimited text) fronted by the
//! `commands` layer for a web shell, and a SQLite store with per-record
//! document folders fronted by [`JobBoard`] for a desktop shell.

pub mod board;
pub mod commands;
pub mod db;
pub mod docs;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

pub use board::JobBoard;
pub use db::{JobStore, StoreError};
pub use models::{JobApplication, JobRecord, JobStatus, RecordId, Task};
pub use state::TrackerState;
pub use storage::{Storage, StorageError};
