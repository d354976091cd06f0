//! Git integration for perch.
//!
//! [`status::Git2Source`] implements the core `StatusSource` on top of git2.
//! It opens a fresh `git2::Repository` per call because `Repository` is
//! `!Sync` and calls arrive from both the status worker thread and blocking
//! preview tasks. [`worker`] owns the periodic file-list refresh.
pub mod status;
pub mod worker;

pub use status::Git2Source;
