//! Terminal-free core of perch.
//!
//! Everything that decides *what* the dashboard shows lives here: diff line
//! classification, the ANSI text engine, the file registry, preview building,
//! the viewport, and the pure `update` state machine that ties them together.
//! The `perch` binary supplies the terminal, the git backend, and the
//! highlighter through the traits in [`source`].

pub mod ansi;
pub mod diff;
pub mod error;
pub mod preview;
pub mod registry;
pub mod source;
pub mod types;
pub mod update;
pub mod viewport;
pub mod wrap;

pub use error::{Error, Result};
