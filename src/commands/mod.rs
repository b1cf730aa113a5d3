//! Command entry points used by the `ghrn` binary.

pub mod config;
mod notes;
mod output;

pub use notes::{Output, View, breaking, notes, run};
