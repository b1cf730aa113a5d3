//! Standard output.

use anyhow::{Context, Result};
use std::io::Write;

use super::RealRuntime;

impl RealRuntime {
    pub(crate) fn print_impl(&self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write to stdout")
    }
}
