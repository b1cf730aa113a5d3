use anyhow::Result;
use log::info;
use std::path::Path;

use crate::runtime::Runtime;

/// Print `text`, or write it to `path` (creating parent directories).
pub(super) fn emit<R: Runtime>(runtime: &R, text: &str, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return runtime.print(text);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !runtime.exists(parent) {
            runtime.create_dir_all(parent)?;
        }
    }

    runtime.write(path, text.as_bytes())?;
    info!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}
