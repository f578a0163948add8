use std::io::Write;
use std::path::Path;

use anyhow::Context;

/// Write the final text to `destination`, or stdout when there is none.
pub fn emit(bytes: &[u8], destination: Option<&Path>) -> anyhow::Result<()> {
    match destination {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")
        }
    }
}
