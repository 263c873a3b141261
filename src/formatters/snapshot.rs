use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::HasteIndex;

/// Plain-text dump of the index, one `path|dep1|dep2` line per file in
/// lexical path order. Byte-identical across builds of the same tree,
/// which makes it usable as a golden snapshot.
pub struct SnapshotFormatter;

impl SnapshotFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, index: &HasteIndex) -> String {
        let mut output = String::new();
        for record in index.records() {
            output.push_str(&record.path.to_string_lossy());
            // The separator is always present, so a file with no
            // dependencies still renders as `path|`.
            output.push('|');
            output.push_str(&record.dependencies.join("|"));
            output.push('\n');
        }
        output
    }

    pub fn format_to_file(&self, index: &HasteIndex, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(index))
            .with_context(|| format!("writing snapshot to {}", output_path.display()))?;
        Ok(())
    }

    /// Write the snapshot only when no file exists at `output_path` yet.
    /// Returns whether a write happened.
    pub fn write_if_absent(&self, index: &HasteIndex, output_path: &Path) -> Result<bool> {
        if output_path.exists() {
            log::debug!("snapshot {} already present, skipping", output_path.display());
            return Ok(false);
        }
        self.format_to_file(index, output_path)?;
        Ok(true)
    }
}

impl Default for SnapshotFormatter {
    fn default() -> Self {
        Self::new()
    }
}
