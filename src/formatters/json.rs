use anyhow::Result;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::core::HasteIndex;

/// Full JSON dump of the index: file records, the module map, and build
/// statistics. Maps are keyed by path and identity, so output is stable
/// across runs.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn format_to_file(&self, index: &HasteIndex, output_path: &Path) -> Result<()> {
        let json_content = self.format(index)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format(&self, index: &HasteIndex) -> Result<String> {
        let mut files = Map::new();
        for record in index.records() {
            files.insert(
                record.path.to_string_lossy().into_owned(),
                json!({
                    "module": record.module_id,
                    "platform": record.platform,
                    "dependencies": record.dependencies,
                }),
            );
        }

        let mut modules: Map<String, Value> = Map::new();
        for (module_id, platform, path) in index.modules() {
            let variants = modules
                .entry(module_id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(variants) = variants.as_object_mut() {
                variants.insert(
                    platform.to_string(),
                    Value::String(path.to_string_lossy().into_owned()),
                );
            }
        }

        let output = json!({
            "meta": {
                "files": index.len(),
                "modules": modules.len(),
                "stats": index.stats(),
            },
            "files": files,
            "modules": modules,
        });

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(rendered)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
