use anyhow::{bail, Result};
use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::env;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Everything a build needs to know: where to look, what counts as a
/// source file, and where the persistent cache lives. Two configs that
/// derive the same cache file path are interchangeable; anything that
/// changes what a build would index must flow into the path hash.
#[derive(Debug, Clone)]
pub struct HasteConfig {
    pub name: String,
    pub roots: Vec<PathBuf>,
    pub extensions: Vec<String>,
    pub platforms: Vec<String>,
    pub ignore_pattern: Option<Regex>,
    pub cache_dir: PathBuf,
}

impl HasteConfig {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            name: "haste-map".to_string(),
            roots,
            extensions: vec!["js".to_string()],
            platforms: Vec::new(),
            ignore_pattern: None,
            cache_dir: env::temp_dir(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_platforms(mut self, platforms: Vec<String>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_ignore_pattern(mut self, pattern: Regex) -> Self {
        self.ignore_pattern = Some(pattern);
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            bail!("at least one root directory is required");
        }
        if self.extensions.is_empty() {
            bail!("at least one file extension is required");
        }
        if self.name.is_empty() {
            bail!("map name must not be empty");
        }
        Ok(())
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|known| known == e))
            .unwrap_or(false)
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        match &self.ignore_pattern {
            Some(pattern) => pattern.is_match(&path.to_string_lossy()),
            None => false,
        }
    }

    /// Platform variant encoded in the filename, e.g. `Button.ios.js`
    /// yields `ios` when `ios` is a configured platform. Files without a
    /// recognized suffix are generic.
    pub fn platform_for(&self, path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let (_, candidate) = stem.rsplit_once('.')?;
        self.platforms
            .iter()
            .find(|p| p.as_str() == candidate)
            .cloned()
    }

    /// Where the persistent cache for this config lives. Purely derived
    /// from the config and the crate version, so distinct configs never
    /// share a cache file and a version bump invalidates by renaming.
    pub fn cache_file_path(&self) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        env!("CARGO_PKG_VERSION").hash(&mut hasher);
        for root in &self.roots {
            root.to_string_lossy().hash(&mut hasher);
        }
        for extension in &self.extensions {
            extension.hash(&mut hasher);
        }
        for platform in &self.platforms {
            platform.hash(&mut hasher);
        }
        self.ignore_pattern
            .as_ref()
            .map(|p| p.as_str())
            .unwrap_or("")
            .hash(&mut hasher);

        let sanitized: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        self.cache_dir
            .join(format!("haste-map-{}-{:016x}", sanitized, hasher.finish()))
    }
}
