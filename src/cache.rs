use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::HasteConfig;
use crate::core::{Diagnostic, DiagnosticKind, FileRecord};

/// Bumped whenever the serialized layout changes; entries written by any
/// other format are discarded on load.
pub const CACHE_FORMAT_VERSION: u32 = 1;

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Serialized snapshot of a finished build: every file record keyed by
/// path, stamped with the writer's version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub version: String,
    pub format: u32,
    pub built_at_ms: u64,
    pub records: BTreeMap<PathBuf, FileRecord>,
}

impl CacheEntry {
    pub fn new(records: BTreeMap<PathBuf, FileRecord>) -> Self {
        let built_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: CACHE_FORMAT_VERSION,
            built_at_ms,
            records,
        }
    }

    fn is_compatible(&self) -> bool {
        self.version == env!("CARGO_PKG_VERSION") && self.format == CACHE_FORMAT_VERSION
    }
}

/// Outcome of a cache read. An absent file and a version-skewed entry
/// are routine and simply mean a full build; a corrupt file is handed
/// back as a diagnostic so the build can report it.
#[derive(Debug)]
pub enum CacheLoad {
    Hit(CacheEntry),
    Miss,
    Corrupt(Diagnostic),
}

impl CacheLoad {
    pub fn entry(self) -> Option<CacheEntry> {
        match self {
            CacheLoad::Hit(entry) => Some(entry),
            _ => None,
        }
    }
}

/// On-disk cache for one map configuration. A cache miss of any kind
/// (absent, unreadable, corrupt, written by another version) degrades to
/// a full rebuild; it never fails the build.
pub struct HasteCache {
    path: PathBuf,
}

impl HasteCache {
    pub fn for_config(config: &HasteConfig) -> Self {
        Self {
            path: config.cache_file_path(),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the previous build, if a usable one exists.
    pub fn load(&self) -> CacheLoad {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no cache at {}", self.path.display());
                return CacheLoad::Miss;
            }
            Err(err) => {
                log::warn!("unreadable cache {}: {err}", self.path.display());
                return CacheLoad::Corrupt(Diagnostic::new(
                    DiagnosticKind::CacheError,
                    self.path.clone(),
                    format!("unreadable cache, rebuilding: {err}"),
                ));
            }
        };
        let entry: CacheEntry = match bincode::deserialize(&data) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("discarding corrupt cache {}: {err}", self.path.display());
                return CacheLoad::Corrupt(Diagnostic::new(
                    DiagnosticKind::CacheError,
                    self.path.clone(),
                    format!("corrupt cache discarded, rebuilding: {err}"),
                ));
            }
        };
        if !entry.is_compatible() {
            log::info!(
                "discarding cache {} written by version {} (format {})",
                self.path.display(),
                entry.version,
                entry.format
            );
            return CacheLoad::Miss;
        }
        CacheLoad::Hit(entry)
    }

    /// Write the entry atomically: serialize to a scratch file next to
    /// the destination, then rename over it. Readers either see the old
    /// cache or the new one, never a torn write.
    pub fn store(&self, entry: &CacheEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache directory {}", parent.display()))?;
        }

        let data = bincode::serialize(entry).context("serializing cache entry")?;
        let scratch = scratch_path(&self.path);
        fs::write(&scratch, &data)
            .with_context(|| format!("writing cache scratch file {}", scratch.display()))?;
        if let Err(err) = fs::rename(&scratch, &self.path) {
            let _ = fs::remove_file(&scratch);
            return Err(err).with_context(|| {
                format!("moving cache into place at {}", self.path.display())
            });
        }
        log::debug!(
            "stored {} file records at {}",
            entry.records.len(),
            self.path.display()
        );
        Ok(())
    }
}

// Suffixed with pid and a process-wide counter so concurrent stores,
// even from threads of one process, never share a scratch file.
fn scratch_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "haste-map".to_string());
    let nonce = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        "{}.{}.{}.tmp",
        file_name,
        process::id(),
        nonce
    ))
}
