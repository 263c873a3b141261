use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Platform key used for files without a platform suffix.
pub const GENERIC_PLATFORM: &str = "g";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSignature {
    pub size: u64,
    pub mtime_ms: u64,
}

impl FileSignature {
    pub fn new(size: u64, mtime_ms: u64) -> Self {
        Self { size, mtime_ms }
    }

    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            size: metadata.len(),
            mtime_ms,
        }
    }
}

/// One indexed file: its modification signature, the module identity it
/// declares (if any), and the dependency identifiers it references, as
/// written in source and unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub signature: FileSignature,
    pub module_id: Option<String>,
    pub platform: Option<String>,
    pub dependencies: Vec<String>,
}

impl FileRecord {
    pub fn new(path: PathBuf, signature: FileSignature) -> Self {
        Self {
            path,
            signature,
            module_id: None,
            platform: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_module_id(mut self, module_id: String) -> Self {
        self.module_id = Some(module_id);
        self
    }

    pub fn with_platform(mut self, platform: Option<String>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Platform key this record occupies in the module map.
    pub fn platform_key(&self) -> &str {
        self.platform.as_deref().unwrap_or(GENERIC_PLATFORM)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    CrawlError,
    ReadError,
    ParseError,
    CacheError,
    ModuleCollision,
}

/// A non-fatal problem accumulated during a build. Builds succeed with
/// diagnostics attached; only a missing root aborts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: PathBuf, message: String) -> Self {
        Self {
            kind,
            path,
            message,
        }
    }

    pub fn collision(module_id: &str, platform: &str, winner: &Path, loser: &Path) -> Self {
        Self {
            kind: DiagnosticKind::ModuleCollision,
            path: loser.to_path_buf(),
            message: format!(
                "module '{}' (platform '{}') already provided by {}; ignoring {}",
                module_id,
                platform,
                winner.display(),
                loser.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BuildStats {
    pub files_crawled: usize,
    pub files_extracted: usize,
    pub files_reused: usize,
    pub duration_ms: u64,
}

/// The built artifact: every file record plus the module map. Immutable
/// once assembled; all accessors are reads, so snapshots can be shared
/// across threads freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasteIndex {
    records: BTreeMap<PathBuf, FileRecord>,
    module_map: BTreeMap<String, BTreeMap<String, PathBuf>>,
    diagnostics: Vec<Diagnostic>,
    stats: BuildStats,
}

impl HasteIndex {
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.records.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    pub fn record(&self, path: &Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn dependencies_of(&self, path: &Path) -> Option<&[String]> {
        self.records.get(path).map(|r| r.dependencies.as_slice())
    }

    pub fn module_name(&self, path: &Path) -> Option<&str> {
        self.records.get(path)?.module_id.as_deref()
    }

    /// Resolve a module identity to the file providing it. A
    /// platform-specific entry shadows the generic one; passing `None`
    /// (or a platform with no specific file) falls back to generic.
    pub fn resolve(&self, module_id: &str, platform: Option<&str>) -> Option<&Path> {
        let variants = self.module_map.get(module_id)?;
        if let Some(platform) = platform {
            if let Some(path) = variants.get(platform) {
                return Some(path.as_path());
            }
        }
        variants.get(GENERIC_PLATFORM).map(PathBuf::as_path)
    }

    /// All (module identity, platform key, path) entries in lexical order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &str, &Path)> {
        self.module_map.iter().flat_map(|(module_id, variants)| {
            variants
                .iter()
                .map(move |(platform, path)| (module_id.as_str(), platform.as_str(), path.as_path()))
        })
    }

    pub fn match_files(&self, pattern: &Regex) -> Vec<&Path> {
        self.records
            .keys()
            .filter(|path| pattern.is_match(&path.to_string_lossy()))
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn collisions(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::ModuleCollision)
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

/// Assembles the immutable index from merged file records. Records are
/// keyed by path, so insertion order never affects the result; the module
/// map is derived in lexical path order and the first claimant of an
/// (identity, platform) slot wins, which makes collision precedence
/// reproducible across runs.
pub struct IndexAssembler {
    records: BTreeMap<PathBuf, FileRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl IndexAssembler {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: FileRecord) {
        self.records.insert(record.path.clone(), record);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn build(self, stats: BuildStats) -> HasteIndex {
        let IndexAssembler {
            records,
            mut diagnostics,
        } = self;

        let mut module_map: BTreeMap<String, BTreeMap<String, PathBuf>> = BTreeMap::new();
        for record in records.values() {
            let Some(module_id) = record.module_id.as_deref() else {
                continue;
            };
            let platform = record.platform_key();
            let variants = module_map.entry(module_id.to_string()).or_default();
            match variants.get(platform) {
                Some(winner) => {
                    let diagnostic =
                        Diagnostic::collision(module_id, platform, winner, &record.path);
                    log::warn!("{}", diagnostic.message);
                    diagnostics.push(diagnostic);
                }
                None => {
                    variants.insert(platform.to_string(), record.path.clone());
                }
            }
        }

        HasteIndex {
            records,
            module_map,
            diagnostics,
            stats,
        }
    }
}

impl Default for IndexAssembler {
    fn default() -> Self {
        Self::new()
    }
}
