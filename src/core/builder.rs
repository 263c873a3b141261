use anyhow::{bail, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{CacheEntry, CacheLoad, HasteCache};
use crate::config::HasteConfig;
use crate::core::crawler::{CandidateFile, FileCrawler};
use crate::core::index::{
    BuildStats, Diagnostic, DiagnosticKind, FileRecord, HasteIndex, IndexAssembler,
};
use crate::extract;

/// Cooperative cancellation flag shared between the caller and a running
/// build. Cancellation is all-or-nothing: a cancelled build returns an
/// error and no index.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Runs the crawl / extract / assemble pipeline for one configuration.
/// With a cache attached, extraction is limited to files whose signature
/// changed since the previous build; everything else is carried over.
pub struct HasteMapBuilder {
    config: HasteConfig,
    cache: Option<HasteCache>,
}

impl HasteMapBuilder {
    pub fn new(config: HasteConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Attach the persistent cache at the config-derived path.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(HasteCache::for_config(&self.config));
        self
    }

    pub fn cache_path(&self) -> Option<&Path> {
        self.cache.as_ref().map(HasteCache::path)
    }

    pub fn config(&self) -> &HasteConfig {
        &self.config
    }

    pub fn build(&self) -> Result<HasteIndex> {
        self.build_with_cancel(&CancelToken::new())
    }

    pub fn build_with_cancel(&self, cancel: &CancelToken) -> Result<HasteIndex> {
        self.config.validate()?;
        if cancel.is_cancelled() {
            bail!("build cancelled");
        }
        let started = Instant::now();

        let mut diagnostics = Vec::new();
        let prior = match self.cache.as_ref().map(HasteCache::load) {
            Some(CacheLoad::Hit(entry)) => entry.records,
            Some(CacheLoad::Corrupt(diagnostic)) => {
                diagnostics.push(diagnostic);
                BTreeMap::new()
            }
            Some(CacheLoad::Miss) | None => BTreeMap::new(),
        };

        let crawl = FileCrawler::new(&self.config).crawl()?;
        if cancel.is_cancelled() {
            bail!("build cancelled");
        }
        let files_crawled = crawl.files.len();
        diagnostics.extend(crawl.diagnostics);

        // Files whose size and mtime match the previous build keep their
        // cached record; only the rest are read and scanned.
        let mut reused: Vec<FileRecord> = Vec::new();
        let mut to_extract: Vec<CandidateFile> = Vec::new();
        for candidate in crawl.files {
            match prior.get(&candidate.path) {
                Some(record) if record.signature == candidate.signature => {
                    reused.push(record.clone());
                }
                _ => to_extract.push(candidate),
            }
        }
        let files_reused = reused.len();
        let files_extracted = to_extract.len();

        let extracted: Vec<(FileRecord, Vec<Diagnostic>)> = to_extract
            .par_iter()
            .map(|candidate| {
                if cancel.is_cancelled() {
                    return (
                        FileRecord::new(candidate.path.clone(), candidate.signature),
                        Vec::new(),
                    );
                }
                self.extract_file(candidate)
            })
            .collect();
        if cancel.is_cancelled() {
            bail!("build cancelled");
        }

        let mut records: BTreeMap<PathBuf, FileRecord> = BTreeMap::new();
        for record in reused {
            records.insert(record.path.clone(), record);
        }
        for (record, mut file_diagnostics) in extracted {
            diagnostics.append(&mut file_diagnostics);
            records.insert(record.path.clone(), record);
        }

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.store(&CacheEntry::new(records.clone())) {
                log::warn!("failed to persist haste map: {err:#}");
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::CacheError,
                    cache.path().to_path_buf(),
                    format!("{err:#}"),
                ));
            }
        }

        let mut assembler = IndexAssembler::new();
        for record in records.into_values() {
            assembler.add_record(record);
        }
        for diagnostic in diagnostics {
            assembler.add_diagnostic(diagnostic);
        }

        let stats = BuildStats {
            files_crawled,
            files_extracted,
            files_reused,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        log::info!(
            "indexed {} files ({} extracted, {} reused) in {}ms",
            files_crawled,
            files_extracted,
            files_reused,
            stats.duration_ms
        );
        Ok(assembler.build(stats))
    }

    fn extract_file(&self, candidate: &CandidateFile) -> (FileRecord, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut record = FileRecord::new(candidate.path.clone(), candidate.signature)
            .with_platform(self.config.platform_for(&candidate.path));

        let bytes = match fs::read(&candidate.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("cannot read {}: {err}", candidate.path.display());
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ReadError,
                    candidate.path.clone(),
                    err.to_string(),
                ));
                return (record, diagnostics);
            }
        };
        let source = match String::from_utf8(bytes) {
            Ok(source) => source,
            Err(err) => {
                log::warn!(
                    "{} is not valid UTF-8, scanning lossily",
                    candidate.path.display()
                );
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ParseError,
                    candidate.path.clone(),
                    "not valid UTF-8, scanned lossily".to_string(),
                ));
                String::from_utf8_lossy(&err.into_bytes()).into_owned()
            }
        };

        let scanned = extract::scan(&source);
        if let Some(module_id) = scanned.module_id {
            record = record.with_module_id(module_id);
        }
        (record.with_dependencies(scanned.dependencies), diagnostics)
    }
}
