use anyhow::{bail, Result};
use dashmap::DashSet;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::HasteConfig;
use crate::core::index::{Diagnostic, DiagnosticKind, FileSignature};

/// A file the crawl selected for indexing, with the signature used to
/// decide whether cached extraction results still apply.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub signature: FileSignature,
}

#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub files: Vec<CandidateFile>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct FileCrawler<'a> {
    config: &'a HasteConfig,
}

impl<'a> FileCrawler<'a> {
    pub fn new(config: &'a HasteConfig) -> Self {
        Self { config }
    }

    /// Walk every root and collect matching files. Roots are crawled in
    /// parallel; a shared set of canonicalized directories keeps
    /// overlapping roots and symlink diamonds from being walked twice.
    /// Unreadable entries become diagnostics, a missing root is the one
    /// fatal case.
    pub fn crawl(&self) -> Result<CrawlOutcome> {
        for root in &self.config.roots {
            if !root.is_dir() {
                bail!("root directory {} does not exist", root.display());
            }
        }

        let visited: DashSet<PathBuf> = DashSet::new();
        let per_root: Vec<CrawlOutcome> = self
            .config
            .roots
            .par_iter()
            .map(|root| self.crawl_root(root, &visited))
            .collect();

        let mut outcome = CrawlOutcome::default();
        for mut partial in per_root {
            outcome.files.append(&mut partial.files);
            outcome.diagnostics.append(&mut partial.diagnostics);
        }
        log::debug!(
            "crawl found {} candidate files under {} roots",
            outcome.files.len(),
            self.config.roots.len()
        );
        Ok(outcome)
    }

    fn crawl_root(&self, root: &Path, visited: &DashSet<PathBuf>) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::default();
        let mut walker = WalkDir::new(root).follow_links(true).into_iter();

        loop {
            let entry = match walker.next() {
                None => break,
                Some(Ok(entry)) => entry,
                Some(Err(err)) => {
                    // Symlink cycles are expected in the wild; walkdir
                    // already refuses to descend, nothing to report.
                    if err.loop_ancestor().is_some() {
                        continue;
                    }
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    log::warn!("crawl error at {}: {err}", path.display());
                    outcome.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::CrawlError,
                        path,
                        err.to_string(),
                    ));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                if self.config.is_ignored(entry.path()) {
                    walker.skip_current_dir();
                    continue;
                }
                let canonical = fs::canonicalize(entry.path())
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                if !visited.insert(canonical) {
                    walker.skip_current_dir();
                }
                continue;
            }

            let path = entry.path();
            if !self.config.matches_extension(path) || self.config.is_ignored(path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => outcome.files.push(CandidateFile {
                    path: path.to_path_buf(),
                    signature: FileSignature::from_metadata(&metadata),
                }),
                Err(err) => {
                    log::warn!("cannot stat {}: {err}", path.display());
                    outcome.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::ReadError,
                        path.to_path_buf(),
                        err.to_string(),
                    ));
                }
            }
        }

        outcome
    }
}
