pub mod builder;
pub mod crawler;
pub mod index;

pub use builder::{CancelToken, HasteMapBuilder};
pub use crawler::{CandidateFile, CrawlOutcome, FileCrawler};
pub use index::{
    BuildStats, Diagnostic, DiagnosticKind, FileRecord, FileSignature, HasteIndex, IndexAssembler,
    GENERIC_PLATFORM,
};
