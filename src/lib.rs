//! # hastemap
//!
//! Fast module-identity and dependency indexing for large source trees.
//!
//! A build crawls the configured roots, scans each source file for the
//! module identity it claims and the modules it references, and produces
//! an immutable [`core::HasteIndex`] that answers identity, variant, and
//! dependency queries. Results persist to disk keyed by configuration;
//! later builds re-scan only files whose size or mtime changed.
//!
//! ## Example
//!
//! ```no_run
//! use hastemap::config::HasteConfig;
//! use hastemap::core::HasteMapBuilder;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = HasteConfig::new(vec!["src".into()])
//!     .with_extensions(vec!["js".to_string()]);
//! let index = HasteMapBuilder::new(config).with_cache().build()?;
//! println!("{} files indexed", index.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod extract;
pub mod formatters;
