//! Content indexing library.
//!
//! This crate builds an in-memory lookup index over a directory tree of
//! front-matter documents: it discovers matching files, extracts the
//! declared identifier and type tag from each file's leading metadata
//! block, and produces an identifier-keyed mapping to `{type, filepath}`.
//!
//! ## Module Structure
//!
//! - `builder` - Concurrent file tasks, aggregation, and index construction
//! - `config` - Build configuration (root, extension, policy, limits)
//! - `document` - Loading the full document behind an index entry
//! - `emitter` - JSON serialization of the finished index
//! - `error` - Error types
//! - `frontmatter` - Leading metadata block extraction
//! - `index` - The identifier-keyed index and its merge policies
//! - `scanner` - Candidate file discovery

pub mod builder;
pub mod config;
pub mod document;
pub mod emitter;
pub mod error;
pub mod frontmatter;
pub mod index;
pub mod scanner;

// Re-export main types
pub use builder::{BuildOutput, BuildReport, Collision, FileRecord, IndexBuilder};
pub use config::IndexConfig;
pub use document::Document;
pub use error::{IndexError, Result};
pub use frontmatter::FrontMatter;
pub use index::{ContentIndex, IndexEntry, MergePolicy};
