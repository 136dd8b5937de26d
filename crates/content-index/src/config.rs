//! Build configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::index::MergePolicy;

/// Default root content directory.
pub const DEFAULT_ROOT: &str = "content";

/// Default file extension filter.
pub const DEFAULT_EXTENSION: &str = "md";

/// Configuration for one index build.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Root directory scanned for candidate files.
    pub root: PathBuf,
    /// File extension to match (without the leading dot).
    pub extension: String,
    /// How duplicate identifiers are resolved.
    pub policy: MergePolicy,
    /// Maximum number of file reads in flight at once.
    ///
    /// `None` preserves the source behavior of one unbounded task per file.
    pub max_in_flight: Option<usize>,
    /// Per-file read timeout. A read that exceeds it degrades to an
    /// empty-fields record instead of stalling the whole aggregation.
    pub read_timeout: Option<Duration>,
}

impl IndexConfig {
    /// Creates a configuration for the given root with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            policy: MergePolicy::default(),
            max_in_flight: None,
            read_timeout: None,
        }
    }

    /// Sets the file extension filter.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the merge policy for duplicate identifiers.
    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Caps the number of concurrent file reads.
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    /// Sets the per-file read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}
