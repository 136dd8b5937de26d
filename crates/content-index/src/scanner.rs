//! Candidate file discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::glob;

/// Enumerates files under `root` whose name ends in `.{extension}`.
///
/// Unions a shallow `root/*.ext` query with a recursive `root/**/*.ext`
/// query; a file matched by both appears once. A missing or unreadable
/// root yields an empty set ("no matches" semantics), never an error.
///
/// The returned set is deduplicated and path-ordered; downstream code
/// must not rely on processing order matching this order.
pub fn discover_files(root: &Path, extension: &str) -> BTreeSet<PathBuf> {
    let mut candidates = BTreeSet::new();

    if !root.is_dir() {
        tracing::debug!("scan root {} is not a directory", root.display());
        return candidates;
    }

    // The root is a literal path, not a pattern; escape it so directories
    // like "content [v2]" are scanned rather than interpreted.
    let root_literal = glob::Pattern::escape(&root.display().to_string());
    let shallow = format!("{root_literal}/*.{extension}");
    let recursive = format!("{root_literal}/**/*.{extension}");

    for pattern in [shallow, recursive] {
        let paths = match glob(&pattern) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!("invalid glob pattern {pattern:?}: {err}");
                continue;
            }
        };
        for entry in paths {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        candidates.insert(path);
                    }
                }
                Err(err) => {
                    tracing::debug!("skipping unreadable path during scan: {err}");
                }
            }
        }
    }

    tracing::debug!(
        "discovered {} candidate file(s) under {}",
        candidates.len(),
        root.display()
    );
    candidates
}
