//! Concurrent file tasks, aggregation, and index construction.
//!
//! The build pipeline: discover candidate paths, spawn one task per path,
//! wait for every task to report a record over the fan-in channel, then
//! fold the records into the index under the configured merge policy.
//!
//! Per-file failures never cross the task boundary as errors; an
//! unreadable or timed-out file reports a record with empty fields, so a
//! run with N candidates always collects exactly N records.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};

use crate::config::IndexConfig;
use crate::error::{IndexError, Result};
use crate::frontmatter;
use crate::index::{ContentIndex, IndexEntry, MergePolicy};
use crate::scanner;

/// One discovered document, produced exactly once per candidate path.
///
/// `path` is always populated; `id` and `type_tag` are empty when the file
/// was unreadable or carried no usable metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub type_tag: String,
    pub path: PathBuf,
}

impl FileRecord {
    fn empty(path: PathBuf) -> Self {
        Self {
            id: String::new(),
            type_tag: String::new(),
            path,
        }
    }
}

/// A duplicate identifier observed while folding records into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub id: String,
    /// Source path of the record that stayed in the index.
    pub kept: PathBuf,
    /// Source path of the record the policy discarded.
    pub discarded: PathBuf,
}

/// Counters and warnings from one index build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Number of candidate paths discovered (and records collected).
    pub scanned: usize,
    /// Number of entries in the finished index.
    pub indexed: usize,
    /// Records that degraded to an empty identifier (unreadable file,
    /// missing or malformed metadata).
    pub soft_failures: usize,
    /// Duplicate identifiers resolved by the merge policy.
    pub collisions: Vec<Collision>,
}

/// A finished index together with its build report.
#[derive(Debug)]
pub struct BuildOutput {
    pub index: ContentIndex,
    pub report: BuildReport,
}

/// Builds a [`ContentIndex`] from the files under a configured root.
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline: discover, read concurrently, aggregate.
    ///
    /// Fails only on a duplicate identifier under
    /// [`MergePolicy::ErrorOnConflict`]; every per-file condition is
    /// normalized into an empty-fields record.
    pub async fn build(&self) -> Result<BuildOutput> {
        let candidates = scanner::discover_files(&self.config.root, &self.config.extension);
        let records = collect_records(
            &candidates,
            self.config.max_in_flight,
            self.config.read_timeout,
        )
        .await;
        fold_records(records, self.config.policy, candidates.len())
    }
}

/// Spawns one task per candidate and receives exactly one record back for
/// each, in completion order.
async fn collect_records(
    candidates: &BTreeSet<PathBuf>,
    max_in_flight: Option<usize>,
    read_timeout: Option<Duration>,
) -> Vec<FileRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let semaphore = max_in_flight.map(|limit| Arc::new(Semaphore::new(limit.max(1))));

    for path in candidates {
        spawn_record_task(path.clone(), tx.clone(), semaphore.clone(), read_timeout);
    }
    drop(tx);

    let mut records = Vec::with_capacity(candidates.len());
    while let Some(record) = rx.recv().await {
        records.push(record);
    }
    records
}

/// Spawns the task for one candidate path. The task always sends exactly
/// one record, whatever happens to the read.
fn spawn_record_task(
    path: PathBuf,
    tx: mpsc::UnboundedSender<FileRecord>,
    semaphore: Option<Arc<Semaphore>>,
    read_timeout: Option<Duration>,
) {
    tokio::spawn(async move {
        let _permit = match semaphore {
            Some(semaphore) => semaphore.acquire_owned().await.ok(),
            None => None,
        };
        let record = read_record(path, read_timeout).await;
        let _ = tx.send(record);
    });
}

/// Reads one file and extracts its metadata, degrading every failure to
/// an empty-fields record.
async fn read_record(path: PathBuf, read_timeout: Option<Duration>) -> FileRecord {
    let read = tokio::fs::read(&path);
    let outcome = match read_timeout {
        Some(limit) => match tokio::time::timeout(limit, read).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!("read timed out after {limit:?}: {}", path.display());
                return FileRecord::empty(path);
            }
        },
        None => read.await,
    };

    match outcome {
        Ok(bytes) => {
            let metadata = frontmatter::extract_front_matter(&bytes);
            FileRecord {
                id: metadata.id,
                type_tag: metadata.type_tag,
                path,
            }
        }
        Err(err) => {
            tracing::debug!("unreadable candidate {}: {err}", path.display());
            FileRecord::empty(path)
        }
    }
}

/// Folds collected records into the index under the merge policy.
///
/// The deterministic policies sort records by source path first, so task
/// completion order never influences their outcome. `LastWins` keeps
/// arrival order on purpose (source-compatible, non-deterministic under
/// collisions).
fn fold_records(
    mut records: Vec<FileRecord>,
    policy: MergePolicy,
    scanned: usize,
) -> Result<BuildOutput> {
    if policy != MergePolicy::LastWins {
        records.sort_by(|a, b| a.path.cmp(&b.path));
    }

    let mut index = ContentIndex::new();
    let mut report = BuildReport {
        scanned,
        ..Default::default()
    };

    for record in records {
        if record.id.is_empty() {
            report.soft_failures += 1;
        }
        let entry = IndexEntry {
            type_tag: record.type_tag,
            filepath: record.path.to_string_lossy().into_owned(),
        };
        match policy {
            MergePolicy::LastWins => {
                if let Some(previous) = index.insert(record.id.clone(), entry) {
                    report.collisions.push(Collision {
                        id: record.id,
                        kept: record.path,
                        discarded: PathBuf::from(previous.filepath),
                    });
                }
            }
            MergePolicy::FirstWins => {
                if let Some(existing) = index.get(&record.id) {
                    report.collisions.push(Collision {
                        id: record.id,
                        kept: PathBuf::from(existing.filepath.clone()),
                        discarded: record.path,
                    });
                } else {
                    index.insert(record.id, entry);
                }
            }
            MergePolicy::ErrorOnConflict => {
                if record.id.is_empty() {
                    // Soft failures are not authored conflicts.
                    index.insert(record.id, entry);
                } else if let Some(existing) = index.get(&record.id) {
                    return Err(IndexError::DuplicateIdentifier {
                        id: record.id,
                        first: PathBuf::from(existing.filepath.clone()),
                        second: record.path,
                    });
                } else {
                    index.insert(record.id, entry);
                }
            }
        }
    }

    for collision in &report.collisions {
        tracing::warn!(
            "duplicate identifier {:?}: kept {}, discarded {}",
            collision.id,
            collision.kept.display(),
            collision.discarded.display()
        );
    }

    report.indexed = index.len();
    Ok(BuildOutput { index, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, type_tag: &str, path: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            type_tag: type_tag.to_string(),
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_fold_without_collisions() {
        let records = vec![
            record("a", "page", "content/a.md"),
            record("b", "unit", "content/b.md"),
        ];
        let output = fold_records(records, MergePolicy::LastWins, 2).unwrap();
        assert_eq!(output.index.len(), 2);
        assert_eq!(output.report.scanned, 2);
        assert_eq!(output.report.indexed, 2);
        assert_eq!(output.report.soft_failures, 0);
        assert!(output.report.collisions.is_empty());
    }

    #[test]
    fn test_last_wins_keeps_later_arrival() {
        let records = vec![
            record("doc-1", "page", "content/first.md"),
            record("doc-1", "unit", "content/second.md"),
        ];
        let output = fold_records(records, MergePolicy::LastWins, 2).unwrap();
        assert_eq!(output.index.len(), 1);
        let entry = output.index.get("doc-1").unwrap();
        assert_eq!(entry.filepath, "content/second.md");
        assert_eq!(entry.type_tag, "unit");
        assert_eq!(output.report.collisions.len(), 1);
        assert_eq!(
            output.report.collisions[0].discarded,
            PathBuf::from("content/first.md")
        );
    }

    #[test]
    fn test_first_wins_is_path_ordered_not_arrival_ordered() {
        // Arrival order says z.md first; the stable tiebreak says a.md wins.
        let records = vec![
            record("doc-1", "unit", "content/z.md"),
            record("doc-1", "page", "content/a.md"),
        ];
        let output = fold_records(records, MergePolicy::FirstWins, 2).unwrap();
        let entry = output.index.get("doc-1").unwrap();
        assert_eq!(entry.filepath, "content/a.md");
        assert_eq!(output.report.collisions.len(), 1);
        assert_eq!(output.report.collisions[0].kept, PathBuf::from("content/a.md"));
        assert_eq!(
            output.report.collisions[0].discarded,
            PathBuf::from("content/z.md")
        );
    }

    #[test]
    fn test_error_on_conflict_names_both_paths() {
        let records = vec![
            record("doc-1", "page", "content/b.md"),
            record("doc-1", "page", "content/a.md"),
        ];
        let err = fold_records(records, MergePolicy::ErrorOnConflict, 2).unwrap_err();
        match err {
            IndexError::DuplicateIdentifier { id, first, second } => {
                assert_eq!(id, "doc-1");
                assert_eq!(first, PathBuf::from("content/a.md"));
                assert_eq!(second, PathBuf::from("content/b.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_on_conflict_exempts_empty_identifiers() {
        let records = vec![
            record("", "", "content/broken-a.md"),
            record("", "", "content/broken-b.md"),
            record("doc-1", "page", "content/doc.md"),
        ];
        let output = fold_records(records, MergePolicy::ErrorOnConflict, 3).unwrap();
        assert_eq!(output.index.len(), 2);
        assert_eq!(output.report.soft_failures, 2);
    }

    #[test]
    fn test_empty_identifiers_collapse_to_one_key() {
        let records = vec![
            record("", "", "content/one.md"),
            record("", "", "content/two.md"),
        ];
        let output = fold_records(records, MergePolicy::LastWins, 2).unwrap();
        assert_eq!(output.index.len(), 1);
        assert!(output.index.get("").is_some());
        assert_eq!(output.report.soft_failures, 2);
        assert_eq!(output.report.collisions.len(), 1);
    }

    #[tokio::test]
    async fn test_collect_records_returns_one_record_per_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let mut candidates = BTreeSet::new();
        for i in 0..20 {
            let path = dir.path().join(format!("doc-{i}.md"));
            std::fs::write(&path, format!("---\nid: doc-{i}\ntype: page\n---\n")).unwrap();
            candidates.insert(path);
        }
        // A candidate that vanished between discovery and read.
        candidates.insert(dir.path().join("ghost.md"));

        let records = collect_records(&candidates, None, None).await;
        assert_eq!(records.len(), candidates.len());

        let ghost = records
            .iter()
            .find(|record| record.path.ends_with("ghost.md"))
            .unwrap();
        assert_eq!(ghost.id, "");
        assert_eq!(ghost.type_tag, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_expired_read_timeout_degrades_to_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let readable = dir.path().join("doc.md");
        std::fs::write(&readable, "---\nid: doc\ntype: page\n---\n").unwrap();

        // A FIFO with no writer blocks the read indefinitely.
        let stuck = dir.path().join("stuck.md");
        let status = std::process::Command::new("mkfifo")
            .arg(&stuck)
            .status()
            .unwrap();
        assert!(status.success());

        let mut candidates = BTreeSet::new();
        candidates.insert(readable);
        candidates.insert(stuck);

        let records =
            collect_records(&candidates, None, Some(Duration::from_millis(100))).await;
        assert_eq!(records.len(), 2);

        let timed_out = records
            .iter()
            .find(|record| record.path.ends_with("stuck.md"))
            .unwrap();
        assert_eq!(timed_out.id, "");
        assert_eq!(timed_out.type_tag, "");

        let fine = records
            .iter()
            .find(|record| record.path.ends_with("doc.md"))
            .unwrap();
        assert_eq!(fine.id, "doc");
    }

    #[tokio::test]
    async fn test_collect_records_respects_bounded_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let mut candidates = BTreeSet::new();
        for i in 0..10 {
            let path = dir.path().join(format!("doc-{i}.md"));
            std::fs::write(&path, format!("---\nid: doc-{i}\ntype: page\n---\n")).unwrap();
            candidates.insert(path);
        }

        let records = collect_records(&candidates, Some(2), None).await;
        assert_eq!(records.len(), 10);
    }
}
