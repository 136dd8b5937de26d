//! Loading the full document behind an index entry.
//!
//! The index itself only carries `{type, filepath}`; callers that need the
//! document contents resolve the entry and re-read the file here. Unlike
//! the build pipeline, a read failure at this layer is a real error: the
//! caller asked for a specific document.

use crate::error::Result;
use crate::frontmatter;
use crate::index::{ContentIndex, IndexEntry};

/// A loaded document: its complete metadata block plus the trimmed body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Every key-value pair of the metadata block, not just the two the
    /// index recognizes.
    pub metadata: serde_yaml::Mapping,
    /// Document body with surrounding whitespace trimmed.
    pub content: String,
}

/// Reads and splits the file behind `entry`.
///
/// A document without a metadata block yields an empty mapping and the
/// whole file as body.
pub async fn load_document(entry: &IndexEntry) -> Result<Document> {
    let bytes = tokio::fs::read(&entry.filepath).await?;
    let text = String::from_utf8_lossy(&bytes);
    let document = match frontmatter::split_document(&text) {
        Some((block, body)) => Document {
            metadata: serde_yaml::from_str(block).unwrap_or_else(|err| {
                tracing::debug!("malformed metadata block in {}: {err}", entry.filepath);
                serde_yaml::Mapping::new()
            }),
            content: body.trim().to_string(),
        },
        None => Document {
            metadata: serde_yaml::Mapping::new(),
            content: text.trim().to_string(),
        },
    };
    Ok(document)
}

/// Resolves `id` in the index and loads its document, but only when the
/// stored type tag matches `type_tag`. A missing id or a tag mismatch is
/// `Ok(None)`, not an error.
pub async fn load_typed(
    index: &ContentIndex,
    id: &str,
    type_tag: &str,
) -> Result<Option<Document>> {
    match index.lookup(id, type_tag) {
        Some(entry) => load_document(entry).await.map(Some),
        None => Ok(None),
    }
}
