//! Leading metadata block extraction.
//!
//! Documents may start with a `---`-delimited YAML block:
//!
//! ```text
//! ---
//! id: intro
//! type: page
//! ---
//! body text
//! ```
//!
//! Only the `id` and `type` keys are recognized; everything else in the
//! block is ignored. Absence of the block, a malformed block, or a missing
//! key all degrade to empty strings. Extraction never fails a run.

use serde::Deserialize;

/// Fence marker delimiting the metadata block.
const FENCE: &str = "---";

/// The two recognized fields of a document's metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrontMatter {
    /// The document's declared unique key.
    #[serde(default)]
    pub id: String,
    /// The document's declared classification.
    #[serde(default, rename = "type")]
    pub type_tag: String,
}

/// Extracts the metadata block from raw file bytes.
///
/// Non-UTF-8 content is decoded lossily for the fence scan; anything that
/// fails to parse soft-fails to [`FrontMatter::default`].
pub fn extract_front_matter(content: &[u8]) -> FrontMatter {
    let text = String::from_utf8_lossy(content);
    let Some((block, _)) = split_document(&text) else {
        return FrontMatter::default();
    };
    match serde_yaml::from_str::<FrontMatter>(block) {
        Ok(front_matter) => front_matter,
        Err(err) => {
            tracing::debug!("malformed front matter block: {err}");
            FrontMatter::default()
        }
    }
}

/// Splits a document into its raw metadata block and trailing body.
///
/// Returns `None` when no complete fenced block leads the document. The
/// returned body starts on the line after the closing fence.
pub fn split_document(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix(FENCE)?;
    let end = rest.find("\n---")?;
    let block = &rest[..end];
    let after_fence = &rest[end + 1 + FENCE.len()..];
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => "",
    };
    Some((block, body))
}
