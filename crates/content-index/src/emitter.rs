//! JSON serialization of the finished index.

use std::io::Write;

use crate::error::{IndexError, Result};
use crate::index::ContentIndex;

/// Serializes the index to a JSON object keyed by identifier.
///
/// Entries appear in identifier order and none are omitted; an empty
/// index serializes as `{}`.
pub fn to_json(index: &ContentIndex, pretty: bool) -> Result<String> {
    let serialized = if pretty {
        serde_json::to_string_pretty(index)
    } else {
        serde_json::to_string(index)
    };
    serialized.map_err(|err| IndexError::Serialization(err.to_string()))
}

/// Serializes the index and writes it to `sink` as a single unit, followed
/// by a newline.
///
/// Serialization or write failure is fatal to the run; there is no
/// partial-output mode.
pub fn emit<W: Write>(index: &ContentIndex, pretty: bool, sink: &mut W) -> Result<()> {
    let mut payload = to_json(index, pretty)?;
    payload.push('\n');
    sink.write_all(payload.as_bytes())?;
    Ok(())
}
