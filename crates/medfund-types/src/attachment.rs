use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A supporting document registered by reference.
///
/// The document itself lives off-ledger; the ledger keeps its id and the
/// hash of its content so the copy held by a verifier can be checked.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(alias = "md5")]
    pub content_hash: String,
}

impl Attachment {
    pub fn new(id: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content_hash: content_hash.into(),
        }
    }
}

/// Decode a JSON attachment list such as
/// `[{"id": "scan-1", "md5": "a3f0..."}]`.
///
/// An empty argument decodes to an empty list. Entries with a blank id or
/// content hash are rejected.
pub fn parse_attachments(json: &str) -> Result<Vec<Attachment>, TypeError> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let attachments: Vec<Attachment> =
        serde_json::from_str(json).map_err(|e| TypeError::InvalidAttachments(e.to_string()))?;
    for (index, attachment) in attachments.iter().enumerate() {
        if attachment.id.trim().is_empty() {
            return Err(TypeError::InvalidAttachments(format!(
                "entry {index} has an empty id"
            )));
        }
        if attachment.content_hash.trim().is_empty() {
            return Err(TypeError::InvalidAttachments(format!(
                "entry {index} has an empty content hash"
            )));
        }
    }
    Ok(attachments)
}
