//! Transient attachment references.
//!
//! An attachment reference names an uploaded object; it is resolved to
//! inline data at dispatch time and discarded after the call. Wire field
//! names (`name`/`type`/`url`) match the client upload contract.

use serde::{Deserialize, Serialize};

/// Reference to an uploaded attachment: display name, MIME type, and the
/// storage locator it can be fetched by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
}

impl AttachmentRef {
    /// Whether this attachment is inlineable media (image or video).
    pub fn is_media(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type.starts_with("video/")
    }
}
