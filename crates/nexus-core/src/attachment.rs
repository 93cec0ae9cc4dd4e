//! Attachment resolution.
//!
//! Converts attachment references into inline content parts for a model
//! call: media (image/video) is fetched from the object store and encoded
//! as a base64 data URL; a fetch failure substitutes a textual placeholder
//! so one bad attachment never aborts the turn.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use nexus_types::attachment::AttachmentRef;
use nexus_types::llm::{ContentPart, MessageContent};

use crate::storage::ObjectStore;

/// Build the current user message's content from typed text plus attachments.
///
/// With no attachments the content stays a plain string. Otherwise the
/// result is an ordered part list: the text first (when non-empty), then one
/// data-URL image part per media attachment in input order. Non-media
/// attachments contribute no part. A failed fetch yields the placeholder
/// part `[Could not load attachment: {name}]` in the attachment's position.
pub async fn resolve_user_content<S: ObjectStore>(
    content: &str,
    attachments: &[AttachmentRef],
    store: &S,
) -> MessageContent {
    if attachments.is_empty() {
        return MessageContent::Text(content.to_string());
    }

    let mut parts = Vec::with_capacity(attachments.len() + 1);
    if !content.is_empty() {
        parts.push(ContentPart::text(content));
    }

    for attachment in attachments {
        if !attachment.is_media() {
            continue;
        }
        match store.fetch(&attachment.url).await {
            Ok(bytes) => {
                let data_url = format!(
                    "data:{};base64,{}",
                    attachment.mime_type,
                    BASE64.encode(&bytes)
                );
                parts.push(ContentPart::image_url(data_url));
            }
            Err(err) => {
                tracing::warn!(
                    attachment = %attachment.name,
                    error = %err,
                    "failed to inline attachment, substituting placeholder"
                );
                parts.push(ContentPart::text(format!(
                    "[Could not load attachment: {}]",
                    attachment.name
                )));
            }
        }
    }

    MessageContent::Parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_types::error::StorageError;
    use std::collections::HashMap;

    struct MapStore {
        objects: HashMap<String, Vec<u8>>,
    }

    impl MapStore {
        fn with(entries: &[(&str, &[u8])]) -> Self {
            Self {
                objects: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_vec()))
                    .collect(),
            }
        }
    }

    impl ObjectStore for MapStore {
        async fn fetch(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
            self.objects
                .get(locator)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(locator.to_string()))
        }
    }

    fn attachment(name: &str, mime: &str, url: &str) -> AttachmentRef {
        AttachmentRef {
            name: name.to_string(),
            mime_type: mime.to_string(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_no_attachments_stays_plain_text() {
        let store = MapStore::with(&[]);
        let content = resolve_user_content("hello", &[], &store).await;
        assert_eq!(content, MessageContent::Text("hello".to_string()));
    }

    #[tokio::test]
    async fn test_media_becomes_data_url_part() {
        let store = MapStore::with(&[("uploads/cat.png", b"png-bytes")]);
        let atts = vec![attachment("cat.png", "image/png", "uploads/cat.png")];
        let content = resolve_user_content("look at my cat", &atts, &store).await;

        let MessageContent::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], ContentPart::text("look at my cat"));
        let ContentPart::ImageUrl { image_url } = &parts[1] else {
            panic!("expected image part");
        };
        assert!(image_url.url.starts_with("data:image/png;base64,"));
        // Decodes back to the original bytes.
        let payload = image_url.url.split(',').nth(1).unwrap();
        assert_eq!(BASE64.decode(payload).unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn test_failed_fetch_substitutes_placeholder() {
        let store = MapStore::with(&[]);
        let atts = vec![attachment("lost.png", "image/png", "uploads/lost.png")];
        let content = resolve_user_content("hi", &atts, &store).await;

        let MessageContent::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[1],
            ContentPart::text("[Could not load attachment: lost.png]")
        );
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let store = MapStore::with(&[("ok.jpg", b"jpeg")]);
        let atts = vec![
            attachment("gone.png", "image/png", "missing.png"),
            attachment("ok.jpg", "image/jpeg", "ok.jpg"),
        ];
        let content = resolve_user_content("both", &atts, &store).await;

        let MessageContent::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[1],
            ContentPart::text("[Could not load attachment: gone.png]")
        );
        assert!(matches!(parts[2], ContentPart::ImageUrl { .. }));
    }

    #[tokio::test]
    async fn test_non_media_contributes_no_part() {
        let store = MapStore::with(&[("doc.pdf", b"pdf")]);
        let atts = vec![attachment("doc.pdf", "application/pdf", "doc.pdf")];
        let content = resolve_user_content("read this", &atts, &store).await;

        let MessageContent::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts, vec![ContentPart::text("read this")]);
    }

    #[tokio::test]
    async fn test_empty_text_with_media_omits_text_part() {
        let store = MapStore::with(&[("a.png", b"x")]);
        let atts = vec![attachment("a.png", "image/png", "a.png")];
        let content = resolve_user_content("", &atts, &store).await;

        let MessageContent::Parts(parts) = content else {
            panic!("expected parts");
        };
        assert_eq!(parts.len(), 1);
        assert!(matches!(parts[0], ContentPart::ImageUrl { .. }));
    }
}
