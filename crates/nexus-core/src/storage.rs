//! ObjectStore trait definition.
//!
//! The read-side contract consumed by the attachment resolver: fetch the raw
//! bytes of an uploaded object by its storage locator. Uploads belong to the
//! external object-storage integration and are not modeled here.

use nexus_types::error::StorageError;

/// Blob-storage collaborator exposing "fetch object bytes by locator".
///
/// Implementations live in nexus-infra (e.g., `LocalObjectStore`).
/// Uses native async fn in traits (RPITIT).
pub trait ObjectStore: Send + Sync {
    /// Fetch the raw bytes of the object at `locator`.
    fn fetch(
        &self,
        locator: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, StorageError>> + Send;
}
