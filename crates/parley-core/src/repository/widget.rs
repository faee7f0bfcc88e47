//! WidgetConfigRepository trait definition.
//!
//! Widget configuration documents are opaque to the service: the host's
//! editor writes them, the service only stores and returns them by id.

use parley_types::error::RepositoryError;

/// Storage for opaque per-widget configuration blobs.
pub trait WidgetConfigRepository: Send + Sync {
    /// Store a new document and return its id.
    fn save(
        &self,
        data: &str,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    fn get(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Replace a document. Returns `RepositoryError::NotFound` if `id` is unknown.
    fn update(
        &self,
        id: i64,
        data: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Returns whether a document was removed.
    fn delete(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
