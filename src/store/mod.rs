//! Document storage used by the resource handlers.
//!
//! Documents exchanged with a [`Store`] carry their identifier in the `id`
//! field as a hyphenated UUID string. Implementations are free to keep it
//! elsewhere internally (MongoDB keeps it in `_id`).

use async_trait::async_trait;
use bson::{Bson, Document};
use uuid::Uuid;

use crate::error::StoreError;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;

pub const ID_FIELD: &str = "id";

#[inline]
pub fn id_bson(id: Uuid) -> Bson {
    Bson::String(id.to_string())
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Lists every document of a collection sorted ascending by `order`,
    /// compared field by field.
    async fn find_many(
        &self,
        collection: &str,
        order: &[&str],
    ) -> Result<Vec<Document>, StoreError>;

    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[Uuid],
    ) -> Result<Vec<Document>, StoreError>;

    /// Lists documents whose array `field` contains `value`, sorted ascending
    /// by `order`.
    async fn find_containing(
        &self,
        collection: &str,
        field: &str,
        value: Uuid,
        order: &[&str],
    ) -> Result<Vec<Document>, StoreError>;

    /// Sets `fields` on an existing document. Returns `false` when no
    /// document has the id; nothing is created in that case.
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Document,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    /// Appends `value` to the array `field` unless already present, as one
    /// atomic operation. Returns `false` when no document has the id.
    async fn add_to_set(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError>;

    /// Removes `value` from the array `field` as one atomic operation.
    /// Returns `false` when no document with the id contains `value`.
    async fn pull(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError>;

    /// Removes `value` from the array `field` of every document in the
    /// collection. Returns the number of documents changed.
    async fn pull_all(&self, collection: &str, field: &str, value: Uuid)
        -> Result<u64, StoreError>;

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
