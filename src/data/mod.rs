use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;
use crate::resp::problem::{problems, Problem};
use crate::store::Store;

pub mod aluno;
pub mod curso;
pub mod professor;
pub mod turma;

/// A document type kept in its own collection and addressed by `id`.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Fields listings are sorted by, ascending.
    const ORDER: &'static [&'static str];

    /// Partial update body; only serialized fields are changed.
    type Patch: Serialize + Send + Sync;

    fn id(&self) -> Uuid;
}

#[async_trait]
pub trait ResourceDbExt {
    async fn create_resource<T: Resource>(&self, resource: &T) -> Result<(), StoreError>;

    async fn list_resources<T: Resource>(&self) -> Result<Vec<T>, StoreError>;

    async fn get_resource<T: Resource>(&self, id: Uuid) -> Result<Option<T>, StoreError>;

    async fn get_resources<T: Resource>(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError>;

    async fn update_resource<T: Resource>(
        &self,
        id: Uuid,
        patch: &T::Patch,
    ) -> Result<bool, StoreError>;

    async fn delete_resource<T: Resource>(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
impl ResourceDbExt for dyn Store {
    async fn create_resource<T: Resource>(&self, resource: &T) -> Result<(), StoreError> {
        tracing::debug!("Inserting {} into '{}'", resource.id(), T::COLLECTION);
        self.insert(T::COLLECTION, bson::to_document(resource)?)
            .await
    }

    async fn list_resources<T: Resource>(&self) -> Result<Vec<T>, StoreError> {
        self.find_many(T::COLLECTION, T::ORDER)
            .await?
            .into_iter()
            .map(|it| bson::from_document(it).map_err(StoreError::from))
            .collect()
    }

    async fn get_resource<T: Resource>(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.find_one(T::COLLECTION, id).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn get_resources<T: Resource>(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError> {
        self.find_by_ids(T::COLLECTION, ids)
            .await?
            .into_iter()
            .map(|it| bson::from_document(it).map_err(StoreError::from))
            .collect()
    }

    async fn update_resource<T: Resource>(
        &self,
        id: Uuid,
        patch: &T::Patch,
    ) -> Result<bool, StoreError> {
        let fields = bson::to_document(patch)?;
        self.update(T::COLLECTION, id, fields).await
    }

    async fn delete_resource<T: Resource>(&self, id: Uuid) -> Result<bool, StoreError> {
        self.delete(T::COLLECTION, id).await
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), Problem> {
    if value.trim().is_empty() {
        return Err(problems::bad_field(field, "Must not be blank."));
    }
    Ok(())
}

pub(crate) fn check_email(field: &str, value: Option<&str>) -> Result<(), Problem> {
    match value {
        Some(email) if !email.contains('@') => Err(problems::bad_field(
            field,
            "Not a valid e-mail address.",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("nome", "  ").is_err());
        assert!(require_text("nome", "Ana").is_ok());
    }

    #[test]
    fn email_needs_at_sign() {
        assert!(check_email("email", Some("ana.example.com")).is_err());
        assert!(check_email("email", Some("ana@example.com")).is_ok());
        assert!(check_email("email", None).is_ok());
    }
}
