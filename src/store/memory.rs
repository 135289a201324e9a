use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bson::{Bson, Document};
use uuid::Uuid;

use super::{id_bson, Store, ID_FIELD};
use crate::error::StoreError;

/// Process-local store keeping every collection in insertion order.
///
/// Each operation runs under a single lock, so array mutations are atomic
/// with respect to each other just like their MongoDB counterparts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn has_id(document: &Document, id: &Bson) -> bool {
    document.get(ID_FIELD) == Some(id)
}

fn array_contains(document: &Document, field: &str, value: &Bson) -> bool {
    match document.get(field) {
        Some(Bson::Array(items)) => items.contains(value),
        _ => false,
    }
}

fn rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(_) => 3,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Orders values the way MongoDB sorts mixed types: missing and null first,
/// then numbers, then strings.
fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(a), Some(b)) if rank(Some(a)) == 1 && rank(Some(b)) == 1 => {
            let (a, b) = (as_f64(a).unwrap_or_default(), as_f64(b).unwrap_or_default());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

fn sorted(mut documents: Vec<Document>, order: &[&str]) -> Vec<Document> {
    documents.sort_by(|a, b| {
        order
            .iter()
            .map(|field| compare_values(a.get(*field), b.get(*field)))
            .find(|it| it.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    documents
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let documents = collections.entry(collection.to_string()).or_default();

        if let Some(id) = document.get(ID_FIELD) {
            if documents.iter().any(|it| has_id(it, id)) {
                return Err(StoreError::Unavailable(format!(
                    "duplicate id {} in '{}'",
                    id, collection
                )));
            }
        }

        documents.push(document);
        Ok(())
    }

    async fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let id = id_bson(id);
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|it| has_id(it, &id)))
            .cloned())
    }

    async fn find_many(
        &self,
        collection: &str,
        order: &[&str],
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self
            .lock()?
            .get(collection)
            .cloned()
            .unwrap_or_default();
        Ok(sorted(documents, order))
    }

    async fn find_by_ids(
        &self,
        collection: &str,
        ids: &[Uuid],
    ) -> Result<Vec<Document>, StoreError> {
        let ids: Vec<Bson> = ids.iter().copied().map(id_bson).collect();
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|it| ids.iter().any(|id| has_id(it, id)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_containing(
        &self,
        collection: &str,
        field: &str,
        value: Uuid,
        order: &[&str],
    ) -> Result<Vec<Document>, StoreError> {
        let value = id_bson(value);
        let documents: Vec<Document> = self
            .lock()?
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|it| array_contains(it, field, &value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(sorted(documents, order))
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let id = id_bson(id);
        let mut collections = self.lock()?;
        let target = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|it| has_id(it, &id)));

        match target {
            Some(document) => {
                for (key, value) in fields {
                    document.insert(key, value);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let id = id_bson(id);
        let mut collections = self.lock()?;
        let documents = match collections.get_mut(collection) {
            Some(documents) => documents,
            None => return Ok(false),
        };

        match documents.iter().position(|it| has_id(it, &id)) {
            Some(index) => {
                documents.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_to_set(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError> {
        let id = id_bson(id);
        let value = id_bson(value);
        let mut collections = self.lock()?;
        let target = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|it| has_id(it, &id)));

        let document = match target {
            Some(document) => document,
            None => return Ok(false),
        };

        if let Some(Bson::Array(items)) = document.get_mut(field) {
            if !items.contains(&value) {
                items.push(value);
            }
            return Ok(true);
        }

        document.insert(field, Bson::Array(vec![value]));
        Ok(true)
    }

    async fn pull(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError> {
        let id = id_bson(id);
        let value = id_bson(value);
        let mut collections = self.lock()?;
        let target = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|it| has_id(it, &id) && array_contains(it, field, &value))
        });

        match target.and_then(|document| document.get_mut(field)) {
            Some(Bson::Array(items)) => {
                items.retain(|it| it != &value);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pull_all(
        &self,
        collection: &str,
        field: &str,
        value: Uuid,
    ) -> Result<u64, StoreError> {
        let value = id_bson(value);
        let mut collections = self.lock()?;
        let mut changed = 0;

        if let Some(documents) = collections.get_mut(collection) {
            for document in documents.iter_mut() {
                if let Some(Bson::Array(items)) = document.get_mut(field) {
                    let before = items.len();
                    items.retain(|it| it != &value);
                    if items.len() != before {
                        changed += 1;
                    }
                }
            }
        }

        Ok(changed)
    }
}
