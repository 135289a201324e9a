use async_trait::async_trait;
use bson::{doc, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::{Client, Collection, Database};
use rocket::futures::TryStreamExt;
use uuid::Uuid;

use super::{id_bson, Store, ID_FIELD};
use crate::error::StoreError;

const MONGO_ID_FIELD: &str = "_id";

/// MongoDB backed [`Store`]. Document ids are kept in `_id`.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }
}

/// Opens a client and checks that the database answers.
pub async fn connect(uri: &str, database: &str) -> Result<MongoStore, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(database);

    if let Err(err) = db.list_collection_names(None).await {
        return Err(StoreError::Unavailable(err.to_string()));
    }

    Ok(MongoStore { client, db })
}

#[inline]
fn by_id(id: Uuid) -> Document {
    doc! { MONGO_ID_FIELD: id_bson(id) }
}

fn sort_document(order: &[&str]) -> Option<Document> {
    if order.is_empty() {
        return None;
    }
    let mut sort = Document::new();
    for field in order {
        sort.insert(*field, 1);
    }
    Some(sort)
}

fn into_stored(mut document: Document) -> Document {
    if let Some(id) = document.remove(ID_FIELD) {
        document.insert(MONGO_ID_FIELD, id);
    }
    document
}

fn from_stored(mut document: Document) -> Document {
    if let Some(id) = document.remove(MONGO_ID_FIELD) {
        document.insert(ID_FIELD, id);
    }
    document
}

#[async_trait]
impl Store for MongoStore {
    async fn insert(&self, name: &str, document: Document) -> Result<(), StoreError> {
        self.collection(name)
            .insert_one(into_stored(document), None)
            .await?;
        Ok(())
    }

    async fn find_one(&self, name: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let found = self.collection(name).find_one(by_id(id), None).await?;
        Ok(found.map(from_stored))
    }

    async fn find_many(&self, name: &str, order: &[&str]) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().sort(sort_document(order)).build();
        let documents: Vec<Document> = self.collection(name)
            .find(None, options)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(from_stored).collect())
    }

    async fn find_by_ids(&self, name: &str, ids: &[Uuid]) -> Result<Vec<Document>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Bson> = ids.iter().copied().map(id_bson).collect();
        let documents: Vec<Document> = self.collection(name)
            .find(doc! { MONGO_ID_FIELD: { "$in": ids } }, None)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(from_stored).collect())
    }

    async fn find_containing(
        &self,
        name: &str,
        field: &str,
        value: Uuid,
        order: &[&str],
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().sort(sort_document(order)).build();
        let documents: Vec<Document> = self.collection(name)
            .find(doc! { field: id_bson(value) }, options)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(from_stored).collect())
    }

    async fn update(&self, name: &str, id: Uuid, fields: Document) -> Result<bool, StoreError> {
        let collection = self.collection(name);

        // MongoDB rejects an empty $set.
        if fields.is_empty() {
            let count = collection.count_documents(by_id(id), None).await?;
            return Ok(count > 0);
        }

        let result = collection
            .update_one(by_id(id), doc! { "$set": fields }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, name: &str, id: Uuid) -> Result<bool, StoreError> {
        let result = self.collection(name).delete_one(by_id(id), None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn add_to_set(
        &self,
        name: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError> {
        let result = self.collection(name)
            .update_one(
                by_id(id),
                doc! { "$addToSet": { field: id_bson(value) } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn pull(
        &self,
        name: &str,
        id: Uuid,
        field: &str,
        value: Uuid,
    ) -> Result<bool, StoreError> {
        let mut filter = by_id(id);
        filter.insert(field, id_bson(value));

        let result = self.collection(name)
            .update_one(filter, doc! { "$pull": { field: id_bson(value) } }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn pull_all(&self, name: &str, field: &str, value: Uuid) -> Result<u64, StoreError> {
        let result = self.collection(name)
            .update_many(
                doc! { field: id_bson(value) },
                doc! { "$pull": { field: id_bson(value) } },
                None,
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn close(&self) -> Result<(), StoreError> {
        tracing::info!("Closing MongoDB client...");
        self.client.clone().shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_moves_between_id_fields() {
        let id = Uuid::new_v4();
        let stored = into_stored(doc! { "id": id_bson(id), "nome": "Redes" });
        assert_eq!(stored.get_str("_id").ok(), Some(id.to_string().as_str()));
        assert!(!stored.contains_key("id"));

        let restored = from_stored(stored);
        assert_eq!(restored.get_str("id").ok(), Some(id.to_string().as_str()));
        assert!(!restored.contains_key("_id"));
    }

    #[test]
    fn sort_follows_field_order() {
        assert_eq!(sort_document(&[]), None);
        let sort = sort_document(&["diaSemana", "horaInicial"]).unwrap();
        let keys: Vec<&String> = sort.keys().collect();
        assert_eq!(keys, ["diaSemana", "horaInicial"]);
    }
}
