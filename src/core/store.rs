//! Collection store: the client-held copy of one entity's records
//!
//! The store is filled by a single read of the whole collection. After that it
//! only changes through reconciliation of completed mutations, so every view
//! derives from the last server fetch plus acknowledged changes.

use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use crate::core::api::{ApiError, CatalogApi};
use crate::core::record::{Record, RecordId};
use crate::core::session::Draft;
use crate::schema::EntitySchema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to load {entity}")]
    Load {
        entity: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("{entity} record at position {index} has no usable '{id_field}'")]
    MissingId {
        entity: &'static str,
        id_field: &'static str,
        index: usize,
    },

    #[error("duplicate {entity} identity {id}")]
    DuplicateId { entity: &'static str, id: RecordId },

    #[error("no {entity} found matching '{key}'")]
    NotFound { entity: &'static str, key: String },
}

/// Ordered in-memory records of one entity, unique by identity
#[derive(Debug)]
pub struct CollectionStore {
    schema: &'static EntitySchema,
    records: Vec<Record>,
}

impl CollectionStore {
    /// Fetch the full collection once
    pub async fn load<A>(api: &A, schema: &'static EntitySchema) -> Result<Self, StoreError>
    where
        A: CatalogApi + ?Sized,
    {
        let records = api
            .list(schema.collection)
            .await
            .map_err(|source| StoreError::Load {
                entity: schema.plural,
                source,
            })?;
        debug!(entity = schema.plural, count = records.len(), "collection loaded");
        Self::from_records(schema, records)
    }

    /// Build a store from records in server order, rejecting records without
    /// an identity and duplicate identities. Identities are compared by their
    /// textual form, the same way [`find`](Self::find) resolves keys, so `1`
    /// and `"1"` collide.
    pub fn from_records(
        schema: &'static EntitySchema,
        records: Vec<Record>,
    ) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            let id = schema.id_of(record).ok_or(StoreError::MissingId {
                entity: schema.name,
                id_field: schema.id_field,
                index,
            })?;
            if !seen.insert(id.to_string()) {
                return Err(StoreError::DuplicateId {
                    entity: schema.name,
                    id,
                });
            }
        }
        Ok(Self { schema, records })
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.records
            .iter()
            .position(|r| self.schema.id_of(r).as_ref() == Some(id))
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.position(id).map(|i| &self.records[i])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.position(id).is_some()
    }

    /// Resolve user input to an identity by comparing textual forms, so "7"
    /// finds a record whose identity is the string "7" as well as the number 7
    pub fn find(&self, key: &str) -> Result<RecordId, StoreError> {
        let key = key.trim();
        self.records
            .iter()
            .filter_map(|r| self.schema.id_of(r))
            .find(|id| id.to_string() == key)
            .ok_or_else(|| StoreError::NotFound {
                entity: self.schema.name,
                key: key.to_string(),
            })
    }

    fn key_taken(&self, id: &RecordId) -> bool {
        let key = id.to_string();
        self.records
            .iter()
            .filter_map(|r| self.schema.id_of(r))
            .any(|existing| existing.to_string() == key)
    }

    /// Append a record returned by a create
    pub fn append(&mut self, record: Record) -> Result<RecordId, StoreError> {
        let id = self.schema.id_of(&record).ok_or(StoreError::MissingId {
            entity: self.schema.name,
            id_field: self.schema.id_field,
            index: self.records.len(),
        })?;
        if self.key_taken(&id) {
            return Err(StoreError::DuplicateId {
                entity: self.schema.name,
                id,
            });
        }
        self.records.push(record);
        Ok(id)
    }

    /// Shallow-merge a draft into the record with the given identity
    pub fn merge(&mut self, id: &RecordId, draft: &Draft) -> Result<(), StoreError> {
        let index = self.position(id).ok_or_else(|| StoreError::NotFound {
            entity: self.schema.name,
            key: id.to_string(),
        })?;
        self.records[index].merge(draft);
        Ok(())
    }

    /// Remove a record by identity, returning it if it was present
    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        self.position(id).map(|i| self.records.remove(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fake::FakeApi;
    use crate::core::record::FieldValue;
    use crate::entities::category::SCHEMA;

    fn category(id: i64, name: &str) -> Record {
        Record::new().with("CategoryID", id).with("CategoryName", name)
    }

    fn store() -> CollectionStore {
        CollectionStore::from_records(
            &SCHEMA,
            vec![category(1, "Beverages"), category(2, "Condiments"), category(3, "Dairy")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_issues_single_read() {
        let api = FakeApi::new("CategoryID")
            .with_records("categories", vec![category(1, "Beverages"), category(2, "Dairy")]);

        let store = CollectionStore::load(&api, &SCHEMA).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(api.calls(), vec!["GET categories"]);
        assert_eq!(SCHEMA.display_value(&store.records()[1]), "Dairy");
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let err = CollectionStore::from_records(&SCHEMA, vec![category(1, "A"), category(1, "B")])
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { id: RecordId::Int(1), .. }));
    }

    #[test]
    fn test_number_and_text_forms_of_one_identity_collide() {
        let err = CollectionStore::from_records(
            &SCHEMA,
            vec![
                category(1, "A"),
                Record::new().with("CategoryID", "1").with("CategoryName", "B"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));

        let mut store = store();
        let err = store
            .append(Record::new().with("CategoryID", "3").with("CategoryName", "Again"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_missing_identity_rejected() {
        let err = CollectionStore::from_records(
            &SCHEMA,
            vec![category(1, "A"), Record::new().with("CategoryName", "B")],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::MissingId { index: 1, .. }));
    }

    #[test]
    fn test_append_keeps_order_and_uniqueness() {
        let mut store = store();
        let id = store.append(category(9, "Seafood")).unwrap();
        assert_eq!(id, RecordId::Int(9));
        assert_eq!(SCHEMA.id_of(store.records().last().unwrap()), Some(RecordId::Int(9)));

        let err = store.append(category(2, "Again")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_merge_touches_only_target() {
        let mut store = store();
        let mut draft = Draft::default();
        draft.insert("Description", FieldValue::from("Cheeses"));

        store.merge(&RecordId::Int(3), &draft).unwrap();

        let dairy = store.get(&RecordId::Int(3)).unwrap();
        assert_eq!(dairy.get("Description"), Some(&FieldValue::from("Cheeses")));
        assert_eq!(dairy.get("CategoryName"), Some(&FieldValue::from("Dairy")));
        assert_eq!(store.get(&RecordId::Int(1)).unwrap(), &category(1, "Beverages"));

        let err = store.merge(&RecordId::Int(42), &draft).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_remove_by_identity() {
        let mut store = store();
        assert!(store.remove(&RecordId::Int(2)).is_some());
        assert!(!store.contains(&RecordId::Int(2)));
        assert!(store.remove(&RecordId::Int(2)).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_find_by_text() {
        let store = store();
        assert_eq!(store.find(" 2 ").unwrap(), RecordId::Int(2));
        assert!(matches!(store.find("x"), Err(StoreError::NotFound { .. })));

        let text_ids = CollectionStore::from_records(
            &SCHEMA,
            vec![Record::new().with("CategoryID", "7").with("CategoryName", "Produce")],
        )
        .unwrap();
        assert_eq!(text_ids.find("7").unwrap(), RecordId::Text("7".to_string()));
    }
}
