//! In-memory catalog API for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::api::{ApiError, CatalogApi};
use crate::core::record::{FieldValue, Record, RecordId};
use crate::core::session::Draft;

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Record>>,
    next_id: i64,
    failing: Option<u16>,
    calls: Vec<String>,
}

/// Holds collections in memory and assigns integer identities on create
pub struct FakeApi {
    id_field: &'static str,
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new(id_field: &'static str) -> Self {
        Self {
            id_field,
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    pub fn with_records(self, collection: &str, records: Vec<Record>) -> Self {
        self.state
            .lock()
            .unwrap()
            .collections
            .insert(collection.to_string(), records);
        self
    }

    /// Make every following mutating call fail with the given status
    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().failing = Some(status);
    }

    /// Verbs issued so far, e.g. `["GET categories", "PATCH categories/1"]`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn check_failure(state: &State, url: String) -> Result<(), ApiError> {
        match state.failing {
            Some(status) => Err(ApiError::Status {
                url,
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn list(&self, collection: &str) -> Result<Vec<Record>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("GET {}", collection));
        Ok(state.collections.get(collection).cloned().unwrap_or_default())
    }

    async fn create(&self, collection: &str, body: &Draft) -> Result<Record, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("POST {}", collection));
        Self::check_failure(&state, collection.to_string())?;

        let id = state.next_id;
        state.next_id += 1;
        let mut record = Record::new().with(self.id_field, FieldValue::Integer(id));
        record.merge(body);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: &Draft,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let url = format!("{}/{}", collection, id);
        state.calls.push(format!("PATCH {}", url));
        Self::check_failure(&state, url.clone())?;

        let id_field = self.id_field;
        let record = state
            .collections
            .get_mut(collection)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| r.get(id_field).and_then(RecordId::from_value).as_ref() == Some(id))
            })
            .ok_or_else(|| ApiError::Status {
                url,
                status: 404,
                body: String::new(),
            })?;
        record.merge(patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let url = format!("{}/{}", collection, id);
        state.calls.push(format!("DELETE {}", url));
        Self::check_failure(&state, url)?;

        let id_field = self.id_field;
        if let Some(records) = state.collections.get_mut(collection) {
            records.retain(|r| r.get(id_field).and_then(RecordId::from_value).as_ref() != Some(id));
        }
        Ok(())
    }
}
