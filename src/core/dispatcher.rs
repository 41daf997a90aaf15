//! Mutation dispatcher: create/update/delete against the API and
//! reconciliation of the local store
//!
//! A mutation goes through three steps. `plan_*` validates the draft and, for
//! updates and deletes, takes a ticket from the per-identity [`Sequencer`].
//! [`MutationDispatcher::send`] performs the request. [`MutationDispatcher::reconcile`]
//! applies the result to the store, unless a newer request for the same
//! identity was issued in the meantime. The steps are separate so completions
//! can arrive in any order.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::api::{ApiError, CatalogApi};
use crate::core::record::{Record, RecordId};
use crate::core::session::{Draft, SessionError};
use crate::core::store::{CollectionStore, StoreError};
use crate::schema::validator::{self, ValidationError};
use crate::schema::EntitySchema;

/// Kind of mutation, used in user-facing failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Transport failures and non-success statuses alike
    #[error("Failed to {op} {entity}")]
    Failed {
        op: Operation,
        entity: &'static str,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Position of a request in the issue order of its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out increasing tickets per identity and remembers the latest one
#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
    latest: HashMap<RecordId, Ticket>,
}

impl Sequencer {
    pub fn issue(&mut self, id: &RecordId) -> Ticket {
        self.next += 1;
        let ticket = Ticket(self.next);
        self.latest.insert(id.clone(), ticket);
        ticket
    }

    /// True if no request for `id` was issued after `ticket`
    pub fn is_current(&self, id: &RecordId, ticket: Ticket) -> bool {
        self.latest.get(id) == Some(&ticket)
    }

    pub fn retire(&mut self, id: &RecordId) {
        self.latest.remove(id);
    }
}

/// A validated request waiting to be sent
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create {
        body: Draft,
    },
    Update {
        id: RecordId,
        patch: Draft,
        ticket: Ticket,
    },
    Delete {
        id: RecordId,
        ticket: Ticket,
    },
}

impl Mutation {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Create { .. } => Operation::Create,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }
}

/// A mutation the server acknowledged
#[derive(Debug, Clone, PartialEq)]
pub enum Completed {
    Created {
        record: Record,
    },
    Updated {
        id: RecordId,
        patch: Draft,
        ticket: Ticket,
    },
    Deleted {
        id: RecordId,
        ticket: Ticket,
    },
}

/// What reconciliation did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Appended(RecordId),
    Merged(RecordId),
    Removed(RecordId),
    /// Superseded by a newer request, or the record is gone; store untouched
    Stale(RecordId),
    /// Nothing to send
    Unchanged,
    /// Accepted by the server but not foldable into the store; the
    /// collection was fetched again
    Reloaded,
}

/// Issues mutations for one entity and folds their results into its store
#[derive(Debug)]
pub struct MutationDispatcher {
    schema: &'static EntitySchema,
    sequencer: Sequencer,
}

impl MutationDispatcher {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            sequencer: Sequencer::default(),
        }
    }

    pub fn plan_create(&self, body: Draft) -> Result<Mutation, ValidationError> {
        validator::check_create(self.schema, &body)?;
        Ok(Mutation::Create { body })
    }

    pub fn plan_update(&mut self, id: RecordId, patch: Draft) -> Result<Mutation, ValidationError> {
        validator::check_update(self.schema, &patch)?;
        let ticket = self.sequencer.issue(&id);
        Ok(Mutation::Update { id, patch, ticket })
    }

    pub fn plan_delete(&mut self, id: RecordId) -> Mutation {
        let ticket = self.sequencer.issue(&id);
        Mutation::Delete { id, ticket }
    }

    /// Perform the request. Any failure maps to [`DispatchError::Failed`].
    pub async fn send<A>(&self, api: &A, mutation: Mutation) -> Result<Completed, DispatchError>
    where
        A: CatalogApi + ?Sized,
    {
        let op = mutation.operation();
        let collection = self.schema.collection;
        debug!(entity = self.schema.name, %op, "sending mutation");

        let result = match mutation {
            Mutation::Create { body } => api
                .create(collection, &body)
                .await
                .map(|record| Completed::Created { record }),
            Mutation::Update { id, patch, ticket } => api
                .update(collection, &id, &patch)
                .await
                .map(|()| Completed::Updated { id, patch, ticket }),
            Mutation::Delete { id, ticket } => api
                .delete(collection, &id)
                .await
                .map(|()| Completed::Deleted { id, ticket }),
        };

        result.map_err(|source| {
            warn!(entity = self.schema.name, %op, error = %source, "mutation failed");
            DispatchError::Failed {
                op,
                entity: self.schema.name,
                source,
            }
        })
    }

    /// Apply an acknowledged mutation to the store
    pub fn reconcile(
        &mut self,
        store: &mut CollectionStore,
        completed: Completed,
    ) -> Result<Reconciled, StoreError> {
        match completed {
            Completed::Created { record } => {
                let id = store.append(record)?;
                debug!(entity = self.schema.name, %id, "appended created record");
                Ok(Reconciled::Appended(id))
            }
            Completed::Updated { id, patch, ticket } => {
                if !self.sequencer.is_current(&id, ticket) || !store.contains(&id) {
                    warn!(entity = self.schema.name, %id, "discarding stale update response");
                    return Ok(Reconciled::Stale(id));
                }
                store.merge(&id, &patch)?;
                debug!(entity = self.schema.name, %id, fields = patch.len(), "merged update");
                Ok(Reconciled::Merged(id))
            }
            Completed::Deleted { id, .. } => {
                // The server no longer has the record, whatever was issued after
                self.sequencer.retire(&id);
                match store.remove(&id) {
                    Some(_) => {
                        debug!(entity = self.schema.name, %id, "removed deleted record");
                        Ok(Reconciled::Removed(id))
                    }
                    None => Ok(Reconciled::Stale(id)),
                }
            }
        }
    }
}
