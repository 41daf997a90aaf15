//! The generic list component
//!
//! A [`ListController`] is one entity's list view: the collection store, the
//! edit session, the view state and the dispatcher, wired together for a
//! single [`EntitySchema`]. The same component serves every entity.

use tracing::{debug, warn};

use crate::core::api::CatalogApi;
use crate::core::dispatcher::{DispatchError, MutationDispatcher, Reconciled};
use crate::core::record::RecordId;
use crate::core::session::{EditSession, EditTarget, SessionAction, SessionError};
use crate::core::store::{CollectionStore, StoreError};
use crate::core::view::{Page, ViewState};
use crate::schema::EntitySchema;

pub struct ListController<'a, A: CatalogApi + ?Sized> {
    api: &'a A,
    schema: &'static EntitySchema,
    store: CollectionStore,
    session: EditSession,
    view: ViewState,
    dispatcher: MutationDispatcher,
}

impl<'a, A: CatalogApi + ?Sized> ListController<'a, A> {
    /// Load the collection and start with an idle session on page 1
    pub async fn load(api: &'a A, schema: &'static EntitySchema) -> Result<Self, StoreError> {
        let store = CollectionStore::load(api, schema).await?;
        Ok(Self {
            api,
            schema,
            store,
            session: EditSession::Idle,
            view: ViewState::new(),
            dispatcher: MutationDispatcher::new(schema),
        })
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The rows currently visible
    pub fn page(&self) -> Page<'_> {
        self.view.derive(self.schema, self.store.records())
    }

    fn total_pages(&self) -> usize {
        self.view.total_pages(self.schema, self.store.records())
    }

    pub fn set_search(&mut self, search: &str) {
        self.view.set_search(search);
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.view.next(total);
    }

    pub fn prev_page(&mut self) {
        self.view.prev();
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.view.go_to(page, total);
    }

    pub fn begin_create(&mut self) -> Result<(), SessionError> {
        self.session
            .apply(self.schema, SessionAction::Begin(EditTarget::New))
    }

    /// Open an edit on the record whose identity reads as `key`
    pub fn begin_edit(&mut self, key: &str) -> Result<RecordId, DispatchError> {
        let id = self.store.find(key)?;
        self.session
            .apply(self.schema, SessionAction::Begin(EditTarget::Existing(id.clone())))?;
        Ok(id)
    }

    pub fn set_field(&mut self, field: &str, input: &str) -> Result<(), SessionError> {
        self.session.apply(
            self.schema,
            SessionAction::SetField {
                field: field.to_string(),
                input: input.to_string(),
            },
        )
    }

    /// Drop the open edit and its draft, if any
    pub fn cancel(&mut self) {
        // Cancel is accepted in every state
        let _ = self.session.apply(self.schema, SessionAction::Cancel);
    }

    /// Persist the open edit. The session closes once the server accepted the
    /// change; on failure the draft is kept for another attempt.
    ///
    /// If an accepted change cannot be folded into the store (a created record
    /// without a usable identity, say), the collection is fetched again.
    pub async fn save(&mut self) -> Result<Reconciled, DispatchError> {
        let mutation = match &self.session {
            EditSession::Idle => return Err(SessionError::NotEditing.into()),
            EditSession::Editing {
                target: EditTarget::New,
                draft,
            } => self.dispatcher.plan_create(draft.clone())?,
            EditSession::Editing {
                target: EditTarget::Existing(id),
                draft,
            } => {
                if draft.is_empty() {
                    debug!(entity = self.schema.name, %id, "empty draft, nothing to save");
                    self.session.apply(self.schema, SessionAction::Saved)?;
                    return Ok(Reconciled::Unchanged);
                }
                self.dispatcher.plan_update(id.clone(), draft.clone())?
            }
        };

        let completed = self.dispatcher.send(self.api, mutation).await?;
        self.session.apply(self.schema, SessionAction::Saved)?;

        match self.dispatcher.reconcile(&mut self.store, completed) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(entity = self.schema.name, error = %e, "accepted change not reconciled, reloading");
                self.reload().await?;
                Ok(Reconciled::Reloaded)
            }
        }
    }

    async fn reload(&mut self) -> Result<(), StoreError> {
        self.store = CollectionStore::load(self.api, self.schema).await?;
        let total = self.total_pages();
        self.view.clamp(total);
        Ok(())
    }

    /// Delete the record whose identity reads as `key`
    pub async fn delete(&mut self, key: &str) -> Result<Reconciled, DispatchError> {
        let id = self.store.find(key)?;
        let mutation = self.dispatcher.plan_delete(id.clone());
        let completed = self.dispatcher.send(self.api, mutation).await?;
        let outcome = self.dispatcher.reconcile(&mut self.store, completed)?;

        if self.session.is_editing(&id) {
            self.cancel();
        }
        let total = self.total_pages();
        self.view.clamp(total);
        Ok(outcome)
    }
}
