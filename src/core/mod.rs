//! Core module - the list component and its collaborators

pub mod api;
pub mod config;
pub mod dispatcher;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod list;
pub mod record;
pub mod session;
pub mod store;
pub mod view;

pub use api::{ApiError, CatalogApi};
pub use config::{Config, ConfigError};
pub use dispatcher::{DispatchError, MutationDispatcher, Operation, Reconciled};
pub use http::HttpCatalogApi;
pub use list::ListController;
pub use record::{FieldValue, Record, RecordId};
pub use session::{Draft, EditSession, EditTarget, SessionAction, SessionError};
pub use store::{CollectionStore, StoreError};
pub use view::{Page, ViewState, PAGE_SIZE};
