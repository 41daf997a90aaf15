//! catadm: catalog administration toolkit
//!
//! Browse and edit the categories, products, suppliers and customers of a
//! REST-backed catalog. One generic list component (collection store, edit
//! session, mutation dispatcher, filter and paginator) is parameterized by a
//! typed schema per entity.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
