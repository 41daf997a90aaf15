//! Catalog entity definitions
//!
//! Each submodule exposes a `SCHEMA` describing one REST collection. The
//! [`Entity`] enum is the command-line handle for picking one of them.

pub mod category;
pub mod customer;
pub mod product;
pub mod supplier;

use crate::schema::EntitySchema;

/// The catalog entities this tool manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Entity {
    Category,
    Product,
    Supplier,
    Customer,
}

impl Entity {
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Entity::Category => &category::SCHEMA,
            Entity::Product => &product::SCHEMA,
            Entity::Supplier => &supplier::SCHEMA,
            Entity::Customer => &customer::SCHEMA,
        }
    }
}
