//! Supplier entity

use crate::schema::{EntitySchema, FieldDef};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "supplier",
    plural: "suppliers",
    title: "Suppliers",
    collection: "suppliers",
    id_field: "SupplierID",
    display_field: "SupplierName",
    fields: &[
        FieldDef::text("SupplierName", "Supplier Name", 30).required(),
        FieldDef::text("ContactName", "Contact", 20),
        FieldDef::text("Phone", "Phone", 16),
        FieldDef::text("City", "City", 16),
        FieldDef::text("Country", "Country", 12),
    ],
};
