//! Customer entity

use crate::schema::{EntitySchema, FieldDef};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "customer",
    plural: "customers",
    title: "Customers",
    collection: "customers",
    id_field: "CustomerID",
    display_field: "CustomerName",
    fields: &[
        FieldDef::text("CustomerName", "Customer Name", 30).required(),
        FieldDef::text("Email", "Email", 28),
        FieldDef::text("ContactName", "Contact", 20),
        FieldDef::text("City", "City", 16),
        FieldDef::text("Country", "Country", 12),
    ],
};
