//! Product entity

use crate::schema::{EntitySchema, FieldDef};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "product",
    plural: "products",
    title: "Products",
    collection: "products",
    id_field: "ProductID",
    display_field: "ProductName",
    fields: &[
        FieldDef::text("ProductName", "Product Name", 30).required(),
        FieldDef::decimal("Price", "Price", 10),
        FieldDef::text("Unit", "Unit", 20),
        FieldDef::integer("SupplierID", "Supplier", 10),
        FieldDef::integer("CategoryID", "Category", 10),
    ],
};
