//! Category entity - product groupings

use crate::schema::{EntitySchema, FieldDef};

pub static SCHEMA: EntitySchema = EntitySchema {
    name: "category",
    plural: "categories",
    title: "Categories",
    collection: "categories",
    id_field: "CategoryID",
    display_field: "CategoryName",
    fields: &[
        FieldDef::text("CategoryName", "Category Name", 25).required(),
        FieldDef::text("Description", "Description", 40),
    ],
};
