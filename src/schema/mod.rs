//! Schema utility layer: parsing, formatting, merging and the compact
//! type-descriptor notation.

mod descriptor;
mod doc;
mod merge;

pub use descriptor::{descriptor_to_schema, schema_to_descriptor};
pub use doc::SchemaDoc;
pub use merge::{MergedSchema, Provenance, SchemaEntry, merge_schemas};
