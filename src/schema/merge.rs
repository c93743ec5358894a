//! Merging of upstream schema contributions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::SchemaDoc;

/// Where a merged property came from.
///
/// `Injected` marks contributions from upstream data nodes (transparent
/// pass-through values); `Standard` marks the declared output of an
/// upstream service node. The tag is for UI consumption only and never
/// affects merge precedence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    Injected,
    Standard,
}

/// One schema contribution with its provenance.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    pub schema: SchemaDoc,
    pub provenance: Provenance,
}

impl SchemaEntry {
    pub fn new(
        schema: SchemaDoc,
        provenance: Provenance,
    ) -> Self {
        Self {
            schema,
            provenance,
        }
    }
}

/// Result of merging several schema contributions.
#[derive(Debug, Clone, Default)]
pub struct MergedSchema {
    /// The merged schema document.
    pub doc: SchemaDoc,
    /// Provenance per merged property, tracking the entry that won.
    pub provenance: HashMap<String, Provenance>,
}

impl MergedSchema {
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

/// Merge N schemas into one.
///
/// Unions all `properties` maps by key; on collision the later entry wins,
/// which gives contributions discovered later in an upstream traversal
/// precedence over earlier ones. `required` lists are unioned and
/// de-duplicated in first-seen order.
pub fn merge_schemas(entries: &[SchemaEntry]) -> MergedSchema {
    let mut doc = SchemaDoc::empty();
    let mut provenance = HashMap::new();
    let mut required: Vec<String> = Vec::new();

    for entry in entries {
        for (name, definition) in entry.schema.properties() {
            doc.set_property(name.clone(), definition.clone());
            provenance.insert(name.clone(), entry.provenance);
        }
        for name in entry.schema.required() {
            if !required.contains(&name) {
                required.push(name);
            }
        }
    }
    doc.set_required(required);

    MergedSchema {
        doc,
        provenance,
    }
}

#[cfg(test)]
mod test {
    use super::{Provenance, SchemaEntry, merge_schemas};
    use crate::schema::SchemaDoc;
    use serde_json::json;

    fn entry(
        value: serde_json::Value,
        provenance: Provenance,
    ) -> SchemaEntry {
        SchemaEntry::new(SchemaDoc::from_value(value).unwrap(), provenance)
    }

    #[test]
    fn test_later_entry_wins_on_collision() {
        let merged = merge_schemas(&[
            entry(json!({"properties": {"a": {"type": "string"}}}), Provenance::Standard),
            entry(json!({"properties": {"a": {"type": "number"}}}), Provenance::Injected),
        ]);

        assert_eq!(merged.doc.property("a").unwrap()["type"], "number");
        assert_eq!(merged.provenance["a"], Provenance::Injected);
    }

    #[test]
    fn test_union_of_disjoint_properties_and_required() {
        let merged = merge_schemas(&[
            entry(json!({"properties": {"a": {"type": "string"}}, "required": ["a"]}), Provenance::Injected),
            entry(json!({"properties": {"b": {"type": "boolean"}}, "required": ["b", "a"]}), Provenance::Standard),
        ]);

        assert_eq!(merged.doc.property_names().len(), 2);
        assert_eq!(merged.doc.required(), vec!["a", "b"]);
        assert_eq!(merged.provenance["a"], Provenance::Injected);
        assert_eq!(merged.provenance["b"], Provenance::Standard);
    }

    #[test]
    fn test_empty_input_is_empty_schema() {
        let merged = merge_schemas(&[]);
        assert!(merged.is_empty());
        assert_eq!(merged.doc.format(), "{}");
    }
}
