//! Transformed schema records as produced by the schema pipeline.
//!
//! These are the raw inputs the graph is built from: classes with parent
//! links, inline attributes and `slot_usage` refinements, top-level slots,
//! enums with permissible values, primitive types, and variable-to-class
//! mapping rows. Map keys are the item names.

use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An inline attribute or a `slot_usage` refinement on a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub identifier: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Parent class name (`is_a` in LinkML).
    #[serde(default, alias = "is_a")]
    pub parent: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Attributes declared inline on this class.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDef>,
    /// Names of top-level slots this class references.
    #[serde(default)]
    pub slots: Vec<String>,
    /// Per-class refinements of inherited or referenced slots. A refinement
    /// overwrites range/required/multivalued; it never introduces a new slot.
    #[serde(default)]
    pub slot_usage: BTreeMap<String, AttributeDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDef {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub identifier: Option<bool>,
    #[serde(default)]
    pub slot_uri: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissibleValue {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissible_values: BTreeMap<String, PermissibleValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One row of the variable-to-class mapping table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub label: String,
    #[serde(default, alias = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub curie: Option<String>,
}

/// The whole validated in-memory schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub classes: BTreeMap<String, ClassDef>,
    #[serde(default)]
    pub slots: BTreeMap<String, SlotDef>,
    #[serde(default)]
    pub enums: BTreeMap<String, EnumDef>,
    #[serde(default)]
    pub types: BTreeMap<String, TypeDef>,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
}

impl SchemaDocument {
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let doc = SchemaDocument::from_json_str(
            r#"{
                "classes": {
                    "Entity": {
                        "abstract": true,
                        "attributes": {
                            "id": { "range": "string", "required": true }
                        }
                    },
                    "Specimen": {
                        "is_a": "Entity",
                        "attributes": {
                            "specimen_type": { "range": "SpecimenTypeEnum" }
                        }
                    }
                },
                "enums": {
                    "SpecimenTypeEnum": {
                        "permissible_values": { "tissue": {}, "blood": {} }
                    }
                },
                "types": {
                    "string": { "uri": "xsd:string" }
                },
                "variables": [
                    { "label": "specimen kind", "class": "Specimen", "data_type": "string" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.classes.len(), 2);
        assert_eq!(doc.classes["Specimen"].parent.as_deref(), Some("Entity"));
        assert!(doc.classes["Entity"].is_abstract);
        assert_eq!(
            doc.classes["Entity"].attributes["id"].required,
            Some(true)
        );
        assert_eq!(doc.enums["SpecimenTypeEnum"].permissible_values.len(), 2);
        assert_eq!(doc.variables[0].class_name.as_deref(), Some("Specimen"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc = SchemaDocument::from_json_str("{}").unwrap();
        assert!(doc.classes.is_empty());
        assert!(doc.variables.is_empty());
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = SchemaDocument::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn loads_from_a_file_and_reports_the_path_on_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{ "classes": { "Entity": {} } }"#).unwrap();

        let doc = SchemaDocument::from_json_file(&path).unwrap();
        assert_eq!(doc.classes.len(), 1);

        let err = SchemaDocument::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { path, .. } if path.ends_with("missing.json")));
    }
}
