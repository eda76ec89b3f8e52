use serde::{Deserialize, Serialize};
use std::fmt;

pub mod dto;
pub mod error;

pub use dto::{
    AttributeDef, ClassDef, EnumDef, PermissibleValue, SchemaDocument, SlotDef, TypeDef,
    VariableDef,
};
pub use error::SchemaError;

/// Stable identifier of a schema item. Item names double as ids in the
/// source data; when names collide across kinds the graph builder prefixes
/// them with the kind label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Class,
    Enum,
    Slot,
    Type,
    Variable,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Class,
        ItemKind::Enum,
        ItemKind::Slot,
        ItemKind::Type,
        ItemKind::Variable,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// class -> parent class
    Inheritance,
    /// class -> range item, labeled with the slot name (two-panel mode)
    ClassRange,
    /// class -> slot item (three-panel mode, first hop)
    ClassSlot,
    /// slot item -> range item (three-panel mode, second hop)
    SlotRange,
    /// variable -> mapped class
    MapsTo,
}

/// Kind-specific metadata. The variant is the closed discriminant for the
/// owning item; it is set exactly once at graph-build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemMeta {
    Class {
        parent: Option<String>,
        is_abstract: bool,
        description: Option<String>,
    },
    Enum {
        permissible_values: Vec<String>,
        description: Option<String>,
    },
    Slot {
        range: Option<String>,
        required: Option<bool>,
        multivalued: Option<bool>,
        identifier: Option<bool>,
        slot_uri: Option<String>,
        /// Base slot name when this item is a per-class refinement instance.
        overrides: Option<String>,
        description: Option<String>,
    },
    Type {
        uri: Option<String>,
        base: Option<String>,
        description: Option<String>,
    },
    Variable {
        mapped_class: Option<String>,
        data_type: Option<String>,
        unit: Option<String>,
        curie: Option<String>,
    },
}

impl ItemMeta {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemMeta::Class { .. } => ItemKind::Class,
            ItemMeta::Enum { .. } => ItemKind::Enum,
            ItemMeta::Slot { .. } => ItemKind::Slot,
            ItemMeta::Type { .. } => ItemKind::Type,
            ItemMeta::Variable { .. } => ItemKind::Variable,
        }
    }
}

/// A schema entity. Immutable once built; owned exclusively by the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub meta: ItemMeta,
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        self.meta.kind()
    }

    pub fn is_abstract(&self) -> bool {
        matches!(
            self.meta,
            ItemMeta::Class {
                is_abstract: true,
                ..
            }
        )
    }

    pub fn description(&self) -> Option<&str> {
        match &self.meta {
            ItemMeta::Class { description, .. }
            | ItemMeta::Enum { description, .. }
            | ItemMeta::Slot { description, .. }
            | ItemMeta::Type { description, .. } => description.as_deref(),
            ItemMeta::Variable { .. } => None,
        }
    }
}

/// A typed directed relationship between two item ids. Created once at
/// graph-build time and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ItemId,
    pub target: ItemId,
    pub kind: EdgeKind,
    /// Slot or attribute name for range-ish edges.
    pub label: Option<String>,
    /// Ancestor class name when a ClassRange edge is contributed by an
    /// ancestor rather than declared directly.
    pub inherited_from: Option<String>,
    pub required: Option<bool>,
    pub multivalued: Option<bool>,
}

impl Edge {
    pub fn new(source: ItemId, target: ItemId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
            label: None,
            inherited_from: None,
            required: None,
            multivalued: None,
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.source == self.target
    }
}
