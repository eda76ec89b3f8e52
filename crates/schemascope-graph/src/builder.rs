//! Builds the item/edge graph from transformed schema records, once, at
//! load time.

use crate::graph::SchemaGraph;
use schemascope_core::{
    AttributeDef, Edge, EdgeKind, Item, ItemId, ItemKind, ItemMeta, SchemaDocument, SchemaError,
    SlotDef,
};
use std::collections::{HashMap, HashSet};

/// One attribute or referenced slot as seen from a concrete class, after
/// inheritance and `slot_usage` refinement have been applied.
#[derive(Debug, Clone)]
struct EffectiveAttr {
    label: String,
    range: Option<String>,
    required: Option<bool>,
    multivalued: Option<bool>,
    inherited_from: Option<String>,
    /// Slot item the three-panel first hop points at: the `{slot}-{Class}`
    /// refinement instance when one exists, the base slot otherwise.
    slot_item: ItemId,
}

pub struct GraphBuilder<'a> {
    doc: &'a SchemaDocument,
    graph: SchemaGraph,
    /// Kind-aware name resolution; transparent to id namespacing.
    ids: HashMap<(ItemKind, String), ItemId>,
    taken: HashSet<String>,
}

impl<'a> GraphBuilder<'a> {
    pub fn build(doc: &'a SchemaDocument) -> Result<SchemaGraph, SchemaError> {
        let mut builder = Self {
            doc,
            graph: SchemaGraph::new(),
            ids: HashMap::new(),
            taken: HashSet::new(),
        };
        builder.register_items()?;
        builder.link_classes()?;
        builder.link_slot_ranges()?;
        builder.link_variables()?;

        tracing::debug!(
            items = builder.graph.item_count(),
            edges = builder.graph.edge_count(),
            "schema graph built"
        );
        Ok(builder.graph)
    }

    // ------------------------------------------------------------------
    // Item registration
    // ------------------------------------------------------------------

    fn register(&mut self, kind: ItemKind, name: &str, meta: ItemMeta) -> Result<(), SchemaError> {
        // Namespacing only disambiguates across kinds. Two items of the
        // same kind with the same name (possible for variables, which
        // arrive as a list) would fight over one resolution entry.
        if self.ids.contains_key(&(kind, name.to_string())) {
            return Err(SchemaError::DuplicateItem(ItemId::new(name)));
        }
        let id = if self.taken.contains(name) {
            // Names double as ids; a collision across kinds gets namespaced
            // so ids stay unique graph-wide.
            let namespaced = format!("{}:{}", kind_prefix(kind), name);
            tracing::warn!(name, id = %namespaced, "item name collides across kinds");
            ItemId::new(namespaced)
        } else {
            self.taken.insert(name.to_string());
            ItemId::new(name)
        };
        self.ids.insert((kind, name.to_string()), id.clone());
        self.graph.insert_item(Item {
            id,
            name: name.to_string(),
            meta,
        })
    }

    fn register_items(&mut self) -> Result<(), SchemaError> {
        for (name, def) in &self.doc.classes {
            self.register(
                ItemKind::Class,
                name,
                ItemMeta::Class {
                    parent: def.parent.clone(),
                    is_abstract: def.is_abstract,
                    description: def.description.clone(),
                },
            )?;
        }
        for (name, def) in &self.doc.enums {
            self.register(
                ItemKind::Enum,
                name,
                ItemMeta::Enum {
                    permissible_values: def.permissible_values.keys().cloned().collect(),
                    description: def.description.clone(),
                },
            )?;
        }
        for (name, def) in &self.doc.types {
            self.register(
                ItemKind::Type,
                name,
                ItemMeta::Type {
                    uri: def.uri.clone(),
                    base: def.base.clone(),
                    description: def.description.clone(),
                },
            )?;
        }

        // Base slots: the declared top-level slots first, then any inline
        // class attribute that is not shadowing an existing slot name.
        for (name, def) in &self.doc.slots {
            self.register(ItemKind::Slot, name, slot_meta_from_def(def, None))?;
        }
        for class in self.doc.classes.values() {
            for (name, attr) in &class.attributes {
                if !self.ids.contains_key(&(ItemKind::Slot, name.clone())) {
                    self.register(ItemKind::Slot, name, slot_meta_from_attr(attr, None))?;
                }
            }
        }
        // A slot referenced by name but declared nowhere still gets an item
        // so the class -> slot hop resolves; it just has no range edge.
        for (class_name, class) in &self.doc.classes {
            for name in &class.slots {
                if !self.ids.contains_key(&(ItemKind::Slot, name.clone())) {
                    tracing::warn!(class = %class_name, slot = %name, "referenced slot has no declaration");
                    self.register(ItemKind::Slot, name, slot_meta_from_attr(&Default::default(), None))?;
                }
            }
        }

        // Refinement instances, id `{slot}-{Class}`, pointing back at their
        // base slot. The instance carries the merged definition (inherited
        // values overwritten by the `slot_usage` fields), so a refinement
        // that only flips `required` still keeps the inherited range and
        // its slot -> range hop.
        for (class_name, class) in &self.doc.classes {
            for (slot_name, usage) in &class.slot_usage {
                if !self.ids.contains_key(&(ItemKind::Slot, slot_name.clone())) {
                    tracing::warn!(
                        class = %class_name,
                        slot = %slot_name,
                        "slot_usage refines a slot that is declared nowhere; skipping"
                    );
                    continue;
                }
                let (mut range, mut required, mut multivalued) =
                    self.merged_base_values(class_name, slot_name);
                if usage.range.is_some() {
                    range = usage.range.clone();
                }
                if usage.required.is_some() {
                    required = usage.required;
                }
                if usage.multivalued.is_some() {
                    multivalued = usage.multivalued;
                }
                let instance = format!("{slot_name}-{class_name}");
                self.register(
                    ItemKind::Slot,
                    &instance,
                    ItemMeta::Slot {
                        range,
                        required,
                        multivalued,
                        identifier: usage.identifier,
                        slot_uri: None,
                        overrides: Some(slot_name.clone()),
                        description: usage.description.clone(),
                    },
                )?;
            }
        }

        for variable in &self.doc.variables {
            self.register(
                ItemKind::Variable,
                &variable.label,
                ItemMeta::Variable {
                    mapped_class: variable.class_name.clone(),
                    data_type: variable.data_type.clone(),
                    unit: variable.unit.clone(),
                    curie: variable.curie.clone(),
                },
            )?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    fn link_classes(&mut self) -> Result<(), SchemaError> {
        for (class_name, class) in &self.doc.classes {
            let class_id = self.ids[&(ItemKind::Class, class_name.clone())].clone();

            if let Some(parent) = &class.parent {
                let parent_id = self.resolve(ItemKind::Class, parent).ok_or_else(|| {
                    SchemaError::DanglingEdge {
                        kind: EdgeKind::Inheritance,
                        owner: class_id.clone(),
                        missing: parent.clone(),
                    }
                })?;
                self.graph.push_edge(Edge::new(
                    class_id.clone(),
                    parent_id,
                    EdgeKind::Inheritance,
                ))?;
            }

            for attr in self.effective_attrs(class_name) {
                // Three-panel first hop, always materialized.
                self.graph.push_edge(Edge {
                    source: class_id.clone(),
                    target: attr.slot_item.clone(),
                    kind: EdgeKind::ClassSlot,
                    label: Some(attr.label.clone()),
                    inherited_from: attr.inherited_from.clone(),
                    required: attr.required,
                    multivalued: attr.multivalued,
                })?;

                // Two-panel direct hop.
                let Some(range) = &attr.range else {
                    tracing::debug!(class = %class_name, slot = %attr.label, "attribute has no range");
                    continue;
                };
                let target =
                    self.resolve_range(range)
                        .ok_or_else(|| SchemaError::DanglingEdge {
                            kind: EdgeKind::ClassRange,
                            owner: class_id.clone(),
                            missing: range.clone(),
                        })?;
                self.graph.push_edge(Edge {
                    source: class_id.clone(),
                    target,
                    kind: EdgeKind::ClassRange,
                    label: Some(attr.label),
                    inherited_from: attr.inherited_from,
                    required: attr.required,
                    multivalued: attr.multivalued,
                })?;
            }
        }
        Ok(())
    }

    /// Three-panel second hop: one edge per slot item with a range.
    fn link_slot_ranges(&mut self) -> Result<(), SchemaError> {
        let slots: Vec<(ItemId, String, Option<bool>, Option<bool>, String)> = self
            .graph
            .items()
            .filter_map(|item| match &item.meta {
                ItemMeta::Slot {
                    range: Some(range),
                    required,
                    multivalued,
                    ..
                } => Some((
                    item.id.clone(),
                    item.name.clone(),
                    *required,
                    *multivalued,
                    range.clone(),
                )),
                _ => None,
            })
            .collect();

        for (slot_id, name, required, multivalued, range) in slots {
            let target = self
                .resolve_range(&range)
                .ok_or_else(|| SchemaError::DanglingEdge {
                    kind: EdgeKind::SlotRange,
                    owner: slot_id.clone(),
                    missing: range.clone(),
                })?;
            self.graph.push_edge(Edge {
                source: slot_id,
                target,
                kind: EdgeKind::SlotRange,
                label: Some(name),
                inherited_from: None,
                required,
                multivalued,
            })?;
        }
        Ok(())
    }

    fn link_variables(&mut self) -> Result<(), SchemaError> {
        for variable in &self.doc.variables {
            let Some(class_name) = &variable.class_name else {
                continue;
            };
            let source = self.ids[&(ItemKind::Variable, variable.label.clone())].clone();
            let target = self.resolve(ItemKind::Class, class_name).ok_or_else(|| {
                SchemaError::DanglingEdge {
                    kind: EdgeKind::MapsTo,
                    owner: source.clone(),
                    missing: class_name.clone(),
                }
            })?;
            self.graph
                .push_edge(Edge::new(source, target, EdgeKind::MapsTo))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inheritance walk
    // ------------------------------------------------------------------

    /// Ancestors of `class_name`, nearest first, with cycle protection.
    fn ancestors(&self, class_name: &str) -> Vec<&'a str> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(class_name.to_string());
        let mut current = self
            .doc
            .classes
            .get(class_name)
            .and_then(|c| c.parent.as_deref());
        while let Some(parent) = current {
            if !seen.insert(parent.to_string()) {
                tracing::warn!(class = %class_name, "inheritance cycle detected; truncating walk");
                break;
            }
            chain.push(parent);
            current = self
                .doc
                .classes
                .get(parent)
                .and_then(|c| c.parent.as_deref());
        }
        chain
    }

    /// The class's own attributes and referenced slots, then everything it
    /// inherits. Values come from the nearest declaration; `inherited_from`
    /// names the original definer (the furthest declaring ancestor).
    /// `slot_usage` on the class overwrites the merged values in place.
    fn effective_attrs(&self, class_name: &str) -> Vec<EffectiveAttr> {
        let class = &self.doc.classes[class_name];
        let mut out: Vec<EffectiveAttr> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        let push = |label: &str,
                        range: Option<String>,
                        required: Option<bool>,
                        multivalued: Option<bool>,
                        inherited_from: Option<String>,
                        out: &mut Vec<EffectiveAttr>| {
            out.push(EffectiveAttr {
                label: label.to_string(),
                range,
                required,
                multivalued,
                inherited_from,
                slot_item: self.ids[&(ItemKind::Slot, label.to_string())].clone(),
            });
        };

        for (label, attr) in &class.attributes {
            seen.insert(label.clone());
            push(
                label,
                attr.range.clone(),
                attr.required,
                attr.multivalued,
                None,
                &mut out,
            );
        }
        for label in &class.slots {
            if !seen.insert(label.clone()) {
                continue;
            }
            let def = self.doc.slots.get(label).cloned().unwrap_or_default();
            push(
                label,
                def.range,
                def.required,
                def.multivalued,
                None,
                &mut out,
            );
        }

        let chain = self.ancestors(class_name);
        for (position, ancestor) in chain.iter().enumerate() {
            let Some(ancestor_def) = self.doc.classes.get(*ancestor) else {
                continue;
            };
            let labels = ancestor_def
                .attributes
                .keys()
                .cloned()
                .chain(ancestor_def.slots.iter().cloned());
            for label in labels {
                if !seen.insert(label.clone()) {
                    continue;
                }
                let (range, required, multivalued) = self.declared_values(ancestor_def, &label);
                // Attribution goes to the original definer, not the nearest
                // redeclaring ancestor.
                let definer = chain[position..]
                    .iter()
                    .rev()
                    .find(|a| self.declares(a, &label))
                    .copied()
                    .unwrap_or(*ancestor);
                push(
                    &label,
                    range,
                    required,
                    multivalued,
                    Some(definer.to_string()),
                    &mut out,
                );
            }
        }

        // Refinement overwrites the single merged entry; it never adds one.
        for attr in &mut out {
            if let Some(usage) = class.slot_usage.get(&attr.label) {
                if usage.range.is_some() {
                    attr.range = usage.range.clone();
                }
                if usage.required.is_some() {
                    attr.required = usage.required;
                }
                if usage.multivalued.is_some() {
                    attr.multivalued = usage.multivalued;
                }
                let instance = format!("{}-{}", attr.label, class_name);
                if let Some(id) = self.ids.get(&(ItemKind::Slot, instance)) {
                    attr.slot_item = id.clone();
                }
            }
        }
        out
    }

    fn declares(&self, class_name: &str, label: &str) -> bool {
        self.doc
            .classes
            .get(class_name)
            .is_some_and(|c| c.attributes.contains_key(label) || c.slots.iter().any(|s| s == label))
    }

    /// Values for `label` as seen from `class_name` before any `slot_usage`
    /// is applied: the nearest declaration in the inheritance chain wins,
    /// falling back to the top-level slot definition.
    fn merged_base_values(
        &self,
        class_name: &str,
        label: &str,
    ) -> (Option<String>, Option<bool>, Option<bool>) {
        if self.declares(class_name, label) {
            return self.declared_values(&self.doc.classes[class_name], label);
        }
        for ancestor in self.ancestors(class_name) {
            if self.declares(ancestor, label) {
                return self.declared_values(&self.doc.classes[ancestor], label);
            }
        }
        let def = self.doc.slots.get(label).cloned().unwrap_or_default();
        (def.range, def.required, def.multivalued)
    }

    fn declared_values(
        &self,
        class: &schemascope_core::ClassDef,
        label: &str,
    ) -> (Option<String>, Option<bool>, Option<bool>) {
        if let Some(attr) = class.attributes.get(label) {
            return (attr.range.clone(), attr.required, attr.multivalued);
        }
        let def = self.doc.slots.get(label).cloned().unwrap_or_default();
        (def.range, def.required, def.multivalued)
    }

    // ------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------

    fn resolve(&self, kind: ItemKind, name: &str) -> Option<ItemId> {
        self.ids.get(&(kind, name.to_string())).cloned()
    }

    /// A range names a class, an enum, or a primitive type.
    fn resolve_range(&self, name: &str) -> Option<ItemId> {
        [ItemKind::Class, ItemKind::Enum, ItemKind::Type]
            .into_iter()
            .find_map(|kind| self.resolve(kind, name))
    }
}

fn kind_prefix(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Class => "class",
        ItemKind::Enum => "enum",
        ItemKind::Slot => "slot",
        ItemKind::Type => "type",
        ItemKind::Variable => "variable",
    }
}

fn slot_meta_from_def(def: &SlotDef, overrides: Option<String>) -> ItemMeta {
    ItemMeta::Slot {
        range: def.range.clone(),
        required: def.required,
        multivalued: def.multivalued,
        identifier: def.identifier,
        slot_uri: def.slot_uri.clone(),
        overrides,
        description: def.description.clone(),
    }
}

fn slot_meta_from_attr(attr: &AttributeDef, overrides: Option<String>) -> ItemMeta {
    ItemMeta::Slot {
        range: attr.range.clone(),
        required: attr.required,
        multivalued: attr.multivalued,
        identifier: attr.identifier,
        slot_uri: None,
        overrides,
        description: attr.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemascope_core::SchemaDocument;

    fn doc(json: &str) -> SchemaDocument {
        SchemaDocument::from_json_str(json).unwrap()
    }

    #[test]
    fn every_edge_resolves_and_inheritance_is_single() {
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": {
                    "Entity": { "attributes": { "id": { "range": "string", "required": true } } },
                    "Specimen": { "is_a": "Entity" }
                },
                "types": { "string": {} }
            }"#,
        ))
        .unwrap();

        for edge in graph.edges() {
            assert!(graph.item(&edge.source).is_some(), "dangling source");
            assert!(graph.item(&edge.target).is_some(), "dangling target");
        }
        let inheritance = graph.edges_touching(&ItemId::from("Specimen"), &[EdgeKind::Inheritance]);
        assert_eq!(inheritance.len(), 1);
        assert_eq!(inheritance[0].target, ItemId::from("Entity"));
    }

    #[test]
    fn inherited_attribute_carries_the_defining_ancestor() {
        // C extends B extends A; A declares s; C refines required.
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": {
                    "A": { "attributes": { "s": { "range": "string" } } },
                    "B": { "is_a": "A" },
                    "C": { "is_a": "B", "slot_usage": { "s": { "required": true } } }
                },
                "types": { "string": {} }
            }"#,
        ))
        .unwrap();

        let edges = graph.edges_touching(&ItemId::from("C"), &[EdgeKind::ClassRange]);
        assert_eq!(edges.len(), 1);
        let edge = edges[0];
        assert_eq!(edge.label.as_deref(), Some("s"));
        assert_eq!(edge.inherited_from.as_deref(), Some("A"));
        assert_eq!(edge.required, Some(true));

        // Refinement also materializes the `{slot}-{Class}` instance and
        // routes the three-panel hop through it.
        let hops = graph.edges_touching(&ItemId::from("C"), &[EdgeKind::ClassSlot]);
        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].target, ItemId::from("s-C"));
        let instance = graph.item(&ItemId::from("s-C")).unwrap();
        assert!(matches!(
            &instance.meta,
            ItemMeta::Slot {
                overrides: Some(base),
                required: Some(true),
                range: Some(range),
                ..
            } if base == "s" && range == "string"
        ));

        // The instance inherits the range it did not override, so the
        // second hop of the chain exists too.
        let ranges = graph.edges_touching(&ItemId::from("s-C"), &[EdgeKind::SlotRange]);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].target, ItemId::from("string"));
    }

    #[test]
    fn specimen_entity_scenario_from_the_viewer() {
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": {
                    "Entity": { "attributes": { "id": { "range": "string", "required": true } } },
                    "Specimen": {
                        "is_a": "Entity",
                        "attributes": { "specimen_type": { "range": "SpecimenTypeEnum" } }
                    }
                },
                "enums": { "SpecimenTypeEnum": { "permissible_values": { "tissue": {} } } },
                "types": { "string": {} }
            }"#,
        ))
        .unwrap();

        let mut edges = graph.edges_touching(&ItemId::from("Specimen"), &[EdgeKind::ClassRange]);
        edges.sort_by_key(|e| e.label.clone());
        assert_eq!(edges.len(), 2);

        assert_eq!(edges[0].label.as_deref(), Some("id"));
        assert_eq!(edges[0].target, ItemId::from("string"));
        assert_eq!(edges[0].inherited_from.as_deref(), Some("Entity"));

        assert_eq!(edges[1].label.as_deref(), Some("specimen_type"));
        assert_eq!(edges[1].target, ItemId::from("SpecimenTypeEnum"));
        assert_eq!(edges[1].inherited_from, None);
    }

    #[test]
    fn self_referencing_range_is_retained_and_flagged() {
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": {
                    "Container": { "attributes": { "parent_container": { "range": "Container" } } }
                }
            }"#,
        ))
        .unwrap();

        let edges = graph.edges_touching(&ItemId::from("Container"), &[EdgeKind::ClassRange]);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].is_self_reference());
    }

    #[test]
    fn unknown_range_fails_the_build_loudly() {
        let err = GraphBuilder::build(&doc(
            r#"{
                "classes": {
                    "Specimen": { "attributes": { "site": { "range": "AnatomicalSiteEnum" } } }
                }
            }"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DanglingEdge { missing, .. } if missing == "AnatomicalSiteEnum"
        ));
    }

    #[test]
    fn variables_map_to_their_classes() {
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": { "Specimen": {} },
                "variables": [
                    { "label": "specimen kind", "class": "Specimen", "data_type": "string" }
                ]
            }"#,
        ))
        .unwrap();

        let edges = graph.edges_touching(&ItemId::from("specimen kind"), &[EdgeKind::MapsTo]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, ItemId::from("Specimen"));
    }

    #[test]
    fn duplicate_variable_labels_fail_the_build() {
        let err = GraphBuilder::build(&doc(
            r#"{
                "classes": { "Specimen": {} },
                "variables": [
                    { "label": "storage temperature", "class": "Specimen" },
                    { "label": "storage temperature", "class": "Specimen" }
                ]
            }"#,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::DuplicateItem(id) if id.as_str() == "storage temperature"
        ));
    }

    #[test]
    fn cross_kind_name_collision_is_namespaced() {
        let graph = GraphBuilder::build(&doc(
            r#"{
                "classes": { "Code": {} },
                "enums": { "Code": {} }
            }"#,
        ))
        .unwrap();

        assert_eq!(graph.item_count(), 2);
        assert!(graph.item(&ItemId::from("Code")).is_some());
        assert!(graph.item(&ItemId::from("enum:Code")).is_some());
    }
}
