use schemascope_core::{Edge, EdgeKind, Item, ItemId, SchemaError};
use std::collections::HashMap;

/// Typed directed graph over schema items.
///
/// Items and edges are immutable after construction; the graph is freely
/// shared across all consumers without locking. Edge positions are indexed
/// by both endpoints so `edges_touching` runs in time proportional to the
/// touched edges, not the whole edge list.
#[derive(Debug, Default)]
pub struct SchemaGraph {
    items: HashMap<ItemId, Item>,
    edges: Vec<Edge>,
    by_source: HashMap<ItemId, Vec<usize>>,
    by_target: HashMap<ItemId, Vec<usize>>,
}

impl SchemaGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_item(&mut self, item: Item) -> Result<(), SchemaError> {
        if self.items.contains_key(&item.id) {
            return Err(SchemaError::DuplicateItem(item.id));
        }
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Append an edge. Both endpoints must already be present; a dangling
    /// reference indicates malformed source data and fails the build.
    pub(crate) fn push_edge(&mut self, edge: Edge) -> Result<(), SchemaError> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.items.contains_key(endpoint) {
                return Err(SchemaError::DanglingEdge {
                    kind: edge.kind,
                    owner: edge.source.clone(),
                    missing: endpoint.to_string(),
                });
            }
        }
        let index = self.edges.len();
        self.by_source
            .entry(edge.source.clone())
            .or_default()
            .push(index);
        self.by_target
            .entry(edge.target.clone())
            .or_default()
            .push(index);
        self.edges.push(edge);
        Ok(())
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges of the requested kinds touching `id` as source or target.
    /// Self-reference edges are reported once. Unknown ids yield an empty
    /// list; callers must tolerate items filtered out of the current view.
    pub fn edges_touching(&self, id: &ItemId, kinds: &[EdgeKind]) -> Vec<&Edge> {
        let mut found = Vec::new();
        if let Some(indexes) = self.by_source.get(id) {
            for &index in indexes {
                let edge = &self.edges[index];
                if kinds.contains(&edge.kind) {
                    found.push(edge);
                }
            }
        }
        if let Some(indexes) = self.by_target.get(id) {
            for &index in indexes {
                let edge = &self.edges[index];
                if kinds.contains(&edge.kind) && !edge.is_self_reference() {
                    found.push(edge);
                }
            }
        }
        found
    }
}
