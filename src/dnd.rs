//! Drag/drop coordination between tool panels and canvases.
//!
//! One `DragDropRegistry` is owned by the UI coordinator and handed by reference to both
//! drag sources and drop targets, so neither side needs to know about the other. At most
//! one item is in flight at a time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub data: Value,
}

impl DragItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: item_type.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Copy stashed on the native data-transfer channel. Best effort; the registry
    /// never reads it back.
    pub fn to_transfer_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

pub type DropHandler = Box<dyn FnMut(DragItem) + Send>;

pub struct DropZone {
    pub id: String,
    pub accepts: HashSet<String>,
    on_drop: DropHandler,
}

impl DropZone {
    pub fn new<I, S, F>(id: impl Into<String>, accepts: I, on_drop: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(DragItem) + Send + 'static,
    {
        Self {
            id: id.into(),
            accepts: accepts.into_iter().map(Into::into).collect(),
            on_drop: Box::new(on_drop),
        }
    }

    fn accepts(&self, item: &DragItem) -> bool {
        self.accepts.contains(&item.item_type)
    }
}

impl std::fmt::Debug for DropZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropZone")
            .field("id", &self.id)
            .field("accepts", &self.accepts)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DragDropRegistry {
    dragged: Option<DragItem>,
    zones: HashMap<String, DropZone>,
}

impl DragDropRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-registering an id replaces the previous zone.
    pub fn register_drop_zone(&mut self, zone: DropZone) {
        self.zones.insert(zone.id.clone(), zone);
    }

    pub fn unregister_drop_zone(&mut self, id: &str) {
        self.zones.remove(id);
    }

    pub fn start_drag(&mut self, item: DragItem) {
        self.dragged = Some(item);
    }

    /// Must run on every drag-end path (drop, cancel, pointer leave).
    pub fn end_drag(&mut self) {
        self.dragged = None;
    }

    pub fn dragged_item(&self) -> Option<&DragItem> {
        self.dragged.as_ref()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn can_drop(&self, zone_id: &str) -> bool {
        match (&self.dragged, self.zones.get(zone_id)) {
            (Some(item), Some(zone)) => zone.accepts(item),
            _ => false,
        }
    }

    /// Hands the in-flight item to the zone's callback and clears it. Returns `false`
    /// and changes nothing when `can_drop` would be false.
    pub fn handle_drop(&mut self, zone_id: &str) -> bool {
        if !self.can_drop(zone_id) {
            return false;
        }
        let (Some(item), Some(zone)) = (self.dragged.take(), self.zones.get_mut(zone_id)) else {
            return false;
        };
        tracing::debug!(zone = zone_id, item = %item.id, item_type = %item.item_type, "Item dropped");
        (zone.on_drop)(item);
        true
    }
}
