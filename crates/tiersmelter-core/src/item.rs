use crate::fixed::Fixed64;
use crate::id::{ItemTypeId, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stack limit used when an item type does not declare its own.
pub const DEFAULT_MAX_STACK: u32 = 64;

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// A stack of fungible items with optional per-instance properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemTypeId,
    pub quantity: u32,
    /// Largest quantity a single slot may hold for this item type.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    /// Per-instance properties (e.g., quality, custom name hash).
    #[serde(default)]
    pub properties: BTreeMap<PropertyId, Fixed64>,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
            max_stack: DEFAULT_MAX_STACK,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    pub fn with_property(mut self, id: PropertyId, value: Fixed64) -> Self {
        self.properties.insert(id, value);
        self
    }

    pub fn get_property(&self, id: PropertyId) -> Option<Fixed64> {
        self.properties.get(&id).copied()
    }

    /// Identity comparison only; quantity and properties are ignored.
    pub fn is_same_item(&self, other: ItemTypeId) -> bool {
        self.item_type == other
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }

    /// Copy of this stack carrying `quantity` items.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Room left in a slot holding `current` items of this type. Negative
    /// when the slot is over-full (a host may overfill slots out-of-band).
    pub fn free_capacity(&self, current: u32) -> i64 {
        i64::from(self.max_stack) - i64::from(current)
    }
}
