//! In-memory world implementing [`StationBridge`].
//!
//! Used by the headless CLI and by tests. Out-of-band edits (a player moving
//! items, a block being broken) are made directly through [`MemoryWorld`]
//! between scheduler steps.

use crate::id::StationKey;
use crate::item::ItemStack;
use crate::station::{Slot, Station, StationBridge, StationKind};
use std::collections::BTreeMap;

/// A station's three-slot inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStation {
    pub kind: StationKind,
    slots: [Option<ItemStack>; 3],
}

impl MemoryStation {
    pub fn new(kind: StationKind) -> Self {
        Self {
            kind,
            slots: [None, None, None],
        }
    }

    /// Quantity in a slot, zero when empty.
    pub fn quantity(&self, slot: Slot) -> u32 {
        self.slots[slot.index()]
            .as_ref()
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn get(&self, slot: Slot) -> Option<&ItemStack> {
        self.slots[slot.index()].as_ref()
    }
}

impl Station for MemoryStation {
    fn kind(&self) -> StationKind {
        self.kind
    }

    fn slot(&self, slot: Slot) -> Option<ItemStack> {
        self.slots[slot.index()].clone()
    }

    fn set_slot(&mut self, slot: Slot, stack: Option<ItemStack>) {
        self.slots[slot.index()] = stack.filter(|s| !s.is_empty());
    }
}

/// Stations keyed by location.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    stations: BTreeMap<StationKey, MemoryStation>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a station block, replacing whatever was there.
    pub fn place(&mut self, key: StationKey, kind: StationKind) -> &mut MemoryStation {
        let station = self.stations.entry(key).or_default();
        *station = MemoryStation::new(kind);
        station
    }

    /// Break a station block. Returns the station that was there, if any.
    pub fn break_block(&mut self, key: &StationKey) -> Option<MemoryStation> {
        self.stations.remove(key)
    }

    pub fn station(&self, key: &StationKey) -> Option<&MemoryStation> {
        self.stations.get(key)
    }

    pub fn station_mut(&mut self, key: &StationKey) -> Option<&mut MemoryStation> {
        self.stations.get_mut(key)
    }

    /// Write a slot out-of-band. No-op if no station is at `key`.
    pub fn set_slot(&mut self, key: &StationKey, slot: Slot, stack: Option<ItemStack>) {
        if let Some(station) = self.stations.get_mut(key) {
            station.set_slot(slot, stack);
        }
    }

    pub fn quantity(&self, key: &StationKey, slot: Slot) -> u32 {
        self.stations
            .get(key)
            .map(|s| s.quantity(slot))
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl StationBridge for MemoryWorld {
    type Station = MemoryStation;

    fn resolve(&mut self, location: &StationKey) -> Option<&mut MemoryStation> {
        self.stations.get_mut(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ItemTypeId;

    fn key() -> StationKey {
        StationKey::new("world", 0, 64, 0)
    }

    #[test]
    fn place_and_resolve() {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::BlastFurnace);
        let station = world.resolve(&key()).unwrap();
        assert_eq!(station.kind(), StationKind::BlastFurnace);
        assert!(station.slot(Slot::Input).is_none());
    }

    #[test]
    fn break_block_removes_station() {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::Furnace);
        assert!(world.break_block(&key()).is_some());
        assert!(world.resolve(&key()).is_none());
        assert!(world.is_empty());
    }

    #[test]
    fn zero_quantity_writes_clear_the_slot() {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::BlastFurnace);
        world.set_slot(&key(), Slot::Input, Some(ItemStack::new(ItemTypeId(1), 0)));
        assert!(world.station(&key()).unwrap().get(Slot::Input).is_none());
    }

    #[test]
    fn replacing_a_station_clears_its_slots() {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::BlastFurnace);
        world.set_slot(&key(), Slot::Fuel, Some(ItemStack::new(ItemTypeId(2), 5)));
        world.place(key(), StationKind::Smoker);
        assert_eq!(world.quantity(&key(), Slot::Fuel), 0);
        assert_eq!(world.station(&key()).unwrap().kind, StationKind::Smoker);
    }
}
