//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::{ItemTypeId, StationKey};
use crate::item::ItemStack;
use crate::smelter::{ConversionDecision, Smelter, SmelterSettings};
use crate::station::{Slot, StationKind};
use crate::world::MemoryWorld;

// ===========================================================================
// Item types
// ===========================================================================

pub fn ore() -> ItemTypeId {
    ItemTypeId(10)
}
pub fn coal() -> ItemTypeId {
    ItemTypeId(12)
}
pub fn ingot() -> ItemTypeId {
    ItemTypeId(20)
}

pub fn stack(item: ItemTypeId, quantity: u32) -> ItemStack {
    ItemStack::new(item, quantity)
}

// ===========================================================================
// Stations
// ===========================================================================

/// A station in the default test world, offset along x.
pub fn station(x: i32) -> StationKey {
    StationKey::new("world", x, 64, 0)
}

/// Place a blast furnace with the given input ore and coal counts.
/// Zero leaves the slot empty.
pub fn place_furnace(world: &mut MemoryWorld, key: &StationKey, input: u32, fuel: u32) {
    world.place(key.clone(), StationKind::BlastFurnace);
    if input > 0 {
        world.set_slot(key, Slot::Input, Some(stack(ore(), input)));
    }
    if fuel > 0 {
        world.set_slot(key, Slot::Fuel, Some(stack(coal(), fuel)));
    }
}

// ===========================================================================
// Smelter setup
// ===========================================================================

/// A default smelter with one tier named `basic` of `seconds` duration.
pub fn smelter_with_tier(seconds: f64) -> Smelter {
    let mut smelter = Smelter::new(SmelterSettings::default());
    smelter.tiers_mut().create("basic", seconds).unwrap();
    smelter
}

/// Assign `key` to the `basic` tier.
pub fn assign_basic(smelter: &mut Smelter, key: &StationKey) {
    smelter.assignments_mut().set(key.clone(), "basic");
}

/// Simulate the host's conversion hook firing for an ore -> ingot smelt.
pub fn trigger(smelter: &mut Smelter, key: &StationKey) -> ConversionDecision {
    smelter.on_conversion_requested(
        key.clone(),
        key.clone(),
        StationKind::BlastFurnace,
        ore(),
        stack(ingot(), 1),
    )
}

/// Smelter plus world with `count` tiered, fuelled, fully loaded stations,
/// each already triggered.
pub fn busy_setup(count: i32, seconds: f64, input: u32) -> (Smelter, MemoryWorld) {
    let mut smelter = smelter_with_tier(seconds);
    let mut world = MemoryWorld::new();
    for x in 0..count {
        let key = station(x);
        place_furnace(&mut world, &key, input, 1);
        assign_basic(&mut smelter, &key);
        trigger(&mut smelter, &key);
    }
    (smelter, world)
}
