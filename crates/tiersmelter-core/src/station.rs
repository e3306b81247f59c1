//! The port through which the scheduler sees live station inventories.
//!
//! Hosts implement [`StationBridge`] over their world. The scheduler never
//! caches what it reads here: every tick it resolves the station again and
//! re-reads all three slots, because players and other systems may edit them
//! between ticks.

use crate::id::StationKey;
use crate::item::ItemStack;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three slots of a smelting station, in host slot-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Input = 0,
    Fuel = 1,
    Output = 2,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Input, Slot::Fuel, Slot::Output];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Block kinds that can host a tiered smelting job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    #[default]
    BlastFurnace,
    Furnace,
    Smoker,
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StationKind::BlastFurnace => "blast_furnace",
            StationKind::Furnace => "furnace",
            StationKind::Smoker => "smoker",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown station kind '{0}'")]
pub struct UnknownStationKind(pub String);

impl FromStr for StationKind {
    type Err = UnknownStationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blast_furnace" => Ok(StationKind::BlastFurnace),
            "furnace" => Ok(StationKind::Furnace),
            "smoker" => Ok(StationKind::Smoker),
            _ => Err(UnknownStationKind(s.to_string())),
        }
    }
}

/// A live station handle.
pub trait Station {
    fn kind(&self) -> StationKind;

    /// Contents of a slot, or `None` when it is empty.
    fn slot(&self, slot: Slot) -> Option<ItemStack>;

    /// Overwrite a slot. Stacks with quantity zero are written as empty.
    fn set_slot(&mut self, slot: Slot, stack: Option<ItemStack>);
}

/// Resolves station locations to live stations.
pub trait StationBridge {
    type Station: Station;

    /// The live station at `location`, or `None` if the block no longer holds
    /// a station.
    fn resolve(&mut self, location: &StationKey) -> Option<&mut Self::Station>;
}
