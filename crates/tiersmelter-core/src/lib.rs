//! TierSmelter Core -- tiered smelting durations for blast furnaces.
//!
//! Administrators define named tiers, each a smelt duration in seconds, and
//! assign stations to tiers. A tiered station's native conversion is
//! suppressed; instead a job counts down ticks and performs the conversion
//! itself, one input unit at a time, re-checking the station on every tick.
//!
//! # Tick Pipeline
//!
//! Each call to [`smelter::Smelter::step`] runs one quantum:
//!
//! 1. **Advance** -- every job resolves its station through the host's
//!    [`station::StationBridge`], then progresses, stalls, completes a unit,
//!    or is removed.
//! 2. **Deliver** -- buffered events reach passive listeners.
//! 3. **Bookkeeping** -- increment the tick counter.
//!
//! # Key Types
//!
//! - [`smelter::Smelter`] -- Owns registries, job queue and event bus.
//! - [`job::JobQueue`] -- One resumable countdown per station.
//! - [`registry::TierRegistry`] / [`registry::AssignmentRegistry`] -- Tier
//!   durations and per-station assignments, with dirty tracking.
//! - [`station::StationBridge`] -- Host port for resolving stations and
//!   reading/writing their slots.
//! - [`world::MemoryWorld`] -- In-memory bridge for headless runs and tests.
//! - [`command::Command`] -- Text commands that edit the registries.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for item properties.

pub mod command;
pub mod event;
pub mod fixed;
pub mod id;
pub mod item;
pub mod job;
pub mod registry;
pub mod sim;
pub mod smelter;
pub mod station;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
