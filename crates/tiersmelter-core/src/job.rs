//! The smelting job queue: one resumable countdown per tiered station.
//!
//! Every tick [`JobQueue::advance_all`] re-resolves each station and re-reads
//! its slots through the [`StationBridge`]. Nothing read on a previous tick is
//! trusted, since players and other systems edit station inventories between
//! ticks. Precondition failures are ordinary outcomes, never errors:
//!
//! - missing fuel or a full output slot pauses the job for this tick;
//! - a missing station, a changed input, or an exhausted input removes it.

use crate::event::{Event, EventBus, RemovalReason, StallReason};
use crate::fixed::Ticks;
use crate::id::{ItemTypeId, StationKey, StationLocation};
use crate::item::ItemStack;
use crate::station::{Slot, Station, StationBridge, StationKind};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Whether the job advanced on its most recent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobStatus {
    #[default]
    Working,
    Stalled {
        reason: StallReason,
    },
}

/// One in-progress conversion at one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmeltJob {
    pub station_key: StationKey,
    pub station_location: StationLocation,
    /// What one conversion yields. Captured from the host's default result
    /// because the native conversion is suppressed for tiered stations.
    pub expected_output: ItemStack,
    /// Item that must stay in the input slot for the job to live.
    pub input_signature: ItemTypeId,
    /// Fixed at creation; later tier edits do not affect this job.
    pub required_ticks: Ticks,
    pub progress_ticks: Ticks,
    pub status: JobStatus,
}

impl SmeltJob {
    /// Completion fraction of the current unit, in `[0, 1)`.
    pub fn progress_fraction(&self) -> f64 {
        self.progress_ticks as f64 / self.required_ticks.max(1) as f64
    }
}

// ---------------------------------------------------------------------------
// Advance report
// ---------------------------------------------------------------------------

/// What happened during one [`JobQueue::advance_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Jobs whose progress increased.
    pub advanced: usize,
    /// Jobs paused for missing fuel or a full output.
    pub stalled: usize,
    /// Input units converted.
    pub units_smelted: usize,
    /// Jobs removed, with the reason.
    pub removed: Vec<(StationKey, RemovalReason)>,
}

/// Per-job result of a single tick.
enum Outcome {
    Advanced,
    Smelted { deposited: bool, exhausted: bool },
    Stalled(StallReason),
    Removed(RemovalReason),
}

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// Active jobs keyed by station. At most one job per station.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    jobs: BTreeMap<StationKey, SmeltJob>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job unless the station already has one. Returns `true` if a
    /// job was created.
    pub fn create_or_ignore(
        &mut self,
        station_key: StationKey,
        station_location: StationLocation,
        expected_output: ItemStack,
        input_signature: ItemTypeId,
        required_ticks: Ticks,
    ) -> bool {
        if self.jobs.contains_key(&station_key) {
            return false;
        }
        tracing::debug!(station = %station_key, required_ticks, "smelt job created");
        self.jobs.insert(
            station_key.clone(),
            SmeltJob {
                station_key,
                station_location,
                expected_output,
                input_signature,
                required_ticks: required_ticks.max(1),
                progress_ticks: 0,
                status: JobStatus::Working,
            },
        );
        true
    }

    /// Remove a job directly (e.g. when the host reports the block destroyed).
    pub fn remove(&mut self, station_key: &StationKey) -> Option<SmeltJob> {
        self.jobs.remove(station_key)
    }

    pub fn get(&self, station_key: &StationKey) -> Option<&SmeltJob> {
        self.jobs.get(station_key)
    }

    pub fn contains(&self, station_key: &StationKey) -> bool {
        self.jobs.contains_key(station_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmeltJob> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Advance every job by one tick. Must be called exactly once per tick.
    ///
    /// Removals are collected during the scan and applied afterwards. Jobs are
    /// independent, so the visiting order has no observable effect.
    pub fn advance_all<B: StationBridge>(
        &mut self,
        bridge: &mut B,
        expected_kind: StationKind,
        events: &mut EventBus,
        tick: Ticks,
    ) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        for job in self.jobs.values_mut() {
            let outcome = advance_job(job, bridge, expected_kind);

            if matches!(outcome, Outcome::Advanced | Outcome::Smelted { .. }) {
                report.advanced += 1;
                if job.status != JobStatus::Working {
                    job.status = JobStatus::Working;
                    tracing::debug!(station = %job.station_key, "smelt job resumed");
                    events.emit(Event::JobResumed {
                        station: job.station_key.clone(),
                        tick,
                    });
                }
            }

            match outcome {
                Outcome::Advanced => {}
                Outcome::Smelted {
                    deposited,
                    exhausted,
                } => {
                    report.units_smelted += 1;
                    events.emit(Event::UnitSmelted {
                        station: job.station_key.clone(),
                        output: job.expected_output.item_type,
                        deposited,
                        tick,
                    });
                    if exhausted {
                        report
                            .removed
                            .push((job.station_key.clone(), RemovalReason::InputExhausted));
                    }
                }
                Outcome::Stalled(reason) => {
                    report.stalled += 1;
                    let status = JobStatus::Stalled { reason };
                    if job.status != status {
                        job.status = status;
                        tracing::debug!(station = %job.station_key, ?reason, "smelt job stalled");
                        events.emit(Event::JobStalled {
                            station: job.station_key.clone(),
                            reason,
                            tick,
                        });
                    }
                }
                Outcome::Removed(reason) => {
                    report.removed.push((job.station_key.clone(), reason));
                }
            }
        }

        for (key, reason) in &report.removed {
            self.jobs.remove(key);
            tracing::debug!(station = %key, ?reason, "smelt job removed");
            events.emit(Event::JobRemoved {
                station: key.clone(),
                reason: *reason,
                tick,
            });
        }

        tracing::trace!(
            tick,
            active = self.jobs.len(),
            advanced = report.advanced,
            stalled = report.stalled,
            smelted = report.units_smelted,
            "job queue advanced"
        );
        report
    }
}

/// One tick of one job against live station state.
fn advance_job<B: StationBridge>(
    job: &mut SmeltJob,
    bridge: &mut B,
    expected_kind: StationKind,
) -> Outcome {
    let Some(station) = bridge.resolve(&job.station_location) else {
        return Outcome::Removed(RemovalReason::StationMissing);
    };
    if station.kind() != expected_kind {
        return Outcome::Removed(RemovalReason::StationMissing);
    }

    let input = station.slot(Slot::Input);
    let fuel = station.slot(Slot::Fuel);
    let output = station.slot(Slot::Output);

    // Fuel is checked but never consumed.
    if fuel.as_ref().is_none_or(|f| f.quantity == 0) {
        return Outcome::Stalled(StallReason::NoFuel);
    }

    let Some(input) = input.filter(|i| i.is_same_item(job.input_signature)) else {
        return Outcome::Removed(RemovalReason::InputChanged);
    };

    // Capacity is measured against the expected item's stack limit even when
    // the output slot holds something else.
    let current_output = output.as_ref().map(|o| o.quantity).unwrap_or(0);
    if job.expected_output.free_capacity(current_output) <= 0 {
        return Outcome::Stalled(StallReason::OutputFull);
    }

    job.progress_ticks += 1;
    if job.progress_ticks < job.required_ticks {
        return Outcome::Advanced;
    }

    if input.quantity == 0 {
        return Outcome::Removed(RemovalReason::InputExhausted);
    }

    let remaining = input.quantity - 1;
    station.set_slot(Slot::Input, Some(input.with_quantity(remaining)));

    let deposited = match output {
        None => {
            station.set_slot(Slot::Output, Some(job.expected_output.with_quantity(1)));
            true
        }
        Some(existing) if existing.is_same_item(job.expected_output.item_type) => {
            let quantity = existing.quantity + 1;
            station.set_slot(Slot::Output, Some(existing.with_quantity(quantity)));
            true
        }
        // Mismatched output: the unit is consumed but not deposited.
        Some(_) => false,
    };

    job.progress_ticks = 0;
    Outcome::Smelted {
        deposited,
        exhausted: remaining == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MemoryWorld;

    fn ore() -> ItemTypeId {
        ItemTypeId(10)
    }
    fn ingot() -> ItemTypeId {
        ItemTypeId(20)
    }
    fn coal() -> ItemTypeId {
        ItemTypeId(12)
    }

    fn key() -> StationKey {
        StationKey::new("world", 0, 64, 0)
    }

    fn setup(input: u32, fuel: u32, required_ticks: Ticks) -> (JobQueue, MemoryWorld) {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::BlastFurnace);
        world.set_slot(&key(), Slot::Input, Some(ItemStack::new(ore(), input)));
        world.set_slot(&key(), Slot::Fuel, Some(ItemStack::new(coal(), fuel)));

        let mut queue = JobQueue::new();
        assert!(queue.create_or_ignore(
            key(),
            key(),
            ItemStack::new(ingot(), 1),
            ore(),
            required_ticks,
        ));
        (queue, world)
    }

    fn tick(queue: &mut JobQueue, world: &mut MemoryWorld) -> AdvanceReport {
        let mut events = EventBus::default();
        queue.advance_all(world, StationKind::BlastFurnace, &mut events, 0)
    }

    #[test]
    fn create_or_ignore_keeps_first_job() {
        let (mut queue, _world) = setup(5, 1, 10);
        assert!(!queue.create_or_ignore(key(), key(), ItemStack::new(ore(), 1), ore(), 99));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get(&key()).unwrap().required_ticks, 10);
    }

    #[test]
    fn completes_after_required_ticks() {
        let (mut queue, mut world) = setup(5, 1, 3);
        tick(&mut queue, &mut world);
        tick(&mut queue, &mut world);
        assert_eq!(world.quantity(&key(), Slot::Output), 0);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.units_smelted, 1);
        assert_eq!(world.quantity(&key(), Slot::Input), 4);
        assert_eq!(world.quantity(&key(), Slot::Output), 1);
        assert_eq!(queue.get(&key()).unwrap().progress_ticks, 0);
    }

    #[test]
    fn progress_fraction_tracks_current_unit() {
        let (mut queue, mut world) = setup(5, 1, 4);
        assert_eq!(queue.get(&key()).unwrap().progress_fraction(), 0.0);
        tick(&mut queue, &mut world);
        assert_eq!(queue.get(&key()).unwrap().progress_fraction(), 0.25);
        tick(&mut queue, &mut world);
        tick(&mut queue, &mut world);
        assert_eq!(queue.get(&key()).unwrap().progress_fraction(), 0.75);
        tick(&mut queue, &mut world);
        assert_eq!(queue.get(&key()).unwrap().progress_fraction(), 0.0);
    }

    #[test]
    fn fuel_is_never_consumed() {
        let (mut queue, mut world) = setup(2, 1, 1);
        tick(&mut queue, &mut world);
        tick(&mut queue, &mut world);
        assert_eq!(world.quantity(&key(), Slot::Fuel), 1);
    }

    #[test]
    fn last_unit_removes_job() {
        let (mut queue, mut world) = setup(1, 1, 2);
        tick(&mut queue, &mut world);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.removed, vec![(key(), RemovalReason::InputExhausted)]);
        assert!(queue.is_empty());
        assert_eq!(world.quantity(&key(), Slot::Output), 1);
        assert!(world.station(&key()).unwrap().get(Slot::Input).is_none());
    }

    #[test]
    fn missing_fuel_pauses_without_removal() {
        let (mut queue, mut world) = setup(5, 0, 3);
        for _ in 0..10 {
            let report = tick(&mut queue, &mut world);
            assert_eq!(report.stalled, 1);
        }
        let job = queue.get(&key()).unwrap();
        assert_eq!(job.progress_ticks, 0);
        assert_eq!(
            job.status,
            JobStatus::Stalled {
                reason: StallReason::NoFuel
            }
        );
    }

    #[test]
    fn fuel_check_precedes_input_check() {
        // No fuel and no input: the job pauses rather than being removed.
        let (mut queue, mut world) = setup(5, 0, 3);
        world.set_slot(&key(), Slot::Input, None);
        tick(&mut queue, &mut world);
        assert!(queue.contains(&key()));
    }

    #[test]
    fn swapped_input_removes_job() {
        let (mut queue, mut world) = setup(5, 1, 10);
        tick(&mut queue, &mut world);
        world.set_slot(&key(), Slot::Input, Some(ItemStack::new(ItemTypeId(99), 5)));
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.removed, vec![(key(), RemovalReason::InputChanged)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn emptied_input_removes_job() {
        let (mut queue, mut world) = setup(5, 1, 10);
        world.set_slot(&key(), Slot::Input, None);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.removed, vec![(key(), RemovalReason::InputChanged)]);
    }

    #[test]
    fn broken_station_removes_job() {
        let (mut queue, mut world) = setup(5, 1, 10);
        world.break_block(&key());
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.removed, vec![(key(), RemovalReason::StationMissing)]);
    }

    #[test]
    fn wrong_station_kind_removes_job() {
        let (mut queue, mut world) = setup(5, 1, 10);
        world.place(key(), StationKind::Smoker);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.removed, vec![(key(), RemovalReason::StationMissing)]);
    }

    #[test]
    fn full_output_applies_back_pressure() {
        let (mut queue, mut world) = setup(5, 1, 2);
        world.set_slot(&key(), Slot::Output, Some(ItemStack::new(ingot(), 64)));
        for _ in 0..5 {
            tick(&mut queue, &mut world);
        }
        assert_eq!(queue.get(&key()).unwrap().progress_ticks, 0);

        world.set_slot(&key(), Slot::Output, Some(ItemStack::new(ingot(), 63)));
        tick(&mut queue, &mut world);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.units_smelted, 1);
        assert_eq!(world.quantity(&key(), Slot::Output), 64);
    }

    #[test]
    fn mismatched_output_consumes_without_depositing() {
        let (mut queue, mut world) = setup(5, 1, 1);
        let junk = ItemStack::new(ItemTypeId(77), 3);
        world.set_slot(&key(), Slot::Output, Some(junk.clone()));
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.units_smelted, 1);
        assert_eq!(world.quantity(&key(), Slot::Input), 4);
        assert_eq!(world.station(&key()).unwrap().get(Slot::Output), Some(&junk));
    }

    #[test]
    fn new_output_stack_copies_expected_attributes() {
        let mut world = MemoryWorld::new();
        world.place(key(), StationKind::BlastFurnace);
        world.set_slot(&key(), Slot::Input, Some(ItemStack::new(ore(), 2)));
        world.set_slot(&key(), Slot::Fuel, Some(ItemStack::new(coal(), 1)));
        let expected = ItemStack::new(ingot(), 1)
            .with_max_stack(16)
            .with_property(crate::id::PropertyId(0), crate::fixed::Fixed64::from_num(2));

        let mut queue = JobQueue::new();
        queue.create_or_ignore(key(), key(), expected.clone(), ore(), 1);
        tick(&mut queue, &mut world);

        let out = world.station(&key()).unwrap().get(Slot::Output).unwrap();
        assert_eq!(out, &expected.with_quantity(1));
    }

    #[test]
    fn stall_events_fire_on_transitions_only() {
        let (mut queue, mut world) = setup(5, 0, 10);
        let mut events = EventBus::default();
        for t in 0..3 {
            queue.advance_all(&mut world, StationKind::BlastFurnace, &mut events, t);
        }
        assert_eq!(events.total_emitted(crate::event::EventKind::JobStalled), 1);

        world.set_slot(&key(), Slot::Fuel, Some(ItemStack::new(coal(), 1)));
        queue.advance_all(&mut world, StationKind::BlastFurnace, &mut events, 3);
        queue.advance_all(&mut world, StationKind::BlastFurnace, &mut events, 4);
        assert_eq!(events.total_emitted(crate::event::EventKind::JobResumed), 1);
    }

    #[test]
    fn zero_required_ticks_is_clamped() {
        let (mut queue, mut world) = setup(3, 1, 0);
        assert_eq!(queue.get(&key()).unwrap().required_ticks, 1);
        let report = tick(&mut queue, &mut world);
        assert_eq!(report.units_smelted, 1);
    }
}
