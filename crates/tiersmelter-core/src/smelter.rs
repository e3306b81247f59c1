//! The smelter: owns the registries, the job queue, and the event bus, and
//! drives the per-tick scheduler.
//!
//! # Integration
//!
//! The host wires three signals into a [`Smelter`]:
//!
//! 1. **Conversion requests.** When a station is about to run its native
//!    conversion, the host calls [`Smelter::on_conversion_requested`] and
//!    cancels the native conversion if the decision says so.
//! 2. **Station destruction.** When a block is broken, the host calls
//!    [`Smelter::on_station_destroyed`].
//! 3. **The clock.** Once per host tick the host calls [`Smelter::step`] (or
//!    [`Smelter::advance`] with elapsed host ticks in delta mode), handing over
//!    a [`StationBridge`] for resolving stations and editing their slots.
//!
//! Each quantum runs:
//! 1. **Advance** -- every job re-checks its station and progresses, stalls,
//!    completes a unit, or is removed
//! 2. **Deliver** -- buffered events go to listeners
//! 3. **Bookkeeping** -- the tick counter increments

use crate::command::{Command, CommandError, CommandOutcome, Target};
use crate::event::{Event, EventBus, EventKind, PassiveListener, RemovalReason};
use crate::fixed::{DEFAULT_TICKS_PER_SECOND, Ticks, seconds_to_ticks};
use crate::id::{ItemTypeId, StationKey, StationLocation};
use crate::item::ItemStack;
use crate::job::{JobQueue, SmeltJob};
use crate::registry::{AssignmentRegistry, RegistryError, TierRegistry, normalize_tier_name};
use crate::sim::{SimState, SimulationStrategy, StepReport};
use crate::station::{StationBridge, StationKind};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Construction-time parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmelterSettings {
    /// Host ticks per second; converts tier seconds into ticks.
    pub ticks_per_second: u32,
    /// Only stations of this kind take part in tiered smelting.
    pub station_kind: StationKind,
    /// Ring buffer capacity per event kind.
    pub event_capacity: usize,
    pub strategy: SimulationStrategy,
}

impl Default for SmelterSettings {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            station_kind: StationKind::default(),
            event_capacity: 1024,
            strategy: SimulationStrategy::Tick,
        }
    }
}

/// What the host should do with a station's native conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionDecision {
    /// Not a tiered station; let the native conversion run.
    Native,
    /// Tiered station; cancel the native conversion. `job_created` is false
    /// when the station already had a job.
    Suppress { job_created: bool },
}

impl ConversionDecision {
    pub fn suppresses_native(self) -> bool {
        matches!(self, ConversionDecision::Suppress { .. })
    }
}

// ---------------------------------------------------------------------------
// Smelter
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Smelter {
    settings: SmelterSettings,
    pub sim_state: SimState,
    paused: bool,
    tiers: TierRegistry,
    assignments: AssignmentRegistry,
    queue: JobQueue,
    events: EventBus,
}

impl Smelter {
    /// Create a smelter with empty registries.
    pub fn new(settings: SmelterSettings) -> Self {
        Self::with_registries(settings, TierRegistry::new(), AssignmentRegistry::new())
    }

    /// Create a smelter around registries loaded by the host.
    pub fn with_registries(
        settings: SmelterSettings,
        tiers: TierRegistry,
        assignments: AssignmentRegistry,
    ) -> Self {
        let events = EventBus::new(settings.event_capacity);
        Self {
            settings,
            sim_state: SimState::new(),
            paused: false,
            tiers,
            assignments,
            queue: JobQueue::new(),
            events,
        }
    }

    // -----------------------------------------------------------------------
    // Intake
    // -----------------------------------------------------------------------

    /// Handle a station about to run its native conversion.
    ///
    /// Stations of another kind, unassigned stations, and stations whose tier
    /// no longer exists are left to the native behavior. Otherwise a job is
    /// created (unless one is already running) and the native conversion
    /// must be suppressed.
    pub fn on_conversion_requested(
        &mut self,
        station_key: StationKey,
        station_location: StationLocation,
        station_kind: StationKind,
        input_signature: ItemTypeId,
        default_output: ItemStack,
    ) -> ConversionDecision {
        if station_kind != self.settings.station_kind {
            return ConversionDecision::Native;
        }
        let Some(tier) = self.assignments.get(&station_key) else {
            return ConversionDecision::Native;
        };
        let Some(seconds) = self.tiers.get(tier) else {
            tracing::debug!(station = %station_key, tier, "assigned tier no longer exists");
            return ConversionDecision::Native;
        };

        let required_ticks = seconds_to_ticks(seconds, self.settings.ticks_per_second);
        let job_created = self.queue.create_or_ignore(
            station_key.clone(),
            station_location,
            default_output,
            input_signature,
            required_ticks,
        );
        if job_created {
            self.events.emit(Event::JobStarted {
                station: station_key,
                required_ticks,
                tick: self.sim_state.tick,
            });
        }
        ConversionDecision::Suppress { job_created }
    }

    /// Handle a destroyed block. Drops its assignment and any running job.
    /// Returns `true` if an assignment was removed.
    pub fn on_station_destroyed(&mut self, station_key: &StationKey) -> bool {
        let tick = self.sim_state.tick;
        if self.queue.remove(station_key).is_some() {
            self.events.emit(Event::JobRemoved {
                station: station_key.clone(),
                reason: RemovalReason::StationDestroyed,
                tick,
            });
        }
        let cleared = self.assignments.remove(station_key).is_some();
        if cleared {
            self.events.emit(Event::StationCleared {
                station: station_key.clone(),
                tick,
            });
        }
        cleared
    }

    // -----------------------------------------------------------------------
    // Simulation control
    // -----------------------------------------------------------------------

    /// Pause the scheduler. Jobs keep their progress.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by `dt` host ticks according to the simulation strategy.
    pub fn advance<B: StationBridge>(&mut self, bridge: &mut B, dt: Ticks) -> StepReport {
        let mut report = StepReport::default();
        if self.paused {
            return report;
        }

        match self.settings.strategy.clone() {
            SimulationStrategy::Tick => {
                self.step_internal(bridge, &mut report);
            }
            SimulationStrategy::Delta { fixed_timestep } => {
                self.sim_state.accumulator = self.sim_state.accumulator.saturating_add(dt);
                let step_size = fixed_timestep.max(1);
                while self.sim_state.accumulator >= step_size {
                    self.sim_state.accumulator -= step_size;
                    self.step_internal(bridge, &mut report);
                }
            }
        }

        report
    }

    /// Run exactly one quantum, whatever the strategy.
    pub fn step<B: StationBridge>(&mut self, bridge: &mut B) -> StepReport {
        let mut report = StepReport::default();
        if !self.paused {
            self.step_internal(bridge, &mut report);
        }
        report
    }

    fn step_internal<B: StationBridge>(&mut self, bridge: &mut B, report: &mut StepReport) {
        let tick = self.sim_state.tick;
        let advance =
            self.queue
                .advance_all(bridge, self.settings.station_kind, &mut self.events, tick);
        report.absorb(advance);
        self.events.deliver();
        self.sim_state.tick += 1;
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Apply a registry command. `target` is the station the issuer is
    /// pointing at, if any.
    pub fn execute(
        &mut self,
        command: &Command,
        target: Option<&Target>,
    ) -> Result<CommandOutcome, CommandError> {
        let tick = self.sim_state.tick;
        match command {
            Command::CreateTier { name, seconds } => {
                let name = self.tiers.create(name, *seconds)?;
                self.events.emit(Event::TierCreated {
                    name: name.clone(),
                    tick,
                });
                Ok(CommandOutcome::TierCreated {
                    name,
                    seconds: *seconds,
                })
            }
            Command::DeleteTier { name } => {
                self.tiers.remove(name)?;
                let name = normalize_tier_name(name);
                self.events.emit(Event::TierDeleted {
                    name: name.clone(),
                    tick,
                });
                Ok(CommandOutcome::TierDeleted { name })
            }
            Command::ListTiers => Ok(CommandOutcome::tier_list(self.tiers.iter())),
            Command::SetTier { name } => {
                let tier = normalize_tier_name(name);
                if !self.tiers.exists(&tier) {
                    return Err(RegistryError::UnknownTier(tier).into());
                }
                let target = self.station_target(target)?;
                self.assignments.set(target.station.clone(), &tier);
                self.events.emit(Event::StationAssigned {
                    station: target.station.clone(),
                    tier: tier.clone(),
                    tick,
                });
                Ok(CommandOutcome::StationAssigned {
                    station: target.station.clone(),
                    tier,
                })
            }
            Command::ClearTier => {
                let target = target.ok_or(CommandError::NoTarget)?;
                let tier = self
                    .assignments
                    .remove(&target.station)
                    .ok_or_else(|| CommandError::NotAssigned(target.station.clone()))?;
                self.events.emit(Event::StationCleared {
                    station: target.station.clone(),
                    tick,
                });
                Ok(CommandOutcome::StationCleared {
                    station: target.station.clone(),
                    tier,
                })
            }
        }
    }

    fn station_target<'t>(&self, target: Option<&'t Target>) -> Result<&'t Target, CommandError> {
        let target = target.ok_or(CommandError::NoTarget)?;
        if target.kind != self.settings.station_kind {
            return Err(CommandError::WrongStationKind {
                expected: self.settings.station_kind,
                found: target.kind,
            });
        }
        Ok(target)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Subscribe a passive listener.
    pub fn on(&mut self, kind: EventKind, listener: PassiveListener) {
        self.events.on(kind, listener);
    }

    /// Deliver pending events now instead of at the end of the next step.
    /// Useful after intake or commands when the host wants immediate feedback.
    pub fn deliver_events(&mut self) {
        self.events.deliver();
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn settings(&self) -> &SmelterSettings {
        &self.settings
    }

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn job(&self, station_key: &StationKey) -> Option<&SmeltJob> {
        self.queue.get(station_key)
    }

    pub fn jobs(&self) -> &JobQueue {
        &self.queue
    }

    pub fn job_count(&self) -> usize {
        self.queue.len()
    }

    pub fn tiers(&self) -> &TierRegistry {
        &self.tiers
    }

    pub fn tiers_mut(&mut self) -> &mut TierRegistry {
        &mut self.tiers
    }

    pub fn assignments(&self) -> &AssignmentRegistry {
        &self.assignments
    }

    pub fn assignments_mut(&mut self) -> &mut AssignmentRegistry {
        &mut self.assignments
    }

    /// Both registries, mutably, for persistence.
    pub fn registries_mut(&mut self) -> (&mut TierRegistry, &mut AssignmentRegistry) {
        (&mut self.tiers, &mut self.assignments)
    }
}

impl Default for Smelter {
    fn default() -> Self {
        Self::new(SmelterSettings::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
