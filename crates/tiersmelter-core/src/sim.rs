//! Scheduler strategy and state types.
//!
//! The smelter is parameterized by a [`SimulationStrategy`] that determines
//! how host time maps onto scheduler quanta. Every quantum runs the same
//! advance/deliver/bookkeeping sequence; strategies differ only in how many
//! quanta one `advance()` call runs.

use crate::event::RemovalReason;
use crate::fixed::Ticks;
use crate::id::StationKey;
use crate::job::AdvanceReport;
use serde::{Deserialize, Serialize};

/// How the smelter advances time. Chosen at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStrategy {
    /// One quantum per call. The host calls `step()` from its own fixed-rate
    /// scheduler.
    #[default]
    Tick,

    /// The host reports elapsed host ticks; whole quanta are run and the
    /// remainder carried forward.
    Delta {
        /// Host ticks per scheduler quantum.
        fixed_timestep: Ticks,
    },
}

/// Mutable scheduler state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimState {
    /// Quanta run so far.
    pub tick: Ticks,
    /// Host ticks not yet consumed by a quantum (delta mode only).
    pub accumulator: Ticks,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Summary of one `Smelter::advance()` / `Smelter::step()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Quanta actually executed.
    pub steps_run: u64,
    pub units_smelted: usize,
    /// Job-ticks lost to missing fuel or a full output.
    pub stalled: usize,
    pub removed: Vec<(StationKey, RemovalReason)>,
}

impl StepReport {
    pub(crate) fn absorb(&mut self, advance: AdvanceReport) {
        self.steps_run += 1;
        self.units_smelted += advance.units_smelted;
        self.stalled += advance.stalled;
        self.removed.extend(advance.removed);
    }

    /// Fold a later report into this one.
    pub fn merge(&mut self, other: StepReport) {
        self.steps_run += other.steps_run;
        self.units_smelted += other.units_smelted;
        self.stalled += other.stalled;
        self.removed.extend(other.removed);
    }
}
