//! TierSmelter CLI.
//!
//! Commands:
//! - `tier`      -- create, delete, or list tiers
//! - `assign`    -- assign a station to a tier
//! - `unassign`  -- clear a station's assignment
//! - `simulate`  -- run one station headless against an in-memory world

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tiersmelter_core::command::{Command, Target};
use tiersmelter_core::event::{Event, EventKind};
use tiersmelter_core::id::{ItemTypeId, StationKey};
use tiersmelter_core::item::ItemStack;
use tiersmelter_core::sim::StepReport;
use tiersmelter_core::smelter::{ConversionDecision, Smelter};
use tiersmelter_core::station::Slot;
use tiersmelter_core::world::MemoryWorld;
use tiersmelter_data::config::CONFIG_FILE;
use tiersmelter_data::{RegistryStore, SmelterConfig};

const ORE: ItemTypeId = ItemTypeId(10);
const COAL: ItemTypeId = ItemTypeId(12);
const INGOT: ItemTypeId = ItemTypeId(20);

#[derive(Parser)]
#[command(name = "tiersmelter", about = "Tiered smelting durations", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Override the registry directory from the settings file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tiers
    Tier {
        #[command(subcommand)]
        action: TierAction,
    },

    /// Assign a station (`world:x:y:z`) to a tier
    Assign { station: StationKey, tier: String },

    /// Remove a station's tier assignment
    Unassign { station: StationKey },

    /// Run one station headless and report what happened
    Simulate {
        #[arg(long)]
        station: StationKey,
        /// Assign this tier for the run only (not saved)
        #[arg(long)]
        tier: Option<String>,
        /// Ore units in the input slot
        #[arg(long, default_value_t = 8)]
        input: u32,
        /// Coal units in the fuel slot
        #[arg(long, default_value_t = 1)]
        fuel: u32,
        /// Host ticks to run
        #[arg(long)]
        ticks: u64,
    },
}

#[derive(Subcommand)]
enum TierAction {
    /// Create or replace a tier
    Create { name: String, seconds: f64 },
    /// Delete a tier
    Delete { name: String },
    /// List tiers
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = SmelterConfig::load_from(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let store = RegistryStore::new(&config.data_dir);
    let (tiers, assignments) = store
        .load()
        .with_context(|| format!("loading registries from {}", config.data_dir.display()))?;
    let mut smelter = Smelter::with_registries(config.to_settings(), tiers, assignments);

    match cli.command {
        Commands::Tier { action } => {
            let command = match action {
                TierAction::Create { name, seconds } => Command::CreateTier { name, seconds },
                TierAction::Delete { name } => Command::DeleteTier { name },
                TierAction::List => Command::ListTiers,
            };
            execute(&mut smelter, &command, None)?;
        }
        Commands::Assign { station, tier } => {
            let target = target(&smelter, station);
            execute(&mut smelter, &Command::SetTier { name: tier }, Some(&target))?;
        }
        Commands::Unassign { station } => {
            let target = target(&smelter, station);
            execute(&mut smelter, &Command::ClearTier, Some(&target))?;
        }
        Commands::Simulate {
            station,
            tier,
            input,
            fuel,
            ticks,
        } => {
            // Runs never persist registry edits.
            return simulate(&mut smelter, station, tier, input, fuel, ticks);
        }
    }

    let (tiers, assignments) = smelter.registries_mut();
    if store
        .save_if_dirty(tiers, assignments)
        .with_context(|| format!("saving registries to {}", store.dir().display()))?
    {
        tracing::debug!("registries saved");
    }
    Ok(())
}

/// The CLI targets stations by key; they are taken to be of the configured kind.
fn target(smelter: &Smelter, station: StationKey) -> Target {
    Target {
        station,
        kind: smelter.settings().station_kind,
    }
}

fn execute(smelter: &mut Smelter, command: &Command, target: Option<&Target>) -> Result<()> {
    let outcome = smelter.execute(command, target)?;
    println!("{outcome}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Headless run
// ---------------------------------------------------------------------------

fn simulate(
    smelter: &mut Smelter,
    station: StationKey,
    tier: Option<String>,
    input: u32,
    fuel: u32,
    ticks: u64,
) -> Result<()> {
    if let Some(tier) = tier {
        let target = target(smelter, station.clone());
        smelter.execute(&Command::SetTier { name: tier }, Some(&target))?;
    }

    let kind = smelter.settings().station_kind;
    let mut world = MemoryWorld::new();
    world.place(station.clone(), kind);
    if input > 0 {
        world.set_slot(&station, Slot::Input, Some(ItemStack::new(ORE, input)));
    }
    if fuel > 0 {
        world.set_slot(&station, Slot::Fuel, Some(ItemStack::new(COAL, fuel)));
    }

    smelter.on(
        EventKind::UnitSmelted,
        Box::new(|event| {
            if let Event::UnitSmelted {
                station,
                deposited,
                tick,
                ..
            } = event
            {
                tracing::info!(station = %station, tick, deposited, "unit smelted");
            }
        }),
    );

    let decision = smelter.on_conversion_requested(
        station.clone(),
        station.clone(),
        kind,
        ORE,
        ItemStack::new(INGOT, 1),
    );
    if decision == ConversionDecision::Native {
        println!("station {station} has no tier; native smelting applies");
        return Ok(());
    }
    if let Some(job) = smelter.job(&station) {
        println!(
            "job started: {} ticks per unit ({} s at {} ticks/s)",
            job.required_ticks,
            job.required_ticks as f64 / f64::from(smelter.settings().ticks_per_second),
            smelter.settings().ticks_per_second
        );
    }

    let mut total = StepReport::default();
    for _ in 0..ticks {
        total.merge(smelter.advance(&mut world, 1));
    }

    println!("--- after {} quanta ---", total.steps_run);
    for slot in Slot::ALL {
        println!("{slot:?}: {}", world.quantity(&station, slot));
    }
    match smelter.job(&station) {
        Some(job) => println!(
            "job: {}/{} ticks ({:.0}%), {:?}",
            job.progress_ticks,
            job.required_ticks,
            job.progress_fraction() * 100.0,
            job.status
        ),
        None => println!("job: none"),
    }
    for (key, reason) in &total.removed {
        println!("removed: {key} ({reason:?})");
    }
    println!(
        "units smelted: {}, stalled job-ticks: {}",
        total.units_smelted, total.stalled
    );
    for kind in [
        EventKind::JobStarted,
        EventKind::UnitSmelted,
        EventKind::JobStalled,
        EventKind::JobResumed,
        EventKind::JobRemoved,
    ] {
        println!("{kind:?} events: {}", smelter.events().total_emitted(kind));
    }
    Ok(())
}
