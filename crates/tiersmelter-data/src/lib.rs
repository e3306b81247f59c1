//! Persistence and configuration for TierSmelter.
//!
//! Registries live in a data directory as `tiers.<ext>` and
//! `stations.<ext>`, where the extension picks the format (RON, TOML, or
//! JSON). Runtime settings come from `smelter.toml`.

pub mod config;
pub mod loader;
pub mod store;

pub use config::{ConfigError, SmelterConfig};
pub use loader::{DataLoadError, Format};
pub use store::RegistryStore;
