//! Tier definitions and per-station tier assignments.
//!
//! Both registries are plain ordered maps with a dirty flag; the data crate
//! persists them and clears the flag after a successful save.

use crate::id::StationKey;
use std::collections::BTreeMap;

/// A named smelting duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<'a> {
    pub name: &'a str,
    pub seconds: f64,
}

/// Tier name (lowercase) -> smelt duration in seconds.
#[derive(Debug, Clone, Default)]
pub struct TierRegistry {
    tiers: BTreeMap<String, f64>,
    dirty: bool,
}

/// Tier names are case-insensitive; the registry stores them lowercased.
pub fn normalize_tier_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl TierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a tier. Returns the normalized name.
    pub fn create(&mut self, name: &str, seconds: f64) -> Result<String, RegistryError> {
        let name = normalize_tier_name(name);
        if name.is_empty() {
            return Err(RegistryError::EmptyTierName);
        }
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(RegistryError::InvalidDuration(seconds));
        }
        self.tiers.insert(name.clone(), seconds);
        self.dirty = true;
        tracing::info!(tier = %name, seconds, "tier created");
        Ok(name)
    }

    /// Delete a tier. Assignments referencing it are left in place.
    pub fn remove(&mut self, name: &str) -> Result<f64, RegistryError> {
        let name = normalize_tier_name(name);
        let seconds = self
            .tiers
            .remove(&name)
            .ok_or_else(|| RegistryError::UnknownTier(name.clone()))?;
        self.dirty = true;
        tracing::info!(tier = %name, "tier deleted");
        Ok(seconds)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.tiers.get(&normalize_tier_name(name)).copied()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tiers.contains_key(&normalize_tier_name(name))
    }

    /// Tiers in name order.
    pub fn iter(&self) -> impl Iterator<Item = Tier<'_>> {
        self.tiers.iter().map(|(name, &seconds)| Tier {
            name: name.as_str(),
            seconds,
        })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Station key -> assigned tier name.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRegistry {
    assignments: BTreeMap<StationKey, String>,
    dirty: bool,
}

impl AssignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a station to a tier, replacing any previous assignment.
    /// Returns the previous tier name.
    pub fn set(&mut self, station: StationKey, tier: &str) -> Option<String> {
        let tier = normalize_tier_name(tier);
        tracing::info!(station = %station, tier = %tier, "station assigned");
        self.dirty = true;
        self.assignments.insert(station, tier)
    }

    pub fn get(&self, station: &StationKey) -> Option<&str> {
        self.assignments.get(station).map(String::as_str)
    }

    pub fn exists(&self, station: &StationKey) -> bool {
        self.assignments.contains_key(station)
    }

    /// Remove a station's assignment. Returns the tier it was assigned to.
    pub fn remove(&mut self, station: &StationKey) -> Option<String> {
        let removed = self.assignments.remove(station);
        if removed.is_some() {
            self.dirty = true;
            tracing::info!(station = %station, "station assignment cleared");
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StationKey, &str)> {
        self.assignments.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("tier name must not be empty")]
    EmptyTierName,
    #[error("smelt time must be a positive number of seconds, got {0}")]
    InvalidDuration(f64),
    #[error("tier '{0}' does not exist")]
    UnknownTier(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: i32) -> StationKey {
        StationKey::new("world", x, 64, 0)
    }

    #[test]
    fn create_normalizes_name() {
        let mut reg = TierRegistry::new();
        let name = reg.create("  Basic ", 5.0).unwrap();
        assert_eq!(name, "basic");
        assert!(reg.exists("BASIC"));
        assert_eq!(reg.get("basic"), Some(5.0));
    }

    #[test]
    fn create_replaces_existing_tier() {
        let mut reg = TierRegistry::new();
        reg.create("fast", 2.0).unwrap();
        reg.create("FAST", 1.0).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("fast"), Some(1.0));
    }

    #[test]
    fn create_rejects_non_positive_durations() {
        let mut reg = TierRegistry::new();
        assert_eq!(reg.create("zero", 0.0), Err(RegistryError::InvalidDuration(0.0)));
        assert_eq!(reg.create("neg", -1.5), Err(RegistryError::InvalidDuration(-1.5)));
        assert!(matches!(
            reg.create("nan", f64::NAN),
            Err(RegistryError::InvalidDuration(_))
        ));
        assert!(reg.is_empty());
        assert!(!reg.is_dirty());
    }

    #[test]
    fn create_keeps_entered_seconds() {
        let mut reg = TierRegistry::new();
        reg.create("tenth", 0.1).unwrap();
        reg.create("eon", 1e12).unwrap();
        assert_eq!(reg.get("tenth"), Some(0.1));
        assert_eq!(reg.get("eon"), Some(1e12));
        assert!(matches!(
            reg.create("inf", f64::INFINITY),
            Err(RegistryError::InvalidDuration(_))
        ));
    }

    #[test]
    fn create_rejects_empty_name() {
        let mut reg = TierRegistry::new();
        assert_eq!(reg.create("   ", 1.0), Err(RegistryError::EmptyTierName));
    }

    #[test]
    fn remove_unknown_tier_fails() {
        let mut reg = TierRegistry::new();
        match reg.remove("ghost") {
            Err(RegistryError::UnknownTier(name)) => assert_eq!(name, "ghost"),
            other => panic!("expected UnknownTier, got {other:?}"),
        }
    }

    #[test]
    fn iter_is_name_ordered() {
        let mut reg = TierRegistry::new();
        reg.create("slow", 10.0).unwrap();
        reg.create("basic", 5.0).unwrap();
        reg.create("fast", 1.0).unwrap();
        let names: Vec<&str> = reg.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["basic", "fast", "slow"]);
    }

    #[test]
    fn dirty_flag_tracks_mutations() {
        let mut reg = TierRegistry::new();
        assert!(!reg.is_dirty());
        reg.create("basic", 5.0).unwrap();
        assert!(reg.is_dirty());
        reg.mark_clean();
        assert!(!reg.is_dirty());
        reg.remove("basic").unwrap();
        assert!(reg.is_dirty());
    }

    #[test]
    fn assignment_set_get_remove() {
        let mut reg = AssignmentRegistry::new();
        assert_eq!(reg.set(key(1), "Basic"), None);
        assert_eq!(reg.get(&key(1)), Some("basic"));
        assert_eq!(reg.set(key(1), "fast"), Some("basic".to_string()));
        assert!(reg.exists(&key(1)));
        assert_eq!(reg.remove(&key(1)), Some("fast".to_string()));
        assert!(!reg.exists(&key(1)));
    }

    #[test]
    fn removing_missing_assignment_stays_clean() {
        let mut reg = AssignmentRegistry::new();
        assert_eq!(reg.remove(&key(9)), None);
        assert!(!reg.is_dirty());
    }

    #[test]
    fn assignments_are_independent_per_station() {
        let mut reg = AssignmentRegistry::new();
        reg.set(key(1), "basic");
        reg.set(key(2), "fast");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&key(2)), Some("fast"));
    }
}
