//! On-disk tier and assignment registries.
//!
//! A data directory holds two documents:
//!
//! - `tiers.<ext>`: tier name -> smelt duration in seconds
//! - `stations.<ext>`: `"world:x:y:z"` -> tier name
//!
//! ```toml
//! # tiers.toml
//! basic = 5.0
//! fast = 0.5
//! ```
//!
//! Documents are written back in whichever format they were found in, or in
//! the store's default format for new files.

use crate::loader::{DataLoadError, Format, deserialize_file, find_data_file, serialize_file};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tiersmelter_core::id::StationKey;
use tiersmelter_core::registry::{AssignmentRegistry, TierRegistry};

pub const TIERS_FILE: &str = "tiers";
pub const STATIONS_FILE: &str = "stations";

#[derive(Debug, Clone)]
pub struct RegistryStore {
    dir: PathBuf,
    format: Format,
}

impl RegistryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: Format::default(),
        }
    }

    /// Format used for documents that do not exist yet.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Existing document for `base_name`, or where a new one would go.
    fn document_path(&self, base_name: &str) -> Result<(PathBuf, bool), DataLoadError> {
        match find_data_file(&self.dir, base_name)? {
            Some(path) => Ok((path, true)),
            None => Ok((
                self.dir
                    .join(format!("{base_name}.{}", self.format.extension())),
                false,
            )),
        }
    }

    /// Load both registries. Missing documents yield empty registries.
    /// The returned registries are clean.
    pub fn load(&self) -> Result<(TierRegistry, AssignmentRegistry), DataLoadError> {
        Ok((self.load_tiers()?, self.load_assignments()?))
    }

    pub fn load_tiers(&self) -> Result<TierRegistry, DataLoadError> {
        let mut tiers = TierRegistry::new();
        let (path, exists) = self.document_path(TIERS_FILE)?;
        if !exists {
            tracing::warn!("No tier file found at {}, starting empty", path.display());
            return Ok(tiers);
        }

        let doc: BTreeMap<String, f64> = deserialize_file(&path)?;
        for (name, seconds) in doc {
            tiers
                .create(&name, seconds)
                .map_err(|e| DataLoadError::InvalidEntry {
                    file: path.clone(),
                    entry: name.clone(),
                    detail: e.to_string(),
                })?;
        }
        tiers.mark_clean();
        tracing::info!(count = tiers.len(), file = %path.display(), "tiers loaded");
        Ok(tiers)
    }

    pub fn load_assignments(&self) -> Result<AssignmentRegistry, DataLoadError> {
        let mut assignments = AssignmentRegistry::new();
        let (path, exists) = self.document_path(STATIONS_FILE)?;
        if !exists {
            tracing::warn!("No station file found at {}, starting empty", path.display());
            return Ok(assignments);
        }

        let doc: BTreeMap<String, String> = deserialize_file(&path)?;
        for (raw, tier) in doc {
            let key = raw
                .parse::<StationKey>()
                .map_err(|e| DataLoadError::InvalidEntry {
                    file: path.clone(),
                    entry: raw.clone(),
                    detail: e.to_string(),
                })?;
            assignments.set(key, &tier);
        }
        assignments.mark_clean();
        tracing::info!(count = assignments.len(), file = %path.display(), "station assignments loaded");
        Ok(assignments)
    }

    /// Write whichever registries changed since the last load or save and
    /// clear their dirty flags. Returns `true` if anything was written.
    pub fn save_if_dirty(
        &self,
        tiers: &mut TierRegistry,
        assignments: &mut AssignmentRegistry,
    ) -> Result<bool, DataLoadError> {
        let mut wrote = false;

        if tiers.is_dirty() {
            let (path, _) = self.document_path(TIERS_FILE)?;
            let doc: BTreeMap<&str, f64> = tiers
                .iter()
                .map(|t| (t.name, t.seconds))
                .collect();
            serialize_file(&path, &doc)?;
            tiers.mark_clean();
            tracing::debug!(file = %path.display(), "tiers saved");
            wrote = true;
        }

        if assignments.is_dirty() {
            let (path, _) = self.document_path(STATIONS_FILE)?;
            let doc: BTreeMap<String, &str> = assignments
                .iter()
                .map(|(key, tier)| (key.to_string(), tier))
                .collect();
            serialize_file(&path, &doc)?;
            assignments.mark_clean();
            tracing::debug!(file = %path.display(), "station assignments saved");
            wrote = true;
        }

        Ok(wrote)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
