//! The host's output set: units and the artifacts they name.
//!
//! Snapshots are exchanged as JSON:
//!
//! ```json
//! {
//!   "units": [{ "id": "app", "name": "app", "rendered_hash": "a1b2c3",
//!               "files": ["app.a1b2c3.js"] }],
//!   "assets": { "app.a1b2c3.js": { "kind": "plain_text", "text": "..." } },
//!   "hash": { "hash_function": "sha256", "hash_digest_length": 8 }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::HashOverrides;

use super::artifact::Artifact;
use super::unit::{OutputUnit, UnitId};

/// Units and artifacts produced by one build
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSet {
    /// Output units, in host order
    #[serde(default)]
    pub units: Vec<OutputUnit>,

    /// Artifacts keyed by file name
    #[serde(default)]
    pub assets: BTreeMap<String, Artifact>,

    /// Hash options the host used for this build
    #[serde(default)]
    pub hash: Option<HashOverrides>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid snapshot: {}", path.display()))
    }

    /// Parse a snapshot from JSON content
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse snapshot JSON")
    }

    /// Add a unit together with its artifacts
    pub fn with_unit(mut self, unit: OutputUnit, assets: Vec<(&str, Artifact)>) -> Self {
        for (name, artifact) in assets {
            self.assets.insert(name.to_string(), artifact);
        }
        self.units.push(unit);
        self
    }

    /// Check structural consistency of the snapshot
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&UnitId> = HashSet::new();

        for unit in &self.units {
            if !seen.insert(&unit.id) {
                anyhow::bail!("Duplicate unit id: {}", unit.id);
            }

            for file in &unit.files {
                if !self.assets.contains_key(file) {
                    anyhow::bail!(
                        "Unit '{}' references missing asset '{}'",
                        unit.label(),
                        file
                    );
                }
            }
        }

        Ok(())
    }

    pub fn asset(&self, name: &str) -> Option<&Artifact> {
        self.assets.get(name)
    }

    /// Move renamed artifacts to their new names and update unit file lists
    pub fn apply_renames(&mut self, renames: &RenameSet) -> Result<()> {
        for rename in renames.iter() {
            if rename.from == rename.to {
                continue;
            }
            if self.assets.contains_key(&rename.to) {
                anyhow::bail!(
                    "Cannot rename '{}' to '{}': target already exists",
                    rename.from,
                    rename.to
                );
            }
            let artifact = self
                .assets
                .remove(&rename.from)
                .with_context(|| format!("Cannot rename missing asset '{}'", rename.from))?;
            self.assets.insert(rename.to.clone(), artifact);

            for unit in self.units.iter_mut() {
                for file in unit.files.iter_mut() {
                    if *file == rename.from {
                        *file = rename.to.clone();
                    }
                }
            }
        }

        Ok(())
    }
}

/// A single old-name to new-name rename request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rename {
    /// Unit owning the file
    pub unit: UnitId,
    pub from: String,
    pub to: String,
}

/// Renames produced by one reconciliation, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenameSet(Vec<Rename>);

impl RenameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rename: Rename) {
        self.0.push(rename);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rename> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New name of `from`, if it was renamed
    pub fn renamed_to(&self, from: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|r| r.from == from)
            .map(|r| r.to.as_str())
    }
}
