//! Hash reconciliation over a finished output set.
//!
//! Units are visited in [`processing_order`]. For each unit:
//! 1. every known substitution is replayed onto all of its files,
//! 2. main files are digested and renamed, recording old -> new hashes,
//! 3. secondary files receive every substitution, including the new ones.
//!
//! Runtime units come last, so by the time a manifest is digested it
//! already names the final files of every other unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::{Artifact, OutputSet, OutputUnit, Rename, RenameSet};

use super::content::read_text;
use super::digest::{digest, HashOptions};
use super::error::{RehashError, Result};
use super::identifier::{old_identifier, ContentTypes, HashStrategy};
use super::ordering::processing_order;
use super::substitution::SubstitutionMap;

/// Everything a reconciliation needs besides the output itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    #[serde(default)]
    pub hash: HashOptions,

    #[serde(default)]
    pub strategy: HashStrategy,

    #[serde(default)]
    pub content_types: ContentTypes,
}

/// Recomputes output hashes and propagates them between files
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Reconcile `output` in place and return the renames the host must apply.
    ///
    /// Artifact content is rewritten in place; file names are not touched.
    /// On error the output may be partially rewritten and must not be emitted.
    pub fn reconcile(&self, output: &mut OutputSet) -> Result<RenameSet> {
        let length = self.options.hash.hash_digest_length;
        if length == 0 {
            return Err(RehashError::InvalidDigestLength { length });
        }
        self.run(Uuid::new_v4(), output)
    }

    #[instrument(
        skip(self, output),
        fields(
            invocation_id = %invocation_id,
            strategy = %self.options.strategy,
            units = output.units.len()
        )
    )]
    fn run(&self, invocation_id: Uuid, output: &mut OutputSet) -> Result<RenameSet> {
        let OutputSet { units, assets, .. } = output;

        let mut substitutions = SubstitutionMap::new();
        let mut renames = RenameSet::new();

        for idx in processing_order(units) {
            self.reconcile_unit(&units[idx], assets, &mut substitutions, &mut renames)?;
        }

        info!(
            renamed = renames.len(),
            substitutions = substitutions.len(),
            "Hash reconciliation complete"
        );

        Ok(renames)
    }

    fn reconcile_unit(
        &self,
        unit: &OutputUnit,
        assets: &mut BTreeMap<String, Artifact>,
        substitutions: &mut SubstitutionMap,
        renames: &mut RenameSet,
    ) -> Result<()> {
        debug!(unit = %unit.label(), runtime = unit.has_runtime, "Reconciling unit");

        // Bring references to already finalized units up to date first
        for file in &unit.files {
            substitutions.apply(artifact_mut(assets, unit, file)?)?;
        }

        let (main, secondary): (Vec<&String>, Vec<&String>) =
            unit.files.iter().partition(|f| self.is_main_file(unit, f.as_str()));

        for file in main {
            let text = read_text(artifact_mut(assets, unit, file)?)?;
            let new_hash = digest(&self.options.hash, &text).short;

            let old = old_identifier(
                self.options.strategy,
                file,
                unit,
                &self.options.content_types,
            )?;

            if !old.appears_in(file) {
                debug!(file = %file, token = %old.token, "File name does not embed its hash, skipping");
                continue;
            }
            if old.token == new_hash {
                debug!(file = %file, "Hash unchanged");
                continue;
            }

            let new_name = old.renamed(file, &new_hash);
            debug!(from = %file, to = %new_name, "Renaming");

            substitutions.insert(old.key, new_hash);
            renames.push(Rename {
                unit: unit.id.clone(),
                from: file.clone(),
                to: new_name,
            });
        }

        for file in secondary {
            substitutions.apply(artifact_mut(assets, unit, file)?)?;
        }

        Ok(())
    }

    /// Primary script/stylesheet of a named unit
    pub fn is_main_file(&self, unit: &OutputUnit, file: &str) -> bool {
        unit.is_named() && self.options.content_types.is_primary(file)
    }
}

fn artifact_mut<'a>(
    assets: &'a mut BTreeMap<String, Artifact>,
    unit: &OutputUnit,
    file: &str,
) -> Result<&'a mut Artifact> {
    assets
        .get_mut(file)
        .ok_or_else(|| RehashError::MissingArtifact {
            unit: unit.label(),
            file: file.to_string(),
        })
}
