//! Revocation registry lifecycle: registry creation, per-index revocation,
//! batched updates, delta composition and holder-side witness maintenance.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use zkcred_types::{
    data_types::{
        identifiers::cred_def_id::CredentialDefinitionId,
        ledger::{
            cred_def::CredentialDefinition,
            rev_reg::RevocationRegistry,
            rev_reg_def::{
                RegistryType, RevocationRegistryDefinition, RevocationRegistryDefinitionPrivate,
            },
            rev_reg_delta::RevocationRegistryDelta,
        },
        messages::rev_state::CredentialRevocationState,
    },
    utils::validation::Validatable,
};

use crate::{
    engine::ProofEngine,
    errors::error::{ZkCredError, ZkCredResult},
    loader::Loadable,
};

pub fn create_revocation_registry(
    engine: &impl ProofEngine,
    cred_def_id: &CredentialDefinitionId,
    cred_def: impl Into<Loadable<CredentialDefinition>>,
    tag: &str,
    registry_type: RegistryType,
    max_cred_num: u32,
    tails_dir: &Path,
) -> ZkCredResult<(
    RevocationRegistryDefinition,
    RevocationRegistryDefinitionPrivate,
    RevocationRegistry,
    RevocationRegistryDelta,
)> {
    if max_cred_num == 0 {
        return Err(ZkCredError::Validation(
            "revocation registry capacity must be positive".into(),
        ));
    }
    let cred_def = cred_def.into().load()?;

    engine.create_revocation_registry(
        cred_def_id,
        &cred_def,
        tag,
        registry_type,
        max_cred_num,
        tails_dir,
    )
}

/// Marks a single index revoked. The input registry is left untouched; the
/// successor accumulator and the delta describing the transition come back
/// as new values.
pub fn revoke_credential(
    engine: &impl ProofEngine,
    reg_def: impl Into<Loadable<RevocationRegistryDefinition>>,
    registry: impl Into<Loadable<RevocationRegistry>>,
    index: u32,
    tails_path: &Path,
) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)> {
    let reg_def = reg_def.into().load()?;
    let registry = registry.into().load()?;
    reg_def.validate()?;

    if index >= reg_def.value.max_cred_num {
        return Err(ZkCredError::OutOfRange(format!(
            "revocation index {} exceeds registry capacity {}",
            index, reg_def.value.max_cred_num
        )));
    }
    debug!("revoking index {} in registry {}", index, reg_def.id);

    engine.revoke_credential(&reg_def, &registry, index, tails_path)
}

/// Applies a batch of issued and revoked indices in one registry transition.
/// The two sets must be disjoint and every index must fit the registry.
pub fn update_revocation_registry(
    engine: &impl ProofEngine,
    reg_def: impl Into<Loadable<RevocationRegistryDefinition>>,
    registry: impl Into<Loadable<RevocationRegistry>>,
    issued: &[u32],
    revoked: &[u32],
    tails_path: &Path,
) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)> {
    let reg_def = reg_def.into().load()?;
    let registry = registry.into().load()?;
    reg_def.validate()?;

    if let Some(idx) = issued.iter().find(|idx| revoked.contains(idx)) {
        return Err(ZkCredError::Validation(format!(
            "index {idx} appears in both issued and revoked sets"
        )));
    }
    if let Some(idx) = issued
        .iter()
        .chain(revoked.iter())
        .find(|idx| **idx >= reg_def.value.max_cred_num)
    {
        return Err(ZkCredError::OutOfRange(format!(
            "revocation index {} exceeds registry capacity {}",
            idx, reg_def.value.max_cred_num
        )));
    }

    engine.update_revocation_registry(&reg_def, &registry, issued, revoked, tails_path)
}

/// Composes two adjacent deltas into one spanning both transitions. The
/// later delta must start from the accumulator the earlier one ended on.
pub fn merge_revocation_registry_deltas(
    engine: &impl ProofEngine,
    earlier: impl Into<Loadable<RevocationRegistryDelta>>,
    later: impl Into<Loadable<RevocationRegistryDelta>>,
) -> ZkCredResult<RevocationRegistryDelta> {
    let earlier = earlier.into().load()?;
    let later = later.into().load()?;

    if !earlier.value.precedes(&later.value) {
        return Err(ZkCredError::Validation(
            "registry deltas are not adjacent; the later delta does not start from the \
             earlier accumulator"
                .into(),
        ));
    }

    engine.merge_revocation_registry_deltas(&earlier, &later)
}

/// Builds or advances the holder's non-revocation witness for `index` at
/// `timestamp`. Pass both a prior state and the delta it was built from to
/// update incrementally, or neither to build from scratch.
#[allow(clippy::too_many_arguments)]
pub fn create_or_update_revocation_state(
    engine: &impl ProofEngine,
    reg_def: impl Into<Loadable<RevocationRegistryDefinition>>,
    delta: impl Into<Loadable<RevocationRegistryDelta>>,
    index: u32,
    timestamp: u64,
    tails_path: &Path,
    prior_state: Option<&CredentialRevocationState>,
    prior_delta: Option<&RevocationRegistryDelta>,
) -> ZkCredResult<CredentialRevocationState> {
    let reg_def = reg_def.into().load()?;
    let delta = delta.into().load()?;
    reg_def.validate()?;

    if prior_state.is_some() != prior_delta.is_some() {
        return Err(ZkCredError::Validation(
            "incremental witness update requires both the prior state and its source delta".into(),
        ));
    }
    if index >= reg_def.value.max_cred_num {
        return Err(ZkCredError::OutOfRange(format!(
            "revocation index {} exceeds registry capacity {}",
            index, reg_def.value.max_cred_num
        )));
    }

    engine.create_or_update_revocation_state(
        &reg_def,
        &delta,
        index,
        timestamp,
        tails_path,
        prior_state,
        prior_delta,
    )
}

/// One published registry transition: the delta that caused it and the
/// registry state it produced, at the time it was recorded.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub timestamp: u64,
    pub delta: RevocationRegistryDelta,
    pub registry: RevocationRegistry,
}

/// Issuer-side ledger for one revocation registry. Owns the definition, its
/// private key material, the live accumulator and the ordered history of
/// published transitions.
///
/// A ledger is a single-writer structure: all transitions for a registry go
/// through one instance, which appends each resulting delta to its history in
/// order.
#[derive(Debug)]
pub struct RevocationLedger {
    reg_def: RevocationRegistryDefinition,
    reg_def_private: RevocationRegistryDefinitionPrivate,
    registry: RevocationRegistry,
    history: Vec<LedgerEntry>,
    tails_path: PathBuf,
}

impl RevocationLedger {
    /// Creates the registry through the engine and seeds the history with the
    /// initial delta at `timestamp`.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        engine: &impl ProofEngine,
        cred_def_id: &CredentialDefinitionId,
        cred_def: impl Into<Loadable<CredentialDefinition>>,
        tag: &str,
        registry_type: RegistryType,
        max_cred_num: u32,
        tails_dir: &Path,
        timestamp: u64,
    ) -> ZkCredResult<Self> {
        let (reg_def, reg_def_private, registry, initial_delta) = create_revocation_registry(
            engine,
            cred_def_id,
            cred_def,
            tag,
            registry_type,
            max_cred_num,
            tails_dir,
        )?;
        let tails_path = tails_dir.join(&reg_def.value.tails_hash);
        let initial = LedgerEntry {
            timestamp,
            delta: initial_delta,
            registry: registry.clone(),
        };

        Ok(Self {
            reg_def,
            reg_def_private,
            registry,
            history: vec![initial],
            tails_path,
        })
    }

    pub fn reg_def(&self) -> &RevocationRegistryDefinition {
        &self.reg_def
    }

    pub fn reg_def_private(&self) -> &RevocationRegistryDefinitionPrivate {
        &self.reg_def_private
    }

    pub fn registry(&self) -> &RevocationRegistry {
        &self.registry
    }

    pub fn tails_path(&self) -> &Path {
        &self.tails_path
    }

    /// Published transitions in the order they were produced, oldest first.
    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    /// The latest published entry at or before `timestamp`.
    pub fn entry_at(&self, timestamp: u64) -> ZkCredResult<&LedgerEntry> {
        self.history
            .iter()
            .rev()
            .find(|entry| entry.timestamp <= timestamp)
            .ok_or_else(|| {
                ZkCredError::NotFound(format!(
                    "registry {} has no published state at or before {timestamp}",
                    self.reg_def.id
                ))
            })
    }

    pub fn revoke(&mut self, engine: &impl ProofEngine, index: u32, timestamp: u64) -> ZkCredResult<()> {
        self.check_timestamp(timestamp)?;
        let (registry, delta) =
            revoke_credential(engine, &self.reg_def, &self.registry, index, &self.tails_path)?;
        trace!("registry {} advanced to {}", self.reg_def.id, delta.value.accum);
        self.registry = registry.clone();
        self.history.push(LedgerEntry {
            timestamp,
            delta,
            registry,
        });
        Ok(())
    }

    pub fn update(
        &mut self,
        engine: &impl ProofEngine,
        issued: &[u32],
        revoked: &[u32],
        timestamp: u64,
    ) -> ZkCredResult<()> {
        self.check_timestamp(timestamp)?;
        let (registry, delta) = update_revocation_registry(
            engine,
            &self.reg_def,
            &self.registry,
            issued,
            revoked,
            &self.tails_path,
        )?;
        self.registry = registry.clone();
        self.history.push(LedgerEntry {
            timestamp,
            delta,
            registry,
        });
        Ok(())
    }

    /// Folds the history from the entry at or after `from` up to the entry at
    /// or before `to` into a single delta.
    pub fn cumulative_delta(
        &self,
        engine: &impl ProofEngine,
        from: u64,
        to: u64,
    ) -> ZkCredResult<RevocationRegistryDelta> {
        let mut in_range = self
            .history
            .iter()
            .filter(|entry| entry.timestamp >= from && entry.timestamp <= to)
            .map(|entry| &entry.delta);

        let first = in_range.next().ok_or_else(|| {
            ZkCredError::NotFound(format!(
                "registry {} has no published deltas between {from} and {to}",
                self.reg_def.id
            ))
        })?;

        let mut merged = first.clone();
        for delta in in_range {
            merged = engine.merge_revocation_registry_deltas(&merged, delta)?;
        }
        Ok(merged)
    }

    fn check_timestamp(&self, timestamp: u64) -> ZkCredResult<()> {
        match self.history.last() {
            Some(entry) if timestamp < entry.timestamp => Err(ZkCredError::Validation(format!(
                "registry timestamps must not regress; {timestamp} precedes {}",
                entry.timestamp
            ))),
            _ => Ok(()),
        }
    }
}
