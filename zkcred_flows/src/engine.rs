//! The proof-engine collaborator surface.
//!
//! Everything cryptographic is delegated through [`ProofEngine`]: key
//! generation, signing, proof construction and verification, and the
//! accumulator math behind revocation. The orchestration code in this crate
//! prepares the structured inputs and interprets the typed outputs.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use zkcred_types::data_types::{
    identifiers::{
        cred_def_id::CredentialDefinitionId, issuer_id::IssuerId,
        rev_reg_def_id::RevocationRegistryDefinitionId, schema_id::SchemaId,
    },
    ledger::{
        cred_def::{
            CredentialDefinition, CredentialDefinitionPrivate, KeyCorrectnessProof, SignatureType,
        },
        rev_reg::RevocationRegistry,
        rev_reg_def::{
            RegistryType, RevocationRegistryDefinition, RevocationRegistryDefinitionPrivate,
        },
        rev_reg_delta::RevocationRegistryDelta,
        schema::{AttributeNames, Schema},
    },
    messages::{
        cred_offer::CredentialOffer,
        cred_request::{CredentialRequest, CredentialRequestMetadata},
        credential::{Credential, CredentialValues},
        master_secret::MasterSecret,
        pres_request::PresentationRequest,
        presentation::Presentation,
        rev_state::CredentialRevocationState,
    },
};

use crate::errors::error::ZkCredResult;

pub type SchemasMap = HashMap<SchemaId, Schema>;
pub type CredentialDefinitionsMap = HashMap<CredentialDefinitionId, CredentialDefinition>;
pub type RevocationRegistryDefinitionsMap =
    HashMap<RevocationRegistryDefinitionId, RevocationRegistryDefinition>;
/// Registry states per definition id, keyed by the timestamp at which each
/// state was published.
pub type RevocationRegistriesMap =
    HashMap<RevocationRegistryDefinitionId, HashMap<u64, RevocationRegistry>>;

/// One (credential, timestamp) pair inside a presentation. The engine
/// correlates [`CredentialProve`] instructions to entries purely by position.
#[derive(Debug, Clone, Copy)]
pub struct CredentialEntry<'a> {
    pub credential: &'a Credential,
    pub timestamp: Option<u64>,
    pub rev_state: Option<&'a CredentialRevocationState>,
}

/// A disclosure instruction tagged with the entry index it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialProve {
    Attribute {
        entry_idx: usize,
        referent: String,
        reveal: bool,
    },
    Predicate {
        entry_idx: usize,
        referent: String,
    },
}

impl CredentialProve {
    pub fn entry_idx(&self) -> usize {
        match self {
            Self::Attribute { entry_idx, .. } | Self::Predicate { entry_idx, .. } => *entry_idx,
        }
    }
}

/// A registry state bound to a position in the verifier's ordered list of
/// registry definitions, at a specific timestamp.
#[derive(Debug, Clone, Copy)]
pub struct RevocationEntry<'a> {
    pub def_entry_idx: usize,
    pub registry: &'a RevocationRegistry,
    pub timestamp: u64,
}

/// Registry material the engine needs to bind a credential to a revocation
/// index at issuance time.
#[derive(Debug, Clone, Copy)]
pub struct EngineRevocationConfig<'a> {
    pub reg_def: &'a RevocationRegistryDefinition,
    pub reg_def_private: &'a RevocationRegistryDefinitionPrivate,
    pub registry: &'a RevocationRegistry,
    pub registry_idx: u32,
    pub registry_used: &'a HashSet<u32>,
    pub tails_path: &'a Path,
}

/// External proof-engine collaborator. All operations are synchronous; proof
/// generation and verification may block on computation but perform no I/O
/// beyond reading a tails file. Implementations never mutate their arguments:
/// registry transitions come back as fresh values.
pub trait ProofEngine {
    fn create_schema(
        &self,
        name: &str,
        version: &str,
        issuer_id: &IssuerId,
        attr_names: &AttributeNames,
    ) -> ZkCredResult<Schema>;

    fn create_credential_definition(
        &self,
        schema_id: &SchemaId,
        schema: &Schema,
        issuer_id: &IssuerId,
        tag: &str,
        signature_type: SignatureType,
        support_revocation: bool,
    ) -> ZkCredResult<(
        CredentialDefinition,
        CredentialDefinitionPrivate,
        KeyCorrectnessProof,
    )>;

    fn create_credential_offer(
        &self,
        schema_id: &SchemaId,
        cred_def_id: &CredentialDefinitionId,
        key_correctness_proof: &KeyCorrectnessProof,
    ) -> ZkCredResult<CredentialOffer>;

    fn create_master_secret(&self) -> ZkCredResult<MasterSecret>;

    fn create_credential_request(
        &self,
        prover_did: Option<&str>,
        cred_def: &CredentialDefinition,
        master_secret: &MasterSecret,
        master_secret_id: &str,
        offer: &CredentialOffer,
    ) -> ZkCredResult<(CredentialRequest, CredentialRequestMetadata)>;

    #[allow(clippy::too_many_arguments)]
    fn create_credential(
        &self,
        cred_def: &CredentialDefinition,
        cred_def_private: &CredentialDefinitionPrivate,
        offer: &CredentialOffer,
        request: &CredentialRequest,
        values: &CredentialValues,
        rev_reg_id: Option<&RevocationRegistryDefinitionId>,
        revocation: Option<EngineRevocationConfig<'_>>,
    ) -> ZkCredResult<(
        Credential,
        Option<RevocationRegistry>,
        Option<RevocationRegistryDelta>,
    )>;

    fn process_credential(
        &self,
        credential: Credential,
        metadata: &CredentialRequestMetadata,
        master_secret: &MasterSecret,
        cred_def: &CredentialDefinition,
        rev_reg_def: Option<&RevocationRegistryDefinition>,
    ) -> ZkCredResult<Credential>;

    #[allow(clippy::too_many_arguments)]
    fn create_presentation(
        &self,
        pres_req: &PresentationRequest,
        entries: &[CredentialEntry<'_>],
        proofs: &[CredentialProve],
        self_attested: &HashMap<String, String>,
        master_secret: &MasterSecret,
        schemas: &SchemasMap,
        cred_defs: &CredentialDefinitionsMap,
    ) -> ZkCredResult<Presentation>;

    #[allow(clippy::too_many_arguments)]
    fn verify_presentation(
        &self,
        presentation: &Presentation,
        pres_req: &PresentationRequest,
        schemas: &[&Schema],
        cred_defs: &[&CredentialDefinition],
        rev_reg_defs: &[&RevocationRegistryDefinition],
        rev_reg_entries: &[RevocationEntry<'_>],
    ) -> ZkCredResult<bool>;

    #[allow(clippy::too_many_arguments)]
    fn create_revocation_registry(
        &self,
        cred_def_id: &CredentialDefinitionId,
        cred_def: &CredentialDefinition,
        tag: &str,
        registry_type: RegistryType,
        max_cred_num: u32,
        tails_dir: &Path,
    ) -> ZkCredResult<(
        RevocationRegistryDefinition,
        RevocationRegistryDefinitionPrivate,
        RevocationRegistry,
        RevocationRegistryDelta,
    )>;

    fn revoke_credential(
        &self,
        reg_def: &RevocationRegistryDefinition,
        registry: &RevocationRegistry,
        index: u32,
        tails_path: &Path,
    ) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)>;

    fn update_revocation_registry(
        &self,
        reg_def: &RevocationRegistryDefinition,
        registry: &RevocationRegistry,
        issued: &[u32],
        revoked: &[u32],
        tails_path: &Path,
    ) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)>;

    fn merge_revocation_registry_deltas(
        &self,
        earlier: &RevocationRegistryDelta,
        later: &RevocationRegistryDelta,
    ) -> ZkCredResult<RevocationRegistryDelta>;

    #[allow(clippy::too_many_arguments)]
    fn create_or_update_revocation_state(
        &self,
        reg_def: &RevocationRegistryDefinition,
        delta: &RevocationRegistryDelta,
        index: u32,
        timestamp: u64,
        tails_path: &Path,
        prior_state: Option<&CredentialRevocationState>,
        prior_delta: Option<&RevocationRegistryDelta>,
    ) -> ZkCredResult<CredentialRevocationState>;
}
