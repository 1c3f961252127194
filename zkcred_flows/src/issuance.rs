//! Issuer and holder steps of the issuance flow: schema and credential
//! definition creation, offer/request exchange, credential issuance and
//! holder-side processing.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use log::debug;
use typed_builder::TypedBuilder;
use zkcred_types::{
    data_types::{
        identifiers::{
            cred_def_id::CredentialDefinitionId, issuer_id::IssuerId,
            rev_reg_def_id::RevocationRegistryDefinitionId, schema_id::SchemaId,
        },
        ledger::{
            cred_def::{
                CredentialDefinition, CredentialDefinitionPrivate, KeyCorrectnessProof,
                SignatureType,
            },
            rev_reg::RevocationRegistry,
            rev_reg_def::{RevocationRegistryDefinition, RevocationRegistryDefinitionPrivate},
            rev_reg_delta::RevocationRegistryDelta,
            schema::{AttributeNames, Schema},
        },
        messages::{
            cred_offer::CredentialOffer,
            cred_request::{CredentialRequest, CredentialRequestMetadata},
            credential::{Credential, CredentialValues},
            master_secret::MasterSecret,
        },
    },
    utils::validation::Validatable,
};

use crate::{
    engine::{EngineRevocationConfig, ProofEngine},
    errors::error::{ZkCredError, ZkCredResult},
    loader::Loadable,
};

/// Bundles the registry material required to bind a credential to a
/// revocation index at issuance time. Issuer-side and ephemeral.
#[derive(Debug, TypedBuilder)]
pub struct CredentialRevocationConfig {
    pub reg_def: RevocationRegistryDefinition,
    pub reg_def_private: RevocationRegistryDefinitionPrivate,
    pub registry: RevocationRegistry,
    pub registry_idx: u32,
    #[builder(default)]
    pub registry_used: HashSet<u32>,
    pub tails_path: PathBuf,
}

impl CredentialRevocationConfig {
    fn as_engine_config(&self) -> EngineRevocationConfig<'_> {
        EngineRevocationConfig {
            reg_def: &self.reg_def,
            reg_def_private: &self.reg_def_private,
            registry: &self.registry,
            registry_idx: self.registry_idx,
            registry_used: &self.registry_used,
            tails_path: &self.tails_path,
        }
    }
}

pub fn create_schema(
    engine: &impl ProofEngine,
    name: &str,
    version: &str,
    issuer_id: &IssuerId,
    attr_names: impl Into<AttributeNames>,
) -> ZkCredResult<Schema> {
    let attr_names = attr_names.into();
    attr_names.validate()?;
    issuer_id.validate()?;

    engine.create_schema(name, version, issuer_id, &attr_names)
}

/// Creates the issuer's key material for `(schema, issuer, tag)`. The
/// definition id is derived deterministically by the engine, so repeating the
/// call with identical inputs names the same definition.
pub fn create_credential_definition(
    engine: &impl ProofEngine,
    schema_id: &SchemaId,
    schema: impl Into<Loadable<Schema>>,
    issuer_id: &IssuerId,
    tag: &str,
    signature_type: SignatureType,
    support_revocation: bool,
) -> ZkCredResult<(
    CredentialDefinition,
    CredentialDefinitionPrivate,
    KeyCorrectnessProof,
)> {
    let schema = schema.into().load()?;
    schema.validate()?;

    engine.create_credential_definition(
        schema_id,
        &schema,
        issuer_id,
        tag,
        signature_type,
        support_revocation,
    )
}

pub fn create_credential_offer(
    engine: &impl ProofEngine,
    schema_id: &SchemaId,
    cred_def_id: &CredentialDefinitionId,
    key_correctness_proof: impl Into<Loadable<KeyCorrectnessProof>>,
) -> ZkCredResult<CredentialOffer> {
    let key_correctness_proof = key_correctness_proof.into().load()?;

    engine.create_credential_offer(schema_id, cred_def_id, &key_correctness_proof)
}

pub fn create_master_secret(engine: &impl ProofEngine) -> ZkCredResult<MasterSecret> {
    engine.create_master_secret()
}

/// Binds the holder's master secret into a blinded request for the offered
/// credential. The returned metadata is required later to unblind.
pub fn create_credential_request(
    engine: &impl ProofEngine,
    prover_did: Option<&str>,
    cred_def: impl Into<Loadable<CredentialDefinition>>,
    master_secret: impl Into<Loadable<MasterSecret>>,
    master_secret_id: &str,
    offer: impl Into<Loadable<CredentialOffer>>,
) -> ZkCredResult<(CredentialRequest, CredentialRequestMetadata)> {
    let cred_def = cred_def.into().load()?;
    let master_secret = master_secret.into().load()?;
    let offer = offer.into().load()?;
    offer.validate()?;

    engine.create_credential_request(prover_did, &cred_def, &master_secret, master_secret_id, &offer)
}

/// Issues a credential against a previously exchanged offer/request pair.
///
/// With a revocation config the registry is advanced to mark the chosen index
/// issued: the returned registry and delta capture exactly that transition,
/// and the credential carries the registry id and index. Without one the
/// credential is non-revocable.
#[allow(clippy::too_many_arguments)]
pub fn issue_credential(
    engine: &impl ProofEngine,
    cred_def: impl Into<Loadable<CredentialDefinition>>,
    cred_def_private: impl Into<Loadable<CredentialDefinitionPrivate>>,
    offer: impl Into<Loadable<CredentialOffer>>,
    request: impl Into<Loadable<CredentialRequest>>,
    raw_values: HashMap<String, String>,
    encoded_values: Option<HashMap<String, String>>,
    rev_reg_id: Option<&RevocationRegistryDefinitionId>,
    revocation_config: Option<&CredentialRevocationConfig>,
) -> ZkCredResult<(
    Credential,
    Option<RevocationRegistry>,
    Option<RevocationRegistryDelta>,
)> {
    let cred_def = cred_def.into().load()?;
    let cred_def_private = cred_def_private.into().load()?;
    let offer = offer.into().load()?;
    let request = request.into().load()?;

    let values = CredentialValues::new(raw_values, encoded_values)?;

    if let Some(config) = revocation_config {
        let max_cred_num = config.reg_def.value.max_cred_num;
        if config.registry_idx >= max_cred_num {
            return Err(ZkCredError::OutOfRange(format!(
                "revocation index {} exceeds registry capacity {}",
                config.registry_idx, max_cred_num
            )));
        }
        debug!(
            "issuing revocable credential at index {} of registry {}",
            config.registry_idx, config.reg_def.id
        );
    } else {
        debug!("no revocation config supplied; issuing non-revocable credential");
    }

    engine.create_credential(
        &cred_def,
        &cred_def_private,
        &offer,
        &request,
        &values,
        rev_reg_id,
        revocation_config.map(CredentialRevocationConfig::as_engine_config),
    )
}

/// Finalizes a received credential by unblinding the holder's master secret
/// into the signature. Fails with a validation error if the signature does
/// not verify against the supplied credential definition.
pub fn process_credential(
    engine: &impl ProofEngine,
    credential: impl Into<Loadable<Credential>>,
    metadata: impl Into<Loadable<CredentialRequestMetadata>>,
    master_secret: impl Into<Loadable<MasterSecret>>,
    cred_def: impl Into<Loadable<CredentialDefinition>>,
    rev_reg_def: Option<Loadable<RevocationRegistryDefinition>>,
) -> ZkCredResult<Credential> {
    let credential = credential.into().load()?;
    let metadata = metadata.into().load()?;
    let master_secret = master_secret.into().load()?;
    let cred_def = cred_def.into().load()?;
    let rev_reg_def = rev_reg_def.map(Loadable::load).transpose()?;

    engine.process_credential(
        credential,
        &metadata,
        &master_secret,
        &cred_def,
        rev_reg_def.as_ref(),
    )
}
