//! Hash-commitment stand-in for a real anonymous-credential proof engine.
//!
//! Every opaque payload a real engine would fill with CL crypto is replaced
//! by a SHA-256 commitment over the same inputs, so the orchestration layer
//! can be exercised end to end: wrong master secrets, mismatched definitions,
//! stale witnesses and revoked indices all fail the way the real engine fails,
//! while everything stays deterministic and dependency-free.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use zkcred_flows::{
    engine::{
        CredentialDefinitionsMap, CredentialEntry, CredentialProve, EngineRevocationConfig,
        ProofEngine, RevocationEntry, SchemasMap,
    },
    errors::error::{ZkCredError, ZkCredResult},
};
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
            RevocationRegistryDefinitionValue,
        },
        rev_reg_delta::{RevocationRegistryDelta, RevocationRegistryDeltaValue},
        schema::{AttributeNames, Schema},
    },
    messages::{
        cred_offer::CredentialOffer,
        cred_request::{CredentialRequest, CredentialRequestMetadata},
        credential::{AttributeValue, Credential, CredentialValues},
        master_secret::MasterSecret,
        nonce::Nonce,
        pres_request::PresentationRequest,
        presentation::Presentation,
        rev_state::CredentialRevocationState,
    },
};

/// Deterministic in-process proof engine for tests.
#[derive(Debug, Default)]
pub struct MockProofEngine;

impl MockProofEngine {
    pub fn new() -> Self {
        Self
    }
}

fn digest(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    hex::encode(hasher.finalize())
}

fn random_nonce() -> ZkCredResult<Nonce> {
    let mut rng = rand::thread_rng();
    let digits: String = (0..20)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect();
    Ok(Nonce::from_dec(digits)?)
}

fn str_field<'a>(value: &'a Value, path: &[&str]) -> ZkCredResult<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(key).ok_or_else(|| {
            ZkCredError::Format(format!("payload is missing field '{}'", path.join(".")))
        })?;
    }
    current.as_str().ok_or_else(|| {
        ZkCredError::Format(format!("payload field '{}' is not a string", path.join(".")))
    })
}

/// The standard attribute encoding: decimal integers pass through, anything
/// else becomes a hash commitment.
fn encode_attribute(raw: &str) -> String {
    if raw.parse::<i64>().is_ok() {
        raw.to_string()
    } else {
        digest(&["enc", raw])
    }
}

fn blinded_secret(ms: &str, pk_n: &str, nonce: &str) -> String {
    digest(&["blind", ms, pk_n, nonce])
}

fn accumulator(tails_hash: &str, revoked: &BTreeSet<u32>) -> String {
    let joined = revoked
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    digest(&["accum", tails_hash, &joined])
}

fn check_tails(path: &Path) -> ZkCredResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ZkCredError::Engine(format!(
            "tails file not found at {}",
            path.display()
        )))
    }
}

/// Registry payload: the accumulator plus the index sets it commits to.
#[derive(Debug, Serialize, Deserialize)]
struct RegistryState {
    accum: String,
    issued: BTreeSet<u32>,
    revoked: BTreeSet<u32>,
}

impl RegistryState {
    fn from_registry(registry: &RevocationRegistry) -> ZkCredResult<Self> {
        Ok(serde_json::from_value(registry.value.clone())?)
    }

    fn into_registry(self) -> ZkCredResult<RevocationRegistry> {
        Ok(RevocationRegistry {
            value: serde_json::to_value(self)?,
        })
    }
}

/// Witness payload inside a [`CredentialRevocationState`].
#[derive(Debug, Serialize, Deserialize)]
struct WitnessState {
    accum: String,
    revoked: BTreeSet<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MockPresentation {
    blocks: Vec<MockBlock>,
    self_attested: BTreeMap<String, String>,
    aggregate: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct MockBlock {
    schema_id: String,
    cred_def_id: String,
    vk: String,
    link: String,
    revealed: BTreeMap<String, Vec<RevealedAttribute>>,
    hidden: Vec<String>,
    predicates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    non_revoked: Option<NonRevocationBlock>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RevealedAttribute {
    name: String,
    raw: String,
    encoded: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct NonRevocationBlock {
    rev_reg_id: String,
    timestamp: u64,
    accum: String,
    index: u32,
}

fn aggregate_digest(
    blocks: &[MockBlock],
    self_attested: &BTreeMap<String, String>,
    nonce: &str,
) -> ZkCredResult<String> {
    let blocks_json = serde_json::to_string(blocks)?;
    let attested_json = serde_json::to_string(self_attested)?;
    Ok(digest(&["agg", nonce, &blocks_json, &attested_json]))
}

impl ProofEngine for MockProofEngine {
    fn create_schema(
        &self,
        name: &str,
        version: &str,
        issuer_id: &IssuerId,
        attr_names: &AttributeNames,
    ) -> ZkCredResult<Schema> {
        let id = SchemaId::new(format!("mock:schema:{issuer_id}:{name}:{version}"))?;
        Ok(Schema {
            id,
            name: name.to_string(),
            version: version.to_string(),
            attr_names: attr_names.clone(),
            issuer_id: issuer_id.clone(),
        })
    }

    fn create_credential_definition(
        &self,
        schema_id: &SchemaId,
        _schema: &Schema,
        issuer_id: &IssuerId,
        tag: &str,
        _signature_type: SignatureType,
        support_revocation: bool,
    ) -> ZkCredResult<(
        CredentialDefinition,
        CredentialDefinitionPrivate,
        KeyCorrectnessProof,
    )> {
        let seed = digest(&["creddef", schema_id.0.as_str(), issuer_id.0.as_str(), tag]);
        let id = CredentialDefinitionId::new(format!("mock:creddef:{}:{tag}", &seed[..16]))?;

        let mut value = json!({
            "primary": {
                "n": digest(&["n", &seed]),
                "s": digest(&["s", &seed]),
                "z": digest(&["z", &seed]),
            }
        });
        if support_revocation {
            value["revocation"] = json!({ "g": digest(&["g", &seed]) });
        }

        let cred_def = CredentialDefinition {
            id,
            schema_id: schema_id.clone(),
            issuer_id: issuer_id.clone(),
            tag: tag.to_string(),
            signature_type: SignatureType::CL,
            value,
        };
        let private = CredentialDefinitionPrivate {
            value: json!({ "p": digest(&["p", &seed]), "q": digest(&["q", &seed]) }),
        };
        let correctness = KeyCorrectnessProof {
            value: json!({ "c": digest(&["kcp", &seed]) }),
        };
        Ok((cred_def, private, correctness))
    }

    fn create_credential_offer(
        &self,
        schema_id: &SchemaId,
        cred_def_id: &CredentialDefinitionId,
        key_correctness_proof: &KeyCorrectnessProof,
    ) -> ZkCredResult<CredentialOffer> {
        Ok(CredentialOffer {
            schema_id: schema_id.clone(),
            cred_def_id: cred_def_id.clone(),
            key_correctness_proof: key_correctness_proof.value.clone(),
            nonce: random_nonce()?,
        })
    }

    fn create_master_secret(&self) -> ZkCredResult<MasterSecret> {
        let bytes: [u8; 32] = rand::random();
        Ok(MasterSecret {
            value: json!({ "ms": hex::encode(bytes) }),
        })
    }

    fn create_credential_request(
        &self,
        prover_did: Option<&str>,
        cred_def: &CredentialDefinition,
        master_secret: &MasterSecret,
        master_secret_id: &str,
        offer: &CredentialOffer,
    ) -> ZkCredResult<(CredentialRequest, CredentialRequestMetadata)> {
        if offer.cred_def_id != cred_def.id {
            return Err(ZkCredError::Validation(format!(
                "offer is for definition {} but {} was supplied",
                offer.cred_def_id, cred_def.id
            )));
        }
        let ms = str_field(&master_secret.value, &["ms"])?;
        let pk_n = str_field(&cred_def.value, &["primary", "n"])?;
        let u = blinded_secret(ms, pk_n, offer.nonce.as_str());

        let request = CredentialRequest {
            prover_did: prover_did.map(str::to_string),
            cred_def_id: cred_def.id.clone(),
            blinded_secrets: json!({ "u": u, "correctness": digest(&["bcp", &u]) }),
            nonce: random_nonce()?,
        };
        let metadata = CredentialRequestMetadata {
            link_secret_blinding: json!({ "v": digest(&["v", ms, &u]) }),
            link_secret_name: master_secret_id.to_string(),
            nonce: offer.nonce.clone(),
        };
        Ok((request, metadata))
    }

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
    )> {
        if request.cred_def_id != cred_def.id || offer.cred_def_id != cred_def.id {
            return Err(ZkCredError::Validation(
                "offer, request and credential definition do not agree".into(),
            ));
        }
        if rev_reg_id.is_some() != revocation.is_some() {
            return Err(ZkCredError::Validation(
                "registry id and revocation config must be supplied together".into(),
            ));
        }

        let mut encoded_values: HashMap<String, AttributeValue> = HashMap::new();
        for (name, attr) in &values.0 {
            let encoded = attr
                .encoded
                .clone()
                .unwrap_or_else(|| encode_attribute(&attr.raw));
            encoded_values.insert(
                name.clone(),
                AttributeValue {
                    raw: attr.raw.clone(),
                    encoded: Some(encoded),
                },
            );
        }
        let mut sorted: Vec<_> = encoded_values
            .iter()
            .map(|(name, attr)| format!("{name}={}", attr.raw))
            .collect();
        sorted.sort();
        let values_digest = digest(&["values", &sorted.join(";")]);

        let u = str_field(&request.blinded_secrets, &["u"])?;
        let pk_n = str_field(&cred_def.value, &["primary", "n"])?;
        let p_key = str_field(&cred_def_private.value, &["p"])?;
        let q = digest(&["sig", p_key, u, &values_digest]);

        let signature = json!({
            "q": q,
            "u": u,
            "n": pk_n,
            "nonce": offer.nonce.as_str(),
        });
        let correctness_proof = json!({ "c": digest(&["scp", &q]) });

        let mut registry_out = None;
        let mut delta_out = None;
        let mut rev_reg_index = None;
        let mut witness = None;

        if let Some(config) = revocation {
            check_tails(config.tails_path)?;
            let idx = config.registry_idx;
            if idx >= config.reg_def.value.max_cred_num {
                return Err(ZkCredError::OutOfRange(format!(
                    "revocation index {idx} exceeds registry capacity {}",
                    config.reg_def.value.max_cred_num
                )));
            }
            if config.registry_used.contains(&idx) {
                return Err(ZkCredError::Validation(format!(
                    "revocation index {idx} was already handed out"
                )));
            }

            let mut state = RegistryState::from_registry(config.registry)?;
            if !state.issued.insert(idx) {
                return Err(ZkCredError::Validation(format!(
                    "revocation index {idx} is already bound to a credential"
                )));
            }
            let prev_accum = state.accum.clone();

            delta_out = Some(RevocationRegistryDelta {
                value: RevocationRegistryDeltaValue {
                    prev_accum: Some(prev_accum),
                    accum: state.accum.clone(),
                    issued: vec![idx],
                    revoked: vec![],
                },
            });
            witness = Some(json!({ "accum": state.accum, "revoked": [] }));
            registry_out = Some(state.into_registry()?);
            rev_reg_index = Some(idx);
        }

        let credential = Credential {
            schema_id: cred_def.schema_id.clone(),
            cred_def_id: cred_def.id.clone(),
            rev_reg_id: rev_reg_id.cloned(),
            rev_reg_index,
            values: CredentialValues(encoded_values),
            signature,
            signature_correctness_proof: correctness_proof,
            witness,
        };
        Ok((credential, registry_out, delta_out))
    }

    fn process_credential(
        &self,
        credential: Credential,
        metadata: &CredentialRequestMetadata,
        master_secret: &MasterSecret,
        cred_def: &CredentialDefinition,
        rev_reg_def: Option<&RevocationRegistryDefinition>,
    ) -> ZkCredResult<Credential> {
        let ms = str_field(&master_secret.value, &["ms"])?;
        let pk_n = str_field(&cred_def.value, &["primary", "n"])?;
        let expected = blinded_secret(ms, pk_n, metadata.nonce.as_str());
        let actual = str_field(&credential.signature, &["u"])?;
        if actual != expected {
            return Err(ZkCredError::Validation(
                "credential signature does not bind this master secret and definition".into(),
            ));
        }
        if let Some(def) = rev_reg_def {
            if credential.rev_reg_id.as_ref() != Some(&def.id) {
                return Err(ZkCredError::Validation(format!(
                    "credential is not bound to registry {}",
                    def.id
                )));
            }
        }
        Ok(credential)
    }

    fn create_presentation(
        &self,
        pres_req: &PresentationRequest,
        entries: &[CredentialEntry<'_>],
        proofs: &[CredentialProve],
        self_attested: &HashMap<String, String>,
        master_secret: &MasterSecret,
        schemas: &SchemasMap,
        cred_defs: &CredentialDefinitionsMap,
    ) -> ZkCredResult<Presentation> {
        let ms = str_field(&master_secret.value, &["ms"])?;
        let link = digest(&["link", ms]);

        let mut blocks = Vec::with_capacity(entries.len());
        for entry in entries {
            let cred = entry.credential;
            let schema = schemas.get(&cred.schema_id).ok_or_else(|| {
                ZkCredError::NotFound(format!("schema {} is not available", cred.schema_id))
            })?;
            let cred_def = cred_defs.get(&cred.cred_def_id).ok_or_else(|| {
                ZkCredError::NotFound(format!(
                    "credential definition {} is not available",
                    cred.cred_def_id
                ))
            })?;

            let pk_n = str_field(&cred_def.value, &["primary", "n"])?;
            let bound_nonce = str_field(&cred.signature, &["nonce"])?;
            let bound_u = str_field(&cred.signature, &["u"])?;
            if bound_u != blinded_secret(ms, pk_n, bound_nonce) {
                return Err(ZkCredError::Validation(format!(
                    "credential for schema {} is bound to a different master secret",
                    schema.id
                )));
            }

            let non_revoked = match entry.rev_state {
                Some(state) => {
                    let rev_reg_id = cred.rev_reg_id.as_ref().ok_or_else(|| {
                        ZkCredError::Validation(
                            "revocation state supplied for a non-revocable credential".into(),
                        )
                    })?;
                    let index = cred.rev_reg_index.ok_or_else(|| {
                        ZkCredError::Validation(
                            "revocable credential is missing its registry index".into(),
                        )
                    })?;
                    let witness: WitnessState = serde_json::from_value(state.witness.clone())?;
                    Some(NonRevocationBlock {
                        rev_reg_id: rev_reg_id.0.clone(),
                        timestamp: entry.timestamp.unwrap_or(state.timestamp),
                        accum: witness.accum,
                        index,
                    })
                }
                None => None,
            };

            blocks.push(MockBlock {
                schema_id: cred.schema_id.0.clone(),
                cred_def_id: cred.cred_def_id.0.clone(),
                vk: digest(&["vk", &cred_def.value.to_string()]),
                link: link.clone(),
                revealed: BTreeMap::new(),
                hidden: Vec::new(),
                predicates: Vec::new(),
                non_revoked,
            });
        }

        for proof in proofs {
            let entry_idx = proof.entry_idx();
            let entry = entries.get(entry_idx).ok_or_else(|| {
                ZkCredError::OutOfRange(format!(
                    "instruction references entry {entry_idx} of {}",
                    entries.len()
                ))
            })?;
            let cred = entry.credential;

            match proof {
                CredentialProve::Attribute {
                    referent, reveal, ..
                } => {
                    let info = pres_req.requested_attributes.get(referent).ok_or_else(|| {
                        ZkCredError::NotFound(format!(
                            "attribute referent '{referent}' is not in the request"
                        ))
                    })?;
                    if !reveal {
                        blocks[entry_idx].hidden.push(referent.clone());
                        continue;
                    }
                    let names = match (&info.name, &info.names) {
                        (Some(name), None) => vec![name.clone()],
                        (None, Some(names)) => names.clone(),
                        _ => {
                            return Err(ZkCredError::Validation(format!(
                                "attribute referent '{referent}' must carry a name or names"
                            )))
                        }
                    };
                    let mut revealed = Vec::with_capacity(names.len());
                    for name in names {
                        let attr = cred.values.0.get(&name).ok_or_else(|| {
                            ZkCredError::Validation(format!(
                                "credential does not contain attribute '{name}'"
                            ))
                        })?;
                        revealed.push(RevealedAttribute {
                            raw: attr.raw.clone(),
                            encoded: attr
                                .encoded
                                .clone()
                                .unwrap_or_else(|| encode_attribute(&attr.raw)),
                            name,
                        });
                    }
                    blocks[entry_idx].revealed.insert(referent.clone(), revealed);
                }
                CredentialProve::Predicate { referent, .. } => {
                    let info = pres_req.requested_predicates.get(referent).ok_or_else(|| {
                        ZkCredError::NotFound(format!(
                            "predicate referent '{referent}' is not in the request"
                        ))
                    })?;
                    let attr = cred.values.0.get(&info.name).ok_or_else(|| {
                        ZkCredError::Validation(format!(
                            "credential does not contain attribute '{}'",
                            info.name
                        ))
                    })?;
                    let value = attr.raw.parse::<i64>().map_err(|_| {
                        ZkCredError::Validation(format!(
                            "attribute '{}' is not numeric and cannot satisfy a predicate",
                            info.name
                        ))
                    })?;
                    if !info.p_type.is_satisfied(value, info.p_value) {
                        return Err(ZkCredError::Validation(format!(
                            "predicate '{referent}' is not satisfied by the selected credential"
                        )));
                    }
                    blocks[entry_idx].predicates.push(referent.clone());
                }
            }
        }

        let self_attested: BTreeMap<String, String> = self_attested
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for referent in self_attested.keys() {
            if !pres_req.requested_attributes.contains_key(referent) {
                return Err(ZkCredError::NotFound(format!(
                    "self-attested referent '{referent}' is not in the request"
                )));
            }
        }

        let aggregate = aggregate_digest(&blocks, &self_attested, pres_req.nonce.as_str())?;
        trace!("assembled {} proof blocks", blocks.len());

        Ok(Presentation {
            value: serde_json::to_value(MockPresentation {
                blocks,
                self_attested,
                aggregate,
            })?,
        })
    }

    fn verify_presentation(
        &self,
        presentation: &Presentation,
        pres_req: &PresentationRequest,
        schemas: &[&Schema],
        cred_defs: &[&CredentialDefinition],
        rev_reg_defs: &[&RevocationRegistryDefinition],
        rev_reg_entries: &[RevocationEntry<'_>],
    ) -> ZkCredResult<bool> {
        let pres: MockPresentation = serde_json::from_value(presentation.value.clone())?;

        let expected =
            aggregate_digest(&pres.blocks, &pres.self_attested, pres_req.nonce.as_str())?;
        if pres.aggregate != expected {
            trace!("aggregate does not match the request nonce");
            return Ok(false);
        }

        let mut answered: BTreeSet<&str> = BTreeSet::new();
        for referent in pres.self_attested.keys() {
            if !pres_req.requested_attributes.contains_key(referent) {
                return Ok(false);
            }
            answered.insert(referent);
        }

        let mut links = BTreeSet::new();
        for block in &pres.blocks {
            let Some(cred_def) = cred_defs.iter().find(|cd| cd.id.0 == block.cred_def_id) else {
                trace!(
                    "presented definition {} does not resolve in the verifier catalog",
                    block.cred_def_id
                );
                return Ok(false);
            };
            if schemas.iter().all(|s| s.id.0 != block.schema_id) {
                trace!(
                    "presented schema {} does not resolve in the verifier catalog",
                    block.schema_id
                );
                return Ok(false);
            }
            if block.vk != digest(&["vk", &cred_def.value.to_string()]) {
                return Ok(false);
            }
            links.insert(&block.link);

            for (referent, attrs) in &block.revealed {
                let Some(info) = pres_req.requested_attributes.get(referent) else {
                    return Ok(false);
                };
                for attr in attrs {
                    let requested = match (&info.name, &info.names) {
                        (Some(name), None) => *name == attr.name,
                        (None, Some(names)) => names.contains(&attr.name),
                        _ => false,
                    };
                    if !requested || attr.encoded != encode_attribute(&attr.raw) {
                        return Ok(false);
                    }
                }
                answered.insert(referent);
            }
            for referent in &block.hidden {
                if !pres_req.requested_attributes.contains_key(referent) {
                    return Ok(false);
                }
                answered.insert(referent);
            }
            for referent in &block.predicates {
                if !pres_req.requested_predicates.contains_key(referent) {
                    return Ok(false);
                }
                answered.insert(referent);
            }

            if let Some(non_revoked) = &block.non_revoked {
                if let Some(interval) = &pres_req.non_revoked {
                    if interval.is_valid(non_revoked.timestamp).is_err() {
                        return Ok(false);
                    }
                }
                let Some(def_entry_idx) = rev_reg_defs
                    .iter()
                    .position(|def| def.id.0 == non_revoked.rev_reg_id)
                else {
                    return Ok(false);
                };
                let Some(entry) = rev_reg_entries.iter().find(|entry| {
                    entry.def_entry_idx == def_entry_idx
                        && entry.timestamp == non_revoked.timestamp
                }) else {
                    trace!(
                        "no registry state for {} at {}",
                        non_revoked.rev_reg_id,
                        non_revoked.timestamp
                    );
                    return Ok(false);
                };
                let state = RegistryState::from_registry(entry.registry)?;
                if state.accum != non_revoked.accum {
                    trace!("witness accumulator is stale for {}", non_revoked.rev_reg_id);
                    return Ok(false);
                }
                if state.revoked.contains(&non_revoked.index) {
                    trace!(
                        "index {} is revoked in {}",
                        non_revoked.index,
                        non_revoked.rev_reg_id
                    );
                    return Ok(false);
                }
            }
        }

        if links.len() > 1 {
            return Ok(false);
        }
        if pres_req
            .requested_attributes
            .keys()
            .any(|referent| !answered.contains(referent.as_str()))
        {
            return Ok(false);
        }
        if pres_req
            .requested_predicates
            .keys()
            .any(|referent| !answered.contains(referent.as_str()))
        {
            return Ok(false);
        }
        Ok(true)
    }

    fn create_revocation_registry(
        &self,
        cred_def_id: &CredentialDefinitionId,
        _cred_def: &CredentialDefinition,
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
        let seed = digest(&["revreg", cred_def_id.0.as_str(), tag]);
        let tails_hash = digest(&["tails", &seed]);
        let tails_path = tails_dir.join(&tails_hash);
        std::fs::write(&tails_path, &tails_hash).map_err(|err| {
            ZkCredError::Engine(format!(
                "cannot write tails file {}: {err}",
                tails_path.display()
            ))
        })?;

        let id =
            RevocationRegistryDefinitionId::new(format!("mock:revreg:{}:{tag}", &seed[..16]))?;
        let def = RevocationRegistryDefinition {
            id,
            issuer_id: IssuerId::new_unchecked(format!("mock:issuer:{}", &seed[..16])),
            revoc_def_type: registry_type,
            tag: tag.to_string(),
            cred_def_id: cred_def_id.clone(),
            value: RevocationRegistryDefinitionValue {
                max_cred_num,
                public_keys: json!({ "accumKey": { "z": digest(&["accum_key", &seed]) } }),
                tails_hash: tails_hash.clone(),
                tails_location: tails_path.display().to_string(),
            },
        };
        let private = RevocationRegistryDefinitionPrivate {
            value: json!({ "gamma": digest(&["gamma", &seed]) }),
        };

        let accum = accumulator(&tails_hash, &BTreeSet::new());
        let registry = RegistryState {
            accum: accum.clone(),
            issued: BTreeSet::new(),
            revoked: BTreeSet::new(),
        }
        .into_registry()?;
        let initial_delta = RevocationRegistryDelta {
            value: RevocationRegistryDeltaValue {
                prev_accum: None,
                accum,
                issued: vec![],
                revoked: vec![],
            },
        };
        Ok((def, private, registry, initial_delta))
    }

    fn revoke_credential(
        &self,
        reg_def: &RevocationRegistryDefinition,
        registry: &RevocationRegistry,
        index: u32,
        tails_path: &Path,
    ) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)> {
        check_tails(tails_path)?;
        if index >= reg_def.value.max_cred_num {
            return Err(ZkCredError::OutOfRange(format!(
                "revocation index {index} exceeds registry capacity {}",
                reg_def.value.max_cred_num
            )));
        }
        let mut state = RegistryState::from_registry(registry)?;
        if !state.revoked.insert(index) {
            return Err(ZkCredError::OutOfRange(format!(
                "index {index} is already revoked in registry {}",
                reg_def.id
            )));
        }
        let prev_accum = state.accum.clone();
        state.accum = accumulator(&reg_def.value.tails_hash, &state.revoked);

        let delta = RevocationRegistryDelta {
            value: RevocationRegistryDeltaValue {
                prev_accum: Some(prev_accum),
                accum: state.accum.clone(),
                issued: vec![],
                revoked: vec![index],
            },
        };
        Ok((state.into_registry()?, delta))
    }

    fn update_revocation_registry(
        &self,
        reg_def: &RevocationRegistryDefinition,
        registry: &RevocationRegistry,
        issued: &[u32],
        revoked: &[u32],
        tails_path: &Path,
    ) -> ZkCredResult<(RevocationRegistry, RevocationRegistryDelta)> {
        check_tails(tails_path)?;
        let mut state = RegistryState::from_registry(registry)?;
        for idx in issued {
            state.issued.insert(*idx);
            state.revoked.remove(idx);
        }
        for idx in revoked {
            state.revoked.insert(*idx);
            state.issued.remove(idx);
        }
        let prev_accum = state.accum.clone();
        state.accum = accumulator(&reg_def.value.tails_hash, &state.revoked);

        let mut issued = issued.to_vec();
        issued.sort_unstable();
        issued.dedup();
        let mut revoked = revoked.to_vec();
        revoked.sort_unstable();
        revoked.dedup();
        let delta = RevocationRegistryDelta {
            value: RevocationRegistryDeltaValue {
                prev_accum: Some(prev_accum),
                accum: state.accum.clone(),
                issued,
                revoked,
            },
        };
        Ok((state.into_registry()?, delta))
    }

    fn merge_revocation_registry_deltas(
        &self,
        earlier: &RevocationRegistryDelta,
        later: &RevocationRegistryDelta,
    ) -> ZkCredResult<RevocationRegistryDelta> {
        if !earlier.value.precedes(&later.value) {
            return Err(ZkCredError::Validation(
                "cannot merge non-adjacent registry deltas".into(),
            ));
        }
        let later_issued: BTreeSet<u32> = later.value.issued.iter().copied().collect();
        let later_revoked: BTreeSet<u32> = later.value.revoked.iter().copied().collect();

        let issued: BTreeSet<u32> = earlier
            .value
            .issued
            .iter()
            .chain(later.value.issued.iter())
            .copied()
            .filter(|idx| !later_revoked.contains(idx))
            .collect();
        let revoked: BTreeSet<u32> = earlier
            .value
            .revoked
            .iter()
            .chain(later.value.revoked.iter())
            .copied()
            .filter(|idx| !later_issued.contains(idx))
            .collect();

        Ok(RevocationRegistryDelta {
            value: RevocationRegistryDeltaValue {
                prev_accum: earlier.value.prev_accum.clone(),
                accum: later.value.accum.clone(),
                issued: issued.into_iter().collect(),
                revoked: revoked.into_iter().collect(),
            },
        })
    }

    fn create_or_update_revocation_state(
        &self,
        reg_def: &RevocationRegistryDefinition,
        delta: &RevocationRegistryDelta,
        index: u32,
        timestamp: u64,
        tails_path: &Path,
        prior_state: Option<&CredentialRevocationState>,
        prior_delta: Option<&RevocationRegistryDelta>,
    ) -> ZkCredResult<CredentialRevocationState> {
        check_tails(tails_path)?;
        if index >= reg_def.value.max_cred_num {
            return Err(ZkCredError::OutOfRange(format!(
                "revocation index {index} exceeds registry capacity {}",
                reg_def.value.max_cred_num
            )));
        }

        let delta_issued: BTreeSet<u32> = delta.value.issued.iter().copied().collect();
        let delta_revoked: BTreeSet<u32> = delta.value.revoked.iter().copied().collect();

        let revoked = match (prior_state, prior_delta) {
            (Some(state), Some(prior)) => {
                if !prior.value.precedes(&delta.value) {
                    return Err(ZkCredError::Validation(
                        "witness update delta does not continue the prior delta".into(),
                    ));
                }
                let prior_witness: WitnessState = serde_json::from_value(state.witness.clone())?;
                prior_witness
                    .revoked
                    .into_iter()
                    .chain(delta_revoked)
                    .filter(|idx| !delta_issued.contains(idx))
                    .collect()
            }
            (None, None) => delta_revoked,
            _ => {
                return Err(ZkCredError::Validation(
                    "witness update requires both the prior state and its source delta".into(),
                ))
            }
        };

        let witness = WitnessState {
            accum: delta.value.accum.clone(),
            revoked,
        };
        Ok(CredentialRevocationState {
            rev_reg: json!({ "accum": witness.accum }),
            witness: serde_json::to_value(witness)?,
            timestamp,
        })
    }
}
