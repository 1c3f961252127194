#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use rand::Rng;
use zkcred_flows::issuance;
use zkcred_types::data_types::{
    identifiers::issuer_id::IssuerId,
    ledger::{
        cred_def::{
            CredentialDefinition, CredentialDefinitionPrivate, KeyCorrectnessProof, SignatureType,
        },
        schema::Schema,
    },
    messages::{
        cred_offer::CredentialOffer,
        cred_request::{CredentialRequest, CredentialRequestMetadata},
        master_secret::MasterSecret,
    },
};
use zkcred_test_utils::MockProofEngine;

pub const MASTER_SECRET_ID: &str = "default";

pub struct IssuerSetup {
    pub engine: MockProofEngine,
    pub issuer_id: IssuerId,
    pub schema: Schema,
    pub cred_def: CredentialDefinition,
    pub cred_def_private: CredentialDefinitionPrivate,
    pub correctness_proof: KeyCorrectnessProof,
}

pub struct HolderSetup {
    pub master_secret: MasterSecret,
    pub offer: CredentialOffer,
    pub request: CredentialRequest,
    pub metadata: CredentialRequestMetadata,
}

pub fn issuer_setup(attrs: &[&str], support_revocation: bool) -> IssuerSetup {
    named_issuer_setup("mock:issuer:acme", "employee", attrs, support_revocation)
}

pub fn named_issuer_setup(
    issuer: &str,
    schema_name: &str,
    attrs: &[&str],
    support_revocation: bool,
) -> IssuerSetup {
    zkcred_test_utils::init_logger();
    let engine = MockProofEngine::new();
    let issuer_id = IssuerId::new(issuer).unwrap();

    let schema = issuance::create_schema(&engine, schema_name, "1.0", &issuer_id, attrs).unwrap();
    let (cred_def, cred_def_private, correctness_proof) = issuance::create_credential_definition(
        &engine,
        &schema.id,
        &schema,
        &issuer_id,
        "tag1",
        SignatureType::CL,
        support_revocation,
    )
    .unwrap();

    IssuerSetup {
        engine,
        issuer_id,
        schema,
        cred_def,
        cred_def_private,
        correctness_proof,
    }
}

pub fn holder_setup(setup: &IssuerSetup) -> HolderSetup {
    let master_secret = issuance::create_master_secret(&setup.engine).unwrap();
    let offer = issuance::create_credential_offer(
        &setup.engine,
        &setup.schema.id,
        &setup.cred_def.id,
        &setup.correctness_proof,
    )
    .unwrap();
    let (request, metadata) = issuance::create_credential_request(
        &setup.engine,
        None,
        &setup.cred_def,
        &master_secret,
        MASTER_SECRET_ID,
        &offer,
    )
    .unwrap();

    HolderSetup {
        master_secret,
        offer,
        request,
        metadata,
    }
}

pub fn employee_values() -> HashMap<String, String> {
    let mut values = HashMap::new();
    values.insert("name".to_string(), "alice".to_string());
    values.insert("age".to_string(), "34".to_string());
    values
}

/// A fresh directory for tails files, unique per call.
pub fn tails_dir() -> PathBuf {
    let mut rng = rand::thread_rng();
    let dir = std::env::temp_dir().join(format!("zkcred-tails-{:08x}", rng.gen::<u32>()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
