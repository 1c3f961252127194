mod common;

use std::collections::HashMap;

use common::{
    employee_values, holder_setup, issuer_setup, named_issuer_setup, tails_dir, HolderSetup,
    IssuerSetup,
};
use zkcred_flows::{
    engine::{RevocationRegistriesMap, RevocationRegistryDefinitionsMap},
    errors::error::ZkCredError,
    issuance::{self, CredentialRevocationConfig},
    presentation::{build_catalogs, create_presentation, PresentCredentials},
    revocation::{self, RevocationLedger},
    verification::verify_presentation,
};
use zkcred_types::data_types::{
    ledger::rev_reg_def::RegistryType,
    messages::{
        credential::Credential,
        pres_request::{
            AttributeInfo, NonRevokedInterval, PredicateInfo, PredicateTypes, PresentationRequest,
        },
        rev_state::CredentialRevocationState,
    },
};

fn proof_request(nonce: &str, non_revoked: Option<NonRevokedInterval>) -> PresentationRequest {
    let mut requested_attributes = HashMap::new();
    requested_attributes.insert(
        "attr1_referent".to_string(),
        AttributeInfo {
            name: Some("name".to_string()),
            names: None,
            restrictions: None,
            non_revoked: None,
        },
    );
    let mut requested_predicates = HashMap::new();
    requested_predicates.insert(
        "pred1_referent".to_string(),
        PredicateInfo {
            name: "age".to_string(),
            p_type: PredicateTypes::GE,
            p_value: 18,
            restrictions: None,
            non_revoked: None,
        },
    );
    PresentationRequest {
        nonce: nonce.try_into().unwrap(),
        name: "employment-check".to_string(),
        version: "1.0".to_string(),
        requested_attributes,
        requested_predicates,
        non_revoked,
    }
}

fn issued_credential(setup: &IssuerSetup, holder: &HolderSetup) -> Credential {
    let (credential, _, _) = issuance::issue_credential(
        &setup.engine,
        &setup.cred_def,
        &setup.cred_def_private,
        &holder.offer,
        &holder.request,
        employee_values(),
        None,
        None,
        None,
    )
    .unwrap();
    issuance::process_credential(
        &setup.engine,
        &credential,
        &holder.metadata,
        &holder.master_secret,
        &setup.cred_def,
        None,
    )
    .unwrap()
}

#[test]
fn presentation_round_trip_verifies() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);
    assert_eq!(creds.len(), 1);

    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();

    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(verified);
}

#[test]
fn verification_against_a_different_request_fails() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);

    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();

    let other_request = proof_request("445566", None);
    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &other_request,
        &schemas,
        &cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(!verified);
}

#[test]
fn verification_with_a_foreign_catalog_fails_cleanly() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);

    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();

    let other = named_issuer_setup("mock:issuer:globex", "paint", &["name", "age"], false);
    let (other_schemas, other_cred_defs) = build_catalogs(
        std::slice::from_ref(&other.schema),
        std::slice::from_ref(&other.cred_def),
    );
    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &request,
        &other_schemas,
        &other_cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(!verified);
}

#[test]
fn unsatisfied_predicate_fails_at_creation() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut request = proof_request("112233", None);
    request
        .requested_predicates
        .get_mut("pred1_referent")
        .unwrap()
        .p_value = 40;

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let err = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Validation(_)));
}

#[test]
fn unrevealed_attributes_still_answer_the_request() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], false, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);

    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();
    assert!(!presentation.value["blocks"][0]["hidden"]
        .as_array()
        .unwrap()
        .is_empty());

    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(verified);
}

#[test]
fn self_attested_values_answer_attribute_referents() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut request = proof_request("112233", None);
    request.requested_attributes.insert(
        "attr2_referent".to_string(),
        AttributeInfo {
            name: Some("favourite_color".to_string()),
            names: None,
            restrictions: None,
            non_revoked: None,
        },
    );

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);
    creds.add_self_attested("attr2_referent", "blue");

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();
    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(verified);
}

#[test]
fn unanswered_referents_fail_verification() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);

    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let presentation = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap();
    let verified = verify_presentation(
        &setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        None,
        None,
    )
    .unwrap();
    assert!(!verified);
}

#[test]
fn missing_catalog_entries_are_reported() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);

    let request = proof_request("112233", None);
    let (schemas, _) = build_catalogs(std::slice::from_ref(&setup.schema), &[]);
    let err = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &holder.master_secret,
        &schemas,
        &HashMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::NotFound(_)));
}

#[test]
fn foreign_master_secret_fails_presentation_creation() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);
    let credential = issued_credential(&setup, &holder);

    let mut creds = PresentCredentials::new();
    creds.add_attributes(&credential, ["attr1_referent"], true, None, None);
    creds.add_predicates(&credential, ["pred1_referent"], None, None);

    let other_secret = issuance::create_master_secret(&setup.engine).unwrap();
    let request = proof_request("112233", None);
    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&setup.schema),
        std::slice::from_ref(&setup.cred_def),
    );
    let err = create_presentation(
        &setup.engine,
        &request,
        &creds,
        &other_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Validation(_)));
}

struct RevocableWorld {
    setup: IssuerSetup,
    holder: HolderSetup,
    ledger: RevocationLedger,
    credential: Credential,
}

/// Issues a revocable credential at index 0 (published at t=100), then
/// revokes it at t=120. Registry states exist at t=100, t=110 and t=120.
fn revocable_world() -> RevocableWorld {
    let setup = issuer_setup(&["name", "age"], true);
    let holder = holder_setup(&setup);
    let mut ledger = RevocationLedger::create(
        &setup.engine,
        &setup.cred_def.id,
        &setup.cred_def,
        "reg1",
        RegistryType::CL_ACCUM,
        10,
        &tails_dir(),
        100,
    )
    .unwrap();

    let config = CredentialRevocationConfig::builder()
        .reg_def(ledger.reg_def().clone())
        .reg_def_private(ledger.reg_def_private().clone())
        .registry(ledger.registry().clone())
        .registry_idx(0)
        .tails_path(ledger.tails_path().to_path_buf())
        .build();
    let (credential, _, _) = issuance::issue_credential(
        &setup.engine,
        &setup.cred_def,
        &setup.cred_def_private,
        &holder.offer,
        &holder.request,
        employee_values(),
        None,
        Some(&ledger.reg_def().id),
        Some(&config),
    )
    .unwrap();

    ledger.update(&setup.engine, &[0], &[], 110).unwrap();
    ledger.revoke(&setup.engine, 0, 120).unwrap();

    RevocableWorld {
        setup,
        holder,
        ledger,
        credential,
    }
}

fn witness_at(world: &RevocableWorld, from: u64, to: u64) -> CredentialRevocationState {
    let delta = world
        .ledger
        .cumulative_delta(&world.setup.engine, from, to)
        .unwrap();
    revocation::create_or_update_revocation_state(
        &world.setup.engine,
        world.ledger.reg_def(),
        &delta,
        0,
        to,
        world.ledger.tails_path(),
        None,
        None,
    )
    .unwrap()
}

fn registry_catalogs(
    world: &RevocableWorld,
    timestamps: &[u64],
) -> (RevocationRegistryDefinitionsMap, RevocationRegistriesMap) {
    let def = world.ledger.reg_def().clone();
    let mut states = HashMap::new();
    for ts in timestamps {
        let entry = world.ledger.entry_at(*ts).unwrap();
        states.insert(entry.timestamp, entry.registry.clone());
    }
    let mut defs = RevocationRegistryDefinitionsMap::new();
    let mut regs = RevocationRegistriesMap::new();
    regs.insert(def.id.clone(), states);
    defs.insert(def.id.clone(), def);
    (defs, regs)
}

fn present_at(
    world: &RevocableWorld,
    request: &PresentationRequest,
    state: &CredentialRevocationState,
    timestamp: u64,
) -> zkcred_types::data_types::messages::presentation::Presentation {
    let mut creds = PresentCredentials::new();
    creds.add_attributes(
        &world.credential,
        ["attr1_referent"],
        true,
        Some(timestamp),
        Some(state),
    );
    creds.add_predicates(
        &world.credential,
        ["pred1_referent"],
        Some(timestamp),
        Some(state),
    );

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&world.setup.schema),
        std::slice::from_ref(&world.setup.cred_def),
    );
    create_presentation(
        &world.setup.engine,
        request,
        &creds,
        &world.holder.master_secret,
        &schemas,
        &cred_defs,
    )
    .unwrap()
}

#[test]
fn fresh_witness_before_revocation_verifies() {
    let world = revocable_world();
    let request = proof_request(
        "112233",
        Some(NonRevokedInterval::new(Some(100), Some(200))),
    );
    let state = witness_at(&world, 100, 110);
    let presentation = present_at(&world, &request, &state, 110);

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&world.setup.schema),
        std::slice::from_ref(&world.setup.cred_def),
    );
    let (defs, regs) = registry_catalogs(&world, &[110, 120]);
    let verified = verify_presentation(
        &world.setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        Some(&defs),
        Some(&regs),
    )
    .unwrap();
    assert!(verified);
}

#[test]
fn stale_witness_at_a_later_timestamp_fails() {
    let world = revocable_world();
    let request = proof_request(
        "112233",
        Some(NonRevokedInterval::new(Some(100), Some(200))),
    );
    let state = witness_at(&world, 100, 110);
    let presentation = present_at(&world, &request, &state, 120);

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&world.setup.schema),
        std::slice::from_ref(&world.setup.cred_def),
    );
    let (defs, regs) = registry_catalogs(&world, &[110, 120]);
    let verified = verify_presentation(
        &world.setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        Some(&defs),
        Some(&regs),
    )
    .unwrap();
    assert!(!verified);
}

#[test]
fn revoked_credential_fails_even_with_a_current_witness() {
    let world = revocable_world();
    let request = proof_request(
        "112233",
        Some(NonRevokedInterval::new(Some(100), Some(200))),
    );
    let state = witness_at(&world, 100, 120);
    let presentation = present_at(&world, &request, &state, 120);

    let (schemas, cred_defs) = build_catalogs(
        std::slice::from_ref(&world.setup.schema),
        std::slice::from_ref(&world.setup.cred_def),
    );
    let (defs, regs) = registry_catalogs(&world, &[110, 120]);
    let verified = verify_presentation(
        &world.setup.engine,
        &presentation,
        &request,
        &schemas,
        &cred_defs,
        Some(&defs),
        Some(&regs),
    )
    .unwrap();
    assert!(!verified);
}
