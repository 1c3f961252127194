mod common;

use common::{employee_values, holder_setup, issuer_setup, named_issuer_setup, MASTER_SECRET_ID};
use zkcred_flows::{errors::error::ZkCredError, issuance, loader::Loadable};

#[test]
fn issues_and_processes_a_non_revocable_credential() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);

    let (credential, registry, delta) = issuance::issue_credential(
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

    assert!(registry.is_none());
    assert!(delta.is_none());
    assert!(credential.rev_reg_id.is_none());
    assert!(credential.values.0["age"].encoded.is_some());

    let processed = issuance::process_credential(
        &setup.engine,
        &credential,
        &holder.metadata,
        &holder.master_secret,
        &setup.cred_def,
        None,
    )
    .unwrap();
    assert_eq!(processed.cred_def_id, setup.cred_def.id);
}

#[test]
fn processing_with_the_wrong_master_secret_fails() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);

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

    let other_secret = issuance::create_master_secret(&setup.engine).unwrap();
    let err = issuance::process_credential(
        &setup.engine,
        &credential,
        &holder.metadata,
        &other_secret,
        &setup.cred_def,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Validation(_)));
}

#[test]
fn requesting_against_a_foreign_definition_fails() {
    let setup = issuer_setup(&["name", "age"], false);
    let other = named_issuer_setup("mock:issuer:globex", "paint", &["color"], false);
    let holder = holder_setup(&setup);

    let err = issuance::create_credential_request(
        &setup.engine,
        None,
        &other.cred_def,
        &holder.master_secret,
        MASTER_SECRET_ID,
        &holder.offer,
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Validation(_)));
}

#[test]
fn empty_raw_values_are_rejected() {
    let setup = issuer_setup(&["name", "age"], false);
    let holder = holder_setup(&setup);

    let mut values = employee_values();
    values.insert("name".to_string(), String::new());

    let err = issuance::issue_credential(
        &setup.engine,
        &setup.cred_def,
        &setup.cred_def_private,
        &holder.offer,
        &holder.request,
        values,
        None,
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Validation(_)));
}

#[test]
fn entities_load_from_serialized_forms() {
    let setup = issuer_setup(&["name", "age"], false);
    let master_secret = issuance::create_master_secret(&setup.engine).unwrap();
    let offer = issuance::create_credential_offer(
        &setup.engine,
        &setup.schema.id,
        &setup.cred_def.id,
        &setup.correctness_proof,
    )
    .unwrap();

    let offer_text = serde_json::to_string(&offer).unwrap();
    let cred_def_json = serde_json::to_value(&setup.cred_def).unwrap();

    let (request, _) = issuance::create_credential_request(
        &setup.engine,
        Some("did:mock:holder"),
        Loadable::from(cred_def_json),
        &master_secret,
        MASTER_SECRET_ID,
        offer_text.as_str(),
    )
    .unwrap();
    assert_eq!(request.cred_def_id, setup.cred_def.id);
    assert_eq!(request.prover_did.as_deref(), Some("did:mock:holder"));
}

#[test]
fn malformed_payloads_fail_to_load() {
    let setup = issuer_setup(&["name"], false);
    let master_secret = issuance::create_master_secret(&setup.engine).unwrap();

    let err = issuance::create_credential_request(
        &setup.engine,
        None,
        "not json at all",
        &master_secret,
        MASTER_SECRET_ID,
        "{}",
    )
    .unwrap_err();
    assert!(matches!(err, ZkCredError::Format(_)));
}
