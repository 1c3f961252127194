//! Holder-side proof assembly: selecting which credentials answer which
//! referents of a request, then building the presentation through the engine.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::trace;
use zkcred_types::{
    data_types::{
        ledger::{cred_def::CredentialDefinition, schema::Schema},
        messages::{
            credential::Credential, master_secret::MasterSecret, pres_request::PresentationRequest,
            presentation::Presentation, rev_state::CredentialRevocationState,
        },
    },
    utils::validation::Validatable,
};

use crate::{
    engine::{CredentialDefinitionsMap, CredentialEntry, CredentialProve, ProofEngine, SchemasMap},
    errors::error::{ZkCredError, ZkCredResult},
    loader::Loadable,
};

/// How one credential answers a subset of a request, at one timestamp.
#[derive(Debug, Default)]
struct CredentialDisclosure<'p> {
    rev_state: Option<&'p CredentialRevocationState>,
    attributes: BTreeMap<String, bool>,
    predicates: BTreeSet<String>,
}

/// Accumulates the holder's choice of credentials for a presentation.
///
/// Each selected credential may answer referents at several timestamps; each
/// `(credential, timestamp)` pair carries its own disclosure set and optional
/// revocation state. Credentials are grouped by reference, so repeated calls
/// must pass the same borrow to extend a group. Adding the same referent
/// twice for a pair keeps the latest reveal flag, and the latest non-null
/// revocation state wins.
#[derive(Debug, Default)]
pub struct PresentCredentials<'p> {
    creds: Vec<(&'p Credential, BTreeMap<Option<u64>, CredentialDisclosure<'p>>)>,
    self_attested: HashMap<String, String>,
}

impl<'p> PresentCredentials<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    fn disclosure_mut(
        &mut self,
        credential: &'p Credential,
        timestamp: Option<u64>,
        rev_state: Option<&'p CredentialRevocationState>,
    ) -> &mut CredentialDisclosure<'p> {
        let pos = match self
            .creds
            .iter()
            .position(|(cred, _)| std::ptr::eq(*cred, credential))
        {
            Some(pos) => pos,
            None => {
                self.creds.push((credential, BTreeMap::new()));
                self.creds.len() - 1
            }
        };
        let disclosure = self.creds[pos].1.entry(timestamp).or_default();
        if rev_state.is_some() {
            disclosure.rev_state = rev_state;
        }
        disclosure
    }

    /// Marks `credential` as answering the attribute `referents` at
    /// `timestamp`, revealed or not. Empty referent strings are skipped.
    pub fn add_attributes<'r>(
        &mut self,
        credential: &'p Credential,
        referents: impl IntoIterator<Item = &'r str>,
        reveal: bool,
        timestamp: Option<u64>,
        rev_state: Option<&'p CredentialRevocationState>,
    ) {
        let disclosure = self.disclosure_mut(credential, timestamp, rev_state);
        for referent in referents {
            if referent.is_empty() {
                continue;
            }
            disclosure.attributes.insert(referent.to_string(), reveal);
        }
    }

    /// Marks `credential` as answering the predicate `referents` at
    /// `timestamp`. Empty referent strings are skipped.
    pub fn add_predicates<'r>(
        &mut self,
        credential: &'p Credential,
        referents: impl IntoIterator<Item = &'r str>,
        timestamp: Option<u64>,
        rev_state: Option<&'p CredentialRevocationState>,
    ) {
        let disclosure = self.disclosure_mut(credential, timestamp, rev_state);
        for referent in referents {
            if referent.is_empty() {
                continue;
            }
            disclosure.predicates.insert(referent.to_string());
        }
    }

    /// Answers an attribute referent with a self-attested value instead of a
    /// credential.
    pub fn add_self_attested(&mut self, referent: impl Into<String>, value: impl Into<String>) {
        self.self_attested.insert(referent.into(), value.into());
    }

    /// Number of `(credential, timestamp)` pairs that carry at least one
    /// referent.
    pub fn len(&self) -> usize {
        self.creds
            .iter()
            .flat_map(|(_, by_ts)| by_ts.values())
            .filter(|d| !d.attributes.is_empty() || !d.predicates.is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds a presentation answering `pres_req` from the selected credentials.
///
/// Selected `(credential, timestamp)` pairs are flattened into entries in
/// selection order and every referent instruction carries its entry's index,
/// so the engine sees an unambiguous mapping from referent to credential.
/// Every referenced schema and credential definition must be present in the
/// supplied catalogs.
#[allow(clippy::too_many_arguments)]
pub fn create_presentation(
    engine: &impl ProofEngine,
    pres_req: impl Into<Loadable<PresentationRequest>>,
    credentials: &PresentCredentials<'_>,
    master_secret: impl Into<Loadable<MasterSecret>>,
    schemas: &SchemasMap,
    cred_defs: &CredentialDefinitionsMap,
) -> ZkCredResult<Presentation> {
    let pres_req = pres_req.into().load()?;
    let master_secret = master_secret.into().load()?;
    pres_req.validate()?;

    let mut entries: Vec<CredentialEntry<'_>> = Vec::new();
    let mut proofs: Vec<CredentialProve> = Vec::new();

    for (credential, by_timestamp) in &credentials.creds {
        if !schemas.contains_key(&credential.schema_id) {
            return Err(ZkCredError::NotFound(format!(
                "schema {} is not in the provided catalog",
                credential.schema_id
            )));
        }
        if !cred_defs.contains_key(&credential.cred_def_id) {
            return Err(ZkCredError::NotFound(format!(
                "credential definition {} is not in the provided catalog",
                credential.cred_def_id
            )));
        }

        for (timestamp, disclosure) in by_timestamp {
            if disclosure.attributes.is_empty() && disclosure.predicates.is_empty() {
                continue;
            }

            let entry_idx = entries.len();
            entries.push(CredentialEntry {
                credential: *credential,
                timestamp: *timestamp,
                rev_state: disclosure.rev_state,
            });

            for (referent, reveal) in &disclosure.attributes {
                proofs.push(CredentialProve::Attribute {
                    entry_idx,
                    referent: referent.clone(),
                    reveal: *reveal,
                });
            }
            for referent in &disclosure.predicates {
                proofs.push(CredentialProve::Predicate {
                    entry_idx,
                    referent: referent.clone(),
                });
            }
        }
    }

    trace!(
        "assembling presentation for '{}' from {} credential entries",
        pres_req.name,
        entries.len()
    );

    engine.create_presentation(
        &pres_req,
        &entries,
        &proofs,
        &credentials.self_attested,
        &master_secret,
        schemas,
        cred_defs,
    )
}

/// Convenience for callers holding plain slices: builds the schema and
/// credential definition catalogs keyed by their embedded ids.
pub fn build_catalogs(
    schemas: &[Schema],
    cred_defs: &[CredentialDefinition],
) -> (SchemasMap, CredentialDefinitionsMap) {
    let schemas = schemas
        .iter()
        .map(|s| (s.id.clone(), s.clone()))
        .collect::<SchemasMap>();
    let cred_defs = cred_defs
        .iter()
        .map(|cd| (cd.id.clone(), cd.clone()))
        .collect::<CredentialDefinitionsMap>();
    (schemas, cred_defs)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zkcred_types::data_types::messages::credential::{Credential, CredentialValues};

    use super::*;

    fn credential(schema: &str, cred_def: &str) -> Credential {
        let mut raw = HashMap::new();
        raw.insert("name".to_string(), "alice".to_string());
        Credential {
            schema_id: schema.try_into().unwrap(),
            cred_def_id: cred_def.try_into().unwrap(),
            rev_reg_id: None,
            rev_reg_index: None,
            values: CredentialValues::new(raw, None).unwrap(),
            signature: json!({}),
            signature_correctness_proof: json!({}),
            witness: None,
        }
    }

    #[test]
    fn empty_referents_are_skipped() {
        let cred = credential("mock:uri:schema", "mock:uri:creddef");
        let mut creds = PresentCredentials::new();
        creds.add_attributes(&cred, ["", "attr_1"], true, None, None);
        creds.add_predicates(&cred, [""], None, None);

        assert_eq!(creds.len(), 1);
        let (_, by_ts) = &creds.creds[0];
        let disclosure = &by_ts[&None];
        assert_eq!(disclosure.attributes.len(), 1);
        assert!(disclosure.predicates.is_empty());
    }

    #[test]
    fn repeated_referent_keeps_latest_reveal() {
        let cred = credential("mock:uri:schema", "mock:uri:creddef");
        let mut creds = PresentCredentials::new();
        creds.add_attributes(&cred, ["attr_1"], false, None, None);
        creds.add_attributes(&cred, ["attr_1"], true, None, None);

        let (_, by_ts) = &creds.creds[0];
        assert!(by_ts[&None].attributes["attr_1"]);
    }

    #[test]
    fn timestamps_separate_disclosures() {
        let cred = credential("mock:uri:schema", "mock:uri:creddef");
        let mut creds = PresentCredentials::new();
        creds.add_attributes(&cred, ["attr_1"], true, Some(10), None);
        creds.add_predicates(&cred, ["pred_1"], Some(20), None);

        assert_eq!(creds.len(), 2);
        assert_eq!(creds.creds.len(), 1);
    }

    #[test]
    fn credentials_group_by_reference_not_value() {
        let cred = credential("mock:uri:schema", "mock:uri:creddef");
        let twin = credential("mock:uri:schema", "mock:uri:creddef");
        let mut creds = PresentCredentials::new();
        creds.add_attributes(&cred, ["attr_1"], true, None, None);
        creds.add_attributes(&cred, ["attr_2"], true, None, None);
        creds.add_attributes(&twin, ["attr_3"], true, None, None);

        assert_eq!(creds.creds.len(), 2);
        let (_, by_ts) = &creds.creds[0];
        assert_eq!(by_ts[&None].attributes.len(), 2);
    }

    #[test]
    fn pairs_without_referents_do_not_count() {
        let cred = credential("mock:uri:schema", "mock:uri:creddef");
        let mut creds = PresentCredentials::new();
        creds.add_attributes(&cred, Vec::<&str>::new(), true, None, None);

        assert!(creds.is_empty());
    }
}
