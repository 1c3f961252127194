//! Verifier side: flattens the verifier's catalogs into the positional form
//! the engine consumes and checks a presentation against its request.

use log::debug;
use zkcred_types::{
    data_types::messages::{presentation::Presentation, pres_request::PresentationRequest},
    utils::validation::Validatable,
};

use crate::{
    engine::{
        CredentialDefinitionsMap, ProofEngine, RevocationEntry, RevocationRegistriesMap,
        RevocationRegistryDefinitionsMap, SchemasMap,
    },
    errors::error::ZkCredResult,
    loader::Loadable,
};

/// Checks `presentation` against `pres_req` using the verifier's own view of
/// the relevant schemas, credential definitions and registry states.
///
/// Returns `Ok(false)` when the presentation is well formed but does not
/// prove what the request asks; errors are reserved for malformed input.
/// Registry states are matched to their definitions by position: each
/// definition's states are tagged with the index the definition holds in the
/// flattened catalog.
pub fn verify_presentation(
    engine: &impl ProofEngine,
    presentation: impl Into<Loadable<Presentation>>,
    pres_req: impl Into<Loadable<PresentationRequest>>,
    schemas: &SchemasMap,
    cred_defs: &CredentialDefinitionsMap,
    rev_reg_defs: Option<&RevocationRegistryDefinitionsMap>,
    rev_regs: Option<&RevocationRegistriesMap>,
) -> ZkCredResult<bool> {
    let presentation = presentation.into().load()?;
    let pres_req = pres_req.into().load()?;
    pres_req.validate()?;

    let schema_refs: Vec<_> = schemas.values().collect();
    let cred_def_refs: Vec<_> = cred_defs.values().collect();

    let mut def_refs = Vec::new();
    let mut entries = Vec::new();
    if let Some(rev_reg_defs) = rev_reg_defs {
        for (def_id, def) in rev_reg_defs {
            let def_entry_idx = def_refs.len();
            def_refs.push(def);

            if let Some(states) = rev_regs.and_then(|regs| regs.get(def_id)) {
                for (timestamp, registry) in states {
                    entries.push(RevocationEntry {
                        def_entry_idx,
                        registry,
                        timestamp: *timestamp,
                    });
                }
            }
        }
    }

    debug!(
        "verifying presentation '{}' against {} schemas, {} definitions, {} registry states",
        pres_req.name,
        schema_refs.len(),
        cred_def_refs.len(),
        entries.len()
    );

    engine.verify_presentation(
        &presentation,
        &pres_req,
        &schema_refs,
        &cred_def_refs,
        &def_refs,
        &entries,
    )
}
