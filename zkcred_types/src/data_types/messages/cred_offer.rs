use serde_json::Value;

use super::nonce::Nonce;
use crate::{
    data_types::identifiers::{cred_def_id::CredentialDefinitionId, schema_id::SchemaId},
    utils::validation::Validatable,
};

/// Issuer's invitation to request a credential against a definition.
/// One offer per issuance attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialOffer {
    pub schema_id: SchemaId,
    pub cred_def_id: CredentialDefinitionId,
    pub key_correctness_proof: Value,
    pub nonce: Nonce,
}

impl Validatable for CredentialOffer {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        self.schema_id.validate()?;
        self.cred_def_id.validate()?;
        Ok(())
    }
}
