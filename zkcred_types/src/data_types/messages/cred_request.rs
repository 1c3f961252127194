use serde_json::Value;

use super::nonce::Nonce;
use crate::{
    data_types::identifiers::cred_def_id::CredentialDefinitionId,
    utils::validation::Validatable,
};

/// Holder's blinded credential request. The blinded secrets payload is an
/// opaque proof-engine object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prover_did: Option<String>,
    pub cred_def_id: CredentialDefinitionId,
    pub blinded_secrets: Value,
    pub nonce: Nonce,
}

impl Validatable for CredentialRequest {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        self.cred_def_id.validate()?;
        Ok(())
    }
}

/// Holder-side data required to unblind the issued credential. Consumed by
/// credential processing; never shared with the issuer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialRequestMetadata {
    pub link_secret_blinding: Value,
    pub link_secret_name: String,
    pub nonce: Nonce,
}
