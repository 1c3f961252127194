use std::str::FromStr;

use serde_json::Value;

use crate::{
    data_types::identifiers::{
        cred_def_id::CredentialDefinitionId, issuer_id::IssuerId, schema_id::SchemaId,
    },
    utils::validation::Validatable,
};

pub const CL_SIGNATURE_TYPE: &str = "CL";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum SignatureType {
    CL,
}

impl FromStr for SignatureType {
    type Err = crate::ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CL_SIGNATURE_TYPE => Ok(Self::CL),
            _ => Err(crate::ConversionError::from_msg("Invalid signature type")),
        }
    }
}

/// Issuer's public key material bound to a schema. The `value` payload is an
/// opaque proof-engine object.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDefinition {
    pub id: CredentialDefinitionId,
    pub schema_id: SchemaId,
    pub issuer_id: IssuerId,
    pub tag: String,
    #[serde(rename = "type")]
    pub signature_type: SignatureType,
    pub value: Value,
}

impl Validatable for CredentialDefinition {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        self.id.validate()?;
        self.schema_id.validate()?;
        self.issuer_id.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialDefinitionPrivate {
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyCorrectnessProof {
    pub value: Value,
}
