use std::str::FromStr;

use serde_json::Value;

use crate::{
    data_types::identifiers::{
        cred_def_id::CredentialDefinitionId, issuer_id::IssuerId,
        rev_reg_def_id::RevocationRegistryDefinitionId,
    },
    utils::validation::Validatable,
};

pub const CL_ACCUM: &str = "CL_ACCUM";

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum RegistryType {
    CL_ACCUM,
}

impl FromStr for RegistryType {
    type Err = crate::ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CL_ACCUM => Ok(Self::CL_ACCUM),
            _ => Err(crate::ConversionError::from_msg("Invalid registry type")),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationRegistryDefinitionValue {
    pub max_cred_num: u32,
    pub public_keys: Value,
    pub tails_hash: String,
    pub tails_location: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationRegistryDefinition {
    pub id: RevocationRegistryDefinitionId,
    pub issuer_id: IssuerId,
    pub revoc_def_type: RegistryType,
    pub tag: String,
    pub cred_def_id: CredentialDefinitionId,
    pub value: RevocationRegistryDefinitionValue,
}

impl Validatable for RevocationRegistryDefinition {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        self.cred_def_id.validate()?;
        self.issuer_id.validate()?;

        if self.value.max_cred_num == 0 {
            return Err(crate::invalid!(
                "Revocation registry must accommodate at least one credential"
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevocationRegistryDefinitionPrivate {
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_type_parses() {
        assert_eq!(
            RegistryType::from_str("CL_ACCUM").unwrap(),
            RegistryType::CL_ACCUM
        );
        assert!(RegistryType::from_str("MERKLE").is_err());
    }

    #[test]
    fn rev_reg_def_zero_capacity_is_invalid() {
        let json = json!({
            "id": "mock:uri:revreg:tag",
            "issuerId": "mock:uri",
            "revocDefType": "CL_ACCUM",
            "tag": "tag",
            "credDefId": "mock:uri:creddef:tag",
            "value": {
                "maxCredNum": 0,
                "publicKeys": {"accumKey": {"z": "1"}},
                "tailsHash": "abc",
                "tailsLocation": "/tmp/tails/abc"
            }
        });
        let def: RevocationRegistryDefinition = serde_json::from_value(json).unwrap();
        assert!(def.validate().is_err());
    }
}
