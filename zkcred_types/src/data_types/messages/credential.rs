use std::collections::HashMap;

use serde_json::Value;

use crate::{
    data_types::identifiers::{
        cred_def_id::CredentialDefinitionId, rev_reg_def_id::RevocationRegistryDefinitionId,
        schema_id::SchemaId,
    },
    utils::validation::Validatable,
};

/// Issued credential as held by the holder. `signature` and related payloads
/// are opaque proof-engine objects; the identifier fields and the optional
/// revocation binding round-trip losslessly through serialization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Credential {
    pub schema_id: SchemaId,
    pub cred_def_id: CredentialDefinitionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_reg_id: Option<RevocationRegistryDefinitionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev_reg_index: Option<u32>,
    pub values: CredentialValues,
    pub signature: Value,
    pub signature_correctness_proof: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness: Option<Value>,
}

impl Validatable for Credential {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        self.values.validate()?;
        self.schema_id.validate()?;
        self.cred_def_id.validate()?;
        self.rev_reg_id
            .as_ref()
            .map(Validatable::validate)
            .transpose()?;

        if self.rev_reg_id.is_some() && self.rev_reg_index.is_none() {
            return Err(crate::invalid!(
                "Credential validation failed: revocable credential without a registry index"
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct CredentialValues(pub HashMap<String, AttributeValue>);

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AttributeValue {
    pub raw: String,
    /// Filled by the proof engine during issuance when the caller supplies no
    /// encoding of their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded: Option<String>,
}

impl CredentialValues {
    /// Pairs raw attribute values with caller-supplied encodings. Keys of the
    /// encoded map must be a subset of the raw map's keys.
    pub fn new(
        raw: HashMap<String, String>,
        encoded: Option<HashMap<String, String>>,
    ) -> Result<Self, crate::error::ValidationError> {
        if raw.is_empty() {
            return Err(crate::invalid!("Empty credential values have been passed"));
        }

        if let Some(name) = raw
            .iter()
            .find_map(|(name, value)| value.is_empty().then_some(name))
        {
            return Err(crate::invalid!(
                "Attribute '{}' has an empty raw value",
                name
            ));
        }

        let mut encoded = encoded.unwrap_or_default();
        if let Some(orphan) = encoded.keys().find(|k| !raw.contains_key(*k)) {
            return Err(crate::invalid!(
                "Encoded value supplied for unknown attribute: {}",
                orphan
            ));
        }

        Ok(Self(
            raw.into_iter()
                .map(|(name, raw)| {
                    let encoded = encoded.remove(&name);
                    (name, AttributeValue { raw, encoded })
                })
                .collect(),
        ))
    }
}

impl Validatable for CredentialValues {
    fn validate(&self) -> Result<(), crate::error::ValidationError> {
        if self.0.is_empty() {
            return Err(crate::invalid!(
                "CredentialValues validation failed: empty list has been passed"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_values() -> HashMap<String, String> {
        HashMap::from([
            ("name".to_owned(), "Alice".to_owned()),
            ("age".to_owned(), "30".to_owned()),
        ])
    }

    #[test]
    fn credential_values_reject_empty() {
        assert!(CredentialValues::new(HashMap::new(), None).is_err());
    }

    #[test]
    fn credential_values_reject_empty_raw_value() {
        let mut raw = raw_values();
        raw.insert("name".to_owned(), String::new());
        assert!(CredentialValues::new(raw, None).is_err());
    }

    #[test]
    fn credential_values_reject_orphan_encoding() {
        let encoded = HashMap::from([("height".to_owned(), "175".to_owned())]);
        assert!(CredentialValues::new(raw_values(), Some(encoded)).is_err());
    }

    #[test]
    fn credential_values_pair_encodings() {
        let encoded = HashMap::from([("age".to_owned(), "30".to_owned())]);
        let values = CredentialValues::new(raw_values(), Some(encoded)).unwrap();
        assert_eq!(values.0["age"].encoded.as_deref(), Some("30"));
        assert!(values.0["name"].encoded.is_none());
    }

    #[test]
    fn revocable_credential_requires_index() {
        let cred = Credential {
            schema_id: SchemaId::new_unchecked("mock:uri:schema:gvt:1.0"),
            cred_def_id: CredentialDefinitionId::new_unchecked("mock:uri:creddef:tag"),
            rev_reg_id: Some(RevocationRegistryDefinitionId::new_unchecked(
                "mock:uri:revreg:tag",
            )),
            rev_reg_index: None,
            values: CredentialValues::new(raw_values(), None).unwrap(),
            signature: json!({"q": "sig"}),
            signature_correctness_proof: json!({"se": "proof"}),
            witness: None,
        };
        assert!(cred.validate().is_err());
    }
}
