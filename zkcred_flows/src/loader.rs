//! Boundary normalization for entities that may arrive either materialized or
//! in a serialized form (JSON value, string or raw bytes).

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::error::{ZkCredError, ZkCredResult};

/// An entity of type `T`, or one of its serialized forms. Flow operations
/// accept `impl Into<Loadable<T>>` and call [`Loadable::load`] exactly once
/// at the boundary; everything downstream works on materialized entities.
#[derive(Debug, Clone)]
pub enum Loadable<T> {
    Entity(T),
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl<T> Loadable<T>
where
    T: DeserializeOwned,
{
    pub fn load(self) -> ZkCredResult<T> {
        let parsed = match self {
            Self::Entity(entity) => return Ok(entity),
            Self::Json(value) => serde_json::from_value(value),
            Self::Text(text) => serde_json::from_str(&text),
            Self::Bytes(bytes) => serde_json::from_slice(&bytes),
        };

        parsed.map_err(|err| {
            ZkCredError::Format(format!(
                "cannot parse {}: {err}",
                std::any::type_name::<T>()
            ))
        })
    }
}

impl<T> From<Value> for Loadable<T> {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl<T> From<String> for Loadable<T> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T> From<&str> for Loadable<T> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl<T> From<Vec<u8>> for Loadable<T> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<T> From<&[u8]> for Loadable<T> {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

macro_rules! impl_loadable_entity {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Loadable<$t> {
                fn from(entity: $t) -> Self {
                    Self::Entity(entity)
                }
            }

            impl From<&$t> for Loadable<$t> {
                fn from(entity: &$t) -> Self {
                    Self::Entity(entity.clone())
                }
            }
        )+
    };
}

impl_loadable_entity!(
    zkcred_types::data_types::ledger::schema::Schema,
    zkcred_types::data_types::ledger::cred_def::CredentialDefinition,
    zkcred_types::data_types::ledger::cred_def::CredentialDefinitionPrivate,
    zkcred_types::data_types::ledger::cred_def::KeyCorrectnessProof,
    zkcred_types::data_types::ledger::rev_reg_def::RevocationRegistryDefinition,
    zkcred_types::data_types::ledger::rev_reg_def::RevocationRegistryDefinitionPrivate,
    zkcred_types::data_types::ledger::rev_reg::RevocationRegistry,
    zkcred_types::data_types::ledger::rev_reg_delta::RevocationRegistryDelta,
    zkcred_types::data_types::messages::cred_offer::CredentialOffer,
    zkcred_types::data_types::messages::cred_request::CredentialRequest,
    zkcred_types::data_types::messages::cred_request::CredentialRequestMetadata,
    zkcred_types::data_types::messages::credential::Credential,
    zkcred_types::data_types::messages::master_secret::MasterSecret,
    zkcred_types::data_types::messages::pres_request::PresentationRequest,
    zkcred_types::data_types::messages::presentation::Presentation,
    zkcred_types::data_types::messages::rev_state::CredentialRevocationState,
);

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zkcred_types::data_types::ledger::schema::Schema;

    use super::*;

    fn schema_json() -> Value {
        json!({
            "id": "mock:uri:schema:gvt:1.0",
            "name": "gvt",
            "version": "1.0",
            "attrNames": ["name", "age"],
            "issuerId": "mock:uri"
        })
    }

    #[test]
    fn loads_materialized_entity() {
        let schema: Schema = serde_json::from_value(schema_json()).unwrap();
        let loaded = Loadable::from(schema.clone()).load().unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn loads_from_json_value() {
        let loaded: Schema = Loadable::from(schema_json()).load().unwrap();
        assert_eq!(loaded.name, "gvt");
    }

    #[test]
    fn loads_from_text_and_bytes() {
        let text = schema_json().to_string();
        let from_text: Schema = Loadable::from(text.as_str()).load().unwrap();
        let from_bytes: Schema = Loadable::from(text.clone().into_bytes()).load().unwrap();
        assert_eq!(from_text, from_bytes);
    }

    #[test]
    fn malformed_input_is_a_format_error() {
        let result: ZkCredResult<Schema> = Loadable::from("{\"name\":").load();
        assert!(matches!(result, Err(ZkCredError::Format(_))));

        let result: ZkCredResult<Schema> = Loadable::from(json!({"name": "gvt"})).load();
        assert!(matches!(result, Err(ZkCredError::Format(_))));
    }
}
