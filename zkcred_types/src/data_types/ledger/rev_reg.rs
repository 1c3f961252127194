use serde_json::Value;

/// Current accumulator state of a revocation registry. The payload is an
/// opaque proof-engine object; revoke/update operations replace it wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RevocationRegistry {
    pub value: Value,
}
