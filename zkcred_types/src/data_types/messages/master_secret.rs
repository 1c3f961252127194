use serde_json::Value;

/// Holder's long-lived secret binding credentials to one identity. Opaque to
/// this layer; the proof engine creates it and folds it into blinded requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MasterSecret {
    pub value: Value,
}
