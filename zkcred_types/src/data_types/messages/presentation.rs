use serde_json::Value;

/// Finished zero-knowledge proof object, produced once and immutable. The
/// payload layout belongs to the proof engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Presentation {
    pub value: Value,
}
