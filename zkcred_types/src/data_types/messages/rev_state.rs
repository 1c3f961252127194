use serde_json::Value;

/// Holder-side witness proving non-revocation against a specific accumulator
/// state. Valid only for the registry state captured at `timestamp`; must be
/// recomputed as the registry evolves.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialRevocationState {
    pub rev_reg: Value,
    pub witness: Value,
    pub timestamp: u64,
}
