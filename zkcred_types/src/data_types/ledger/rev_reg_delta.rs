/// A transition between two accumulator states. Deltas chain through
/// `prev_accum`: a delta may only be applied (or merged) onto the state whose
/// accumulator it names as its predecessor.
#[derive(Clone, Deserialize, Debug, Serialize, PartialEq, Eq)]
pub struct RevocationRegistryDelta {
    pub value: RevocationRegistryDeltaValue,
}

#[derive(Clone, Deserialize, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevocationRegistryDeltaValue {
    pub prev_accum: Option<String>,
    pub accum: String,
    #[serde(default)]
    pub issued: Vec<u32>,
    #[serde(default)]
    pub revoked: Vec<u32>,
}

impl RevocationRegistryDelta {
    /// Whether `next` directly extends this delta's chain.
    pub fn precedes(&self, next: &Self) -> bool {
        self.value.precedes(&next.value)
    }
}

impl RevocationRegistryDeltaValue {
    /// Whether `next` directly extends this delta's chain.
    pub fn precedes(&self, next: &Self) -> bool {
        next.prev_accum.as_deref() == Some(self.accum.as_str())
    }
}
