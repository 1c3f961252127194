use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::nonce::Nonce;
use crate::{error::ValidationError, utils::validation::Validatable};

/// Verifier's disclosure/predicate request. Referents key the requested
/// attributes and predicates; the holder's presentation answers per referent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PresentationRequest {
    pub nonce: Nonce,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub requested_attributes: HashMap<String, AttributeInfo>,
    #[serde(default)]
    pub requested_predicates: HashMap<String, PredicateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

#[derive(Clone, Default, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct NonRevokedInterval {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl NonRevokedInterval {
    #[must_use]
    pub const fn new(from: Option<u64>, to: Option<u64>) -> Self {
        Self { from, to }
    }

    // Returns the most stringent interval,
    // i.e. the latest from and the earliest to
    pub fn compare_and_set(&mut self, to_compare: &Self) {
        match (self.from, to_compare.from) {
            (Some(old_from), Some(new_from)) => {
                if old_from.lt(&new_from) {
                    self.from = to_compare.from;
                }
            }
            (None, Some(_)) => self.from = to_compare.from,
            _ => (),
        }
        match (self.to, to_compare.to) {
            (Some(old_to), Some(new_to)) => {
                if new_to.lt(&old_to) {
                    self.to = to_compare.to;
                }
            }
            (None, Some(_)) => self.to = to_compare.to,
            _ => (),
        }
    }

    pub fn is_valid(&self, timestamp: u64) -> Result<(), ValidationError> {
        if timestamp.lt(&self.from.unwrap_or(0)) || timestamp.gt(&self.to.unwrap_or(u64::MAX)) {
            Err(invalid!("Invalid timestamp"))
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct AttributeInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

pub type PredicateValue = i32;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct PredicateInfo {
    pub name: String,
    pub p_type: PredicateTypes,
    pub p_value: PredicateValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_revoked: Option<NonRevokedInterval>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum PredicateTypes {
    #[serde(rename = ">=")]
    GE,
    #[serde(rename = "<=")]
    LE,
    #[serde(rename = ">")]
    GT,
    #[serde(rename = "<")]
    LT,
}

impl PredicateTypes {
    pub fn is_satisfied(self, value: i64, bound: PredicateValue) -> bool {
        let bound = i64::from(bound);
        match self {
            Self::GE => value >= bound,
            Self::GT => value > bound,
            Self::LE => value <= bound,
            Self::LT => value < bound,
        }
    }
}

impl fmt::Display for PredicateTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::GE => write!(f, "GE"),
            Self::GT => write!(f, "GT"),
            Self::LE => write!(f, "LE"),
            Self::LT => write!(f, "LT"),
        }
    }
}

impl Validatable for PresentationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.requested_attributes.is_empty() && self.requested_predicates.is_empty() {
            return Err(invalid!("Presentation request validation failed: both `requested_attributes` and `requested_predicates` are empty"));
        }

        for requested_attribute in self.requested_attributes.values() {
            let has_name = !requested_attribute
                .name
                .as_ref()
                .map_or(true, String::is_empty);
            let has_names = !requested_attribute
                .names
                .as_ref()
                .map_or(true, Vec::is_empty);
            if !has_name && !has_names {
                return Err(invalid!(
                    "Presentation request validation failed: there is an empty requested attribute: {:?}",
                    requested_attribute
                ));
            }

            if has_name && has_names {
                return Err(invalid!("Presentation request validation failed: there is a requested attribute with both name and names: {:?}", requested_attribute));
            }
        }

        for requested_predicate in self.requested_predicates.values() {
            if requested_predicate.name.is_empty() {
                return Err(invalid!(
                    "Presentation request validation failed: there is an empty requested predicate: {:?}",
                    requested_predicate
                ));
            }
        }

        Ok(())
    }
}
