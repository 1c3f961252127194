use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;

pub static URI_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\+\-\.]+:.+$").unwrap());

pub static LEGACY_DID_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{21,22}$").unwrap());

pub static LEGACY_SCHEMA_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{21,22}:2:.+:[0-9.]+$").unwrap());

pub static LEGACY_CRED_DEF_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{21,22}:3:CL:(([1-9][0-9]*)|([1-9A-HJ-NP-Za-km-z]{21,22}:2:.+:[0-9.]+)):(.+)?$").unwrap()
});

pub fn is_uri_identifier(id: &str) -> bool {
    URI_IDENTIFIER.captures(id).is_some()
}

/// Trait for data types which need validation after deserialization.
pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
