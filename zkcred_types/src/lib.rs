#[macro_use]
extern crate serde;

#[cfg(test)]
#[macro_use]
extern crate serde_json;

#[macro_use]
mod error;
pub use self::error::{ConversionError, ValidationError};

pub mod utils;

pub mod data_types;
