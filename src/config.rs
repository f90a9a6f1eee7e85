//! Configuration for loading and decoding images.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::formats::e32::DecodeOptions;
use crate::io::IOLimits;

/// Master configuration: file limits plus decoder switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E32Config {
    /// Limits applied when reading image files.
    pub io: IOLimits,
    /// Decoder validation switches.
    pub decode: DecodeOptions,
}

impl E32Config {
    /// Parse a JSON document; missing sections and keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
