//! IntKey transaction family payloads and state addressing.
//!
//! An IntKey transaction either sets a named integer to a value or
//! increments it by a value. State for a name lives at a deterministic
//! address under the family's namespace prefix.

use crate::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction family name carried in every transaction header.
pub const FAMILY_NAME: &str = "intkey";

/// Transaction family version carried in every transaction header.
pub const FAMILY_VERSION: &str = "1.0";

/// Length in hex characters of the family namespace prefix.
const NAMESPACE_PREFIX_LEN: usize = 6;

/// Operation applied to a named integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntKeyVerb {
    /// Set the key to the given value. The key must not exist yet.
    Set,
    /// Increment the key by the given value.
    Inc,
}

impl IntKeyVerb {
    /// Wire name of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntKeyVerb::Set => "set",
            IntKeyVerb::Inc => "inc",
        }
    }
}

impl fmt::Display for IntKeyVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of an IntKey transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntKeyPayload {
    #[serde(rename = "Verb")]
    pub verb: IntKeyVerb,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: u64,
}

impl IntKeyPayload {
    pub fn new(verb: IntKeyVerb, name: impl Into<String>, value: u64) -> Self {
        Self {
            verb,
            name: name.into(),
            value,
        }
    }

    /// Encode the payload to the bytes carried by the transaction.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode payload bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// State address touched by this payload.
    pub fn address(&self) -> String {
        intkey_address(&self.name)
    }
}

/// Namespace prefix shared by every IntKey state address.
pub fn namespace_prefix() -> String {
    Hash::from_bytes(FAMILY_NAME.as_bytes()).to_hex()[..NAMESPACE_PREFIX_LEN].to_string()
}

/// State address for a key name: namespace prefix followed by the name hash.
pub fn intkey_address(name: &str) -> String {
    let mut address = namespace_prefix();
    address.push_str(&Hash::from_bytes(name.as_bytes()).to_hex());
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format() {
        let payload = IntKeyPayload::new(IntKeyVerb::Inc, "k1", 1);
        let bytes = payload.encode().unwrap();

        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"Verb":"inc","Name":"k1","Value":1}"#
        );
        assert_eq!(IntKeyPayload::decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_address_layout() {
        let address = intkey_address("k1");

        assert_eq!(address.len(), NAMESPACE_PREFIX_LEN + 64);
        assert!(address.starts_with(&namespace_prefix()));
        assert_ne!(address, intkey_address("k2"));
    }
}
