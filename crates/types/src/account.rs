//! Account entities and the `AccountState` capability seam.

use crate::hash::Hash;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 20-byte account address, derived from the Blake3 digest of the account's
/// Ed25519 public key.
///
/// Rendered and serialized as a `0x`-prefixed hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Size of an address in bytes.
    pub const BYTES: usize = 20;

    /// Derive the address for an Ed25519 public key.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let digest = Hash::from_bytes(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_bytes()[..20]);
        Self(bytes)
    }

    /// Parse from a `0x`-prefixed hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CodecError> {
        let stripped = hex.strip_prefix("0x").unwrap_or(hex);
        if stripped.len() != 40 {
            return Err(CodecError::BadAddress(hex.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(stripped, &mut bytes)
            .map_err(|_| CodecError::BadAddress(hex.to_string()))?;
        Ok(Self(bytes))
    }

    /// Render as a `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Address::from_hex(&hex).map_err(D::Error::custom)
    }
}

/// A generated account as it appears on the wire.
///
/// `balance` is illustrative: generation never decrements it (spending is not
/// simulated). `nonce` is the pool's stored cursor; the per-run nonce cursor
/// in the constraint state is seeded from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    #[serde(with = "pubkey_hex")]
    pub public_key: [u8; 32],
    pub balance: u64,
    pub nonce: u64,
}

impl Account {
    /// Build an account from a public key with the given starting balance.
    pub fn new(public_key: [u8; 32], balance: u64) -> Self {
        Self {
            address: Address::from_public_key(&public_key),
            public_key,
            balance,
            nonce: 0,
        }
    }
}

impl AccountState for Account {
    fn marshal(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Json)
    }

    fn unmarshal(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Json)
    }

    fn address(&self) -> Address {
        self.address
    }

    fn balance(&self) -> u64 {
        self.balance
    }
}

/// Capability seam over account representations.
///
/// There is one shipped profile (JSON entities with string addresses); a
/// deployment with a binary field-element layout would provide a second impl
/// rather than branching on shape at runtime.
pub trait AccountState: Sized {
    /// Serialize the account into its wire payload.
    fn marshal(&self) -> Result<Vec<u8>, CodecError>;

    /// Deserialize an account from its wire payload.
    fn unmarshal(bytes: &[u8]) -> Result<Self, CodecError>;

    /// The account's address.
    fn address(&self) -> Address;

    /// The account's current balance.
    fn balance(&self) -> u64;
}

/// Settlement receipt placeholder on cross-shard transactions.
///
/// Populated by the receiving shard, never by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Receipt {
    pub status: bool,
}

/// Errors from marshalling or unmarshalling entities.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed address: {0}")]
    BadAddress(String),
}

mod pubkey_hex {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&hex_str, &mut bytes).map_err(D::Error::custom)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account(seed: u8) -> Account {
        Account::new([seed; 32], 10_000_000)
    }

    #[test]
    fn test_address_derivation_deterministic() {
        let a = Address::from_public_key(&[7u8; 32]);
        let b = Address::from_public_key(&[7u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, Address::from_public_key(&[8u8; 32]));
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::from_public_key(&[3u8; 32]);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_malformed() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("zz".repeat(20).as_str()).is_err());
    }

    #[test]
    fn test_account_marshal_roundtrip() {
        let account = test_account(9);
        let bytes = account.marshal().unwrap();
        let back = Account::unmarshal(&bytes).unwrap();
        assert_eq!(account, back);
    }

    #[test]
    fn test_unmarshal_rejects_garbage() {
        assert!(Account::unmarshal(b"not json").is_err());
    }
}
