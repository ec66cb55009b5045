//! Transaction construction and content hashing.

use crate::account::{Address, Receipt};
use crate::hash::Hash;
use crate::identifiers::ShardId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix nanoseconds.
pub fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

/// An intra-shard transfer.
///
/// Immutable once hashed: the content digest covers `{from, to, value, nonce}`
/// in that order. Timestamp and the hash itself stay outside the digest input;
/// the timestamp records when the record was fabricated, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    pub value: u64,
    pub nonce: u64,
    pub hash: Hash,
    pub timestamp: i64,
}

impl Transaction {
    /// Build a transaction and compute its content hash.
    ///
    /// A zero digest means the serialization path upstream is broken and the
    /// attempt must be dropped.
    pub fn new(from: Address, to: Address, value: u64, nonce: u64) -> Result<Self, TransactionError> {
        let hash = digest_transfer(&from, &to, value, nonce, None);
        if hash.is_zero() {
            return Err(TransactionError::HashComputationFailed);
        }
        Ok(Self {
            from,
            to,
            value,
            nonce,
            hash,
            timestamp: unix_nanos(),
        })
    }
}

/// A transfer whose sender and receiver live on different shards.
///
/// Same shape as [`Transaction`] plus the shard endpoints, which are part of
/// the digest input. The receipt is a placeholder filled in by the receiving
/// shard during settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossShardTransaction {
    pub origin_shard: ShardId,
    pub destination_shard: ShardId,
    pub from: Address,
    pub to: Address,
    pub value: u64,
    pub nonce: u64,
    pub receipt: Receipt,
    pub hash: Hash,
    pub timestamp: i64,
}

impl CrossShardTransaction {
    /// Build a cross-shard transaction and compute its content hash.
    pub fn new(
        origin_shard: ShardId,
        destination_shard: ShardId,
        from: Address,
        to: Address,
        value: u64,
        nonce: u64,
    ) -> Result<Self, TransactionError> {
        let hash = digest_transfer(
            &from,
            &to,
            value,
            nonce,
            Some((origin_shard, destination_shard)),
        );
        if hash.is_zero() {
            return Err(TransactionError::HashComputationFailed);
        }
        Ok(Self {
            origin_shard,
            destination_shard,
            from,
            to,
            value,
            nonce,
            receipt: Receipt::default(),
            hash,
            timestamp: unix_nanos(),
        })
    }
}

/// Canonical content digest for a transfer.
///
/// Field order is fixed: (origin, destination when cross-shard), from, to,
/// value, nonce. Integers are little-endian fixed width.
fn digest_transfer(
    from: &Address,
    to: &Address,
    value: u64,
    nonce: u64,
    shards: Option<(ShardId, ShardId)>,
) -> Hash {
    let value_le = value.to_le_bytes();
    let nonce_le = nonce.to_le_bytes();
    match shards {
        Some((origin, destination)) => {
            let origin_le = origin.0.to_le_bytes();
            let destination_le = destination.0.to_le_bytes();
            Hash::from_parts(&[
                &origin_le,
                &destination_le,
                from.as_bytes(),
                to.as_bytes(),
                &value_le,
                &nonce_le,
            ])
        }
        None => Hash::from_parts(&[from.as_bytes(), to.as_bytes(), &value_le, &nonce_le]),
    }
}

/// Errors from transaction construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The content digest degenerated to the all-zero case.
    #[error("Transaction hash computation failed")]
    HashComputationFailed,
}
