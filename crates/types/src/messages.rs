//! Generation requests and the batch envelopes shipped to shard endpoints.

use crate::identifiers::ShardId;
use serde::{Deserialize, Serialize};

/// Inbound request to fabricate accounts for a shard.
///
/// Ephemeral: buffered once, resolved once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateAccountsRequest {
    /// How many accounts to create. Zero is valid and yields an empty batch.
    #[serde(rename = "number")]
    pub count: usize,
    pub shard_id: ShardId,
}

/// Inbound request to fabricate transactions for a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateTransactionsRequest {
    /// Target number of transactions to produce.
    #[serde(rename = "number")]
    pub count: usize,
    pub shard_id: ShardId,
    /// Percentage (0..=100) of picks that target another shard.
    #[serde(rename = "crossShardRatio")]
    pub cross_shard_ratio: u32,
}

/// Wire envelope for a batch of freshly generated accounts.
///
/// `content` entries are the per-entity serialized payloads, opaque to this
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBatch {
    pub content: Vec<Vec<u8>>,
    #[serde(rename = "number")]
    pub count: usize,
    pub shard_id: ShardId,
}

/// Wire envelope for a batch of generated transactions.
///
/// `sequence_id` is a process-wide monotonic counter, bumped once per batch
/// sent, never reused and not persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBatch {
    pub timestamp: i64,
    #[serde(rename = "sequenceID")]
    pub sequence_id: u64,
    pub transactions: Vec<Vec<u8>>,
    #[serde(rename = "crossShardTransactions")]
    pub cross_shard_transactions: Vec<Vec<u8>>,
}
