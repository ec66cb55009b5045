//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shard identifier.
///
/// Shards are addressed by an integer ID; the network endpoint for a shard is
/// resolved from the static address table in the server configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ShardId(pub u64);

impl ShardId {
    /// The key this shard is listed under in the static address table.
    pub fn table_key(&self) -> String {
        format!("Shard_{}", self.0)
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shard({})", self.0)
    }
}
