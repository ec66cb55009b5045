//! Constrained transaction generation for the shardload testbed.
//!
//! The engine fabricates accounts per shard and produces batches of
//! syntactically well-formed transfers against them, honoring per-run
//! uniqueness and fairness constraints: no self-transfers, no repeated
//! `(from, to)` pair for a sender, a per-sender rate cap, balance
//! sufficiency, and a strictly increasing nonce per sender.
//!
//! Generation is not execution: balances are never decremented and pool
//! nonces are not advanced; the per-run nonce cursor lives in
//! [`RunConstraints`] and is discarded when the batch completes.

pub mod config;
pub mod constraints;
pub mod pool;
pub mod selection;
pub mod workload;

pub use config::GeneratorConfig;
pub use constraints::RunConstraints;
pub use pool::{AccountPool, PoolError};
pub use selection::{
    pick_cross_shard, pick_intra_shard, CrossShardPick, IntraShardPick, SelectionError,
};
pub use workload::{generate_transactions, GenerateError, GeneratedBatch};
