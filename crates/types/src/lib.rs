//! Entity and wire types for the shardload workload generator.
//!
//! Everything that crosses a process boundary lives here: accounts,
//! transactions (intra- and cross-shard), the generation request shapes and
//! the batch envelopes forwarded to shard endpoints.

pub mod account;
pub mod hash;
pub mod identifiers;
pub mod messages;
pub mod transaction;

pub use account::{Account, AccountState, Address, CodecError, Receipt};
pub use hash::{Hash, HexError};
pub use identifiers::ShardId;
pub use messages::{
    AccountBatch, GenerateAccountsRequest, GenerateTransactionsRequest, TransactionBatch,
};
pub use transaction::{unix_nanos, CrossShardTransaction, Transaction, TransactionError};
