//! Sender/receiver pair selection under per-run constraints.
//!
//! Draws are uniform over the shard's account set and must come from a
//! cryptographically sound generator: corpora are reused for benchmarking
//! across independently-run shard processes, and a weak or seed-correlated
//! source would bias the cross-shard mix.

use crate::config::GeneratorConfig;
use crate::constraints::RunConstraints;
use crate::pool::AccountPool;
use rand::{CryptoRng, Rng};
use shardload_types::{Account, Address, ShardId, TransactionError};

/// A successful intra-shard pick.
#[derive(Debug)]
pub struct IntraShardPick<'a> {
    pub from: &'a Account,
    pub to: &'a Account,
    /// Nonce for the new transaction (the pre-increment cursor value).
    pub nonce: u64,
}

/// A successful cross-shard pick.
#[derive(Debug)]
pub struct CrossShardPick<'a> {
    pub origin: ShardId,
    pub from: &'a Account,
    pub destination: ShardId,
    pub to: &'a Account,
    pub nonce: u64,
}

/// Pick a `(from, to)` pair within one shard's account set.
///
/// `from` and `to` are drawn independently and uniformly; a self-pair rejects
/// the whole draw, not one side. The checks run in order: duplicate pair,
/// rate cap, balance. On success the constraint state records the target,
/// bumps the sender's sent count and advances its nonce cursor.
///
/// A set with fewer than 2 accounts cannot yield a pair; that is a
/// configuration precondition surfaced as [`SelectionError::NotEnoughAccounts`]
/// so the enclosing attempt bound can terminate.
pub fn pick_intra_shard<'a, R: Rng + CryptoRng + ?Sized>(
    accounts: &'a [Account],
    constraints: &mut RunConstraints,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> Result<IntraShardPick<'a>, SelectionError> {
    if accounts.len() < 2 {
        return Err(SelectionError::NotEnoughAccounts(accounts.len()));
    }

    let (from_idx, to_idx) = loop {
        let from_idx = rng.gen_range(0..accounts.len());
        let to_idx = rng.gen_range(0..accounts.len());
        if from_idx != to_idx {
            break (from_idx, to_idx);
        }
    };

    let from = &accounts[from_idx];
    let to = &accounts[to_idx];

    check_pair(from, to.address, constraints, cfg)?;

    let nonce = constraints.record_success(from.address, to.address, from.nonce);
    Ok(IntraShardPick { from, to, nonce })
}

/// Pick a sender on `origin` and a receiver on a uniformly drawn peer shard.
///
/// The sender is subject to the same rate and balance checks as an
/// intra-shard pick; the duplicate-pair check runs against the sender's prior
/// targets regardless of which shard those targets live on.
pub fn pick_cross_shard<'a, R: Rng + CryptoRng + ?Sized>(
    origin: ShardId,
    pool: &'a AccountPool,
    constraints: &mut RunConstraints,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> Result<CrossShardPick<'a>, SelectionError> {
    let origin_accounts = pool
        .accounts_for(origin)
        .filter(|a| !a.is_empty())
        .ok_or(SelectionError::EmptyShard(origin))?;

    let from = &origin_accounts[rng.gen_range(0..origin_accounts.len())];

    if constraints.sent_count(from.address) >= cfg.max_txs_per_account {
        return Err(SelectionError::RateExceeded { from: from.address });
    }
    if from.balance < cfg.min_balance {
        return Err(SelectionError::InsufficientBalance { from: from.address });
    }

    let peers: Vec<ShardId> = pool
        .shard_ids()
        .into_iter()
        .filter(|&id| id != origin)
        .collect();
    if peers.is_empty() {
        return Err(SelectionError::NoPeerShard(origin));
    }
    let destination = peers[rng.gen_range(0..peers.len())];

    let destination_accounts = pool
        .accounts_for(destination)
        .filter(|a| !a.is_empty())
        .ok_or(SelectionError::EmptyShard(destination))?;
    let to = &destination_accounts[rng.gen_range(0..destination_accounts.len())];

    if constraints.is_prior_target(from.address, to.address) {
        return Err(SelectionError::DuplicatePair {
            from: from.address,
            to: to.address,
        });
    }

    let nonce = constraints.record_success(from.address, to.address, from.nonce);
    Ok(CrossShardPick {
        origin,
        from,
        destination,
        to,
        nonce,
    })
}

fn check_pair(
    from: &Account,
    to: Address,
    constraints: &RunConstraints,
    cfg: &GeneratorConfig,
) -> Result<(), SelectionError> {
    if constraints.is_prior_target(from.address, to) {
        return Err(SelectionError::DuplicatePair {
            from: from.address,
            to,
        });
    }
    if constraints.sent_count(from.address) >= cfg.max_txs_per_account {
        return Err(SelectionError::RateExceeded { from: from.address });
    }
    if from.balance < cfg.min_balance {
        return Err(SelectionError::InsufficientBalance { from: from.address });
    }
    Ok(())
}

/// Constraint violations recoverable by redrawing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The `(from, to)` pair was already used by this sender in this run.
    #[error("Duplicate pair: {from} -> {to}")]
    DuplicatePair { from: Address, to: Address },

    /// The sender reached the per-batch rate cap.
    #[error("Rate cap exceeded for sender {from}")]
    RateExceeded { from: Address },

    /// The sender's balance is below the minimum transferable unit.
    #[error("Insufficient balance for sender {from}")]
    InsufficientBalance { from: Address },

    /// The shard has no accounts to draw from.
    #[error("{0} has no accounts")]
    EmptyShard(ShardId),

    /// No shard other than the origin exists to receive a cross-shard transfer.
    #[error("No peer shard available for {0}")]
    NoPeerShard(ShardId),

    /// The account set is too small to form a pair.
    #[error("Account set of size {0} cannot form a pair")]
    NotEnoughAccounts(usize),

    /// A constructed transaction was dropped; the slot redraws from scratch.
    #[error("Attempt dropped: {0}")]
    DroppedAttempt(#[from] TransactionError),
}
