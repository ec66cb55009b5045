//! The batch generation loop.

use crate::config::GeneratorConfig;
use crate::constraints::RunConstraints;
use crate::pool::AccountPool;
use crate::selection::{pick_cross_shard, pick_intra_shard, SelectionError};
use rand::{CryptoRng, Rng};
use shardload_types::{
    CrossShardTransaction, GenerateTransactionsRequest, ShardId, Transaction,
};
use tracing::{debug, trace};

/// The transactions produced by one generation run.
#[derive(Debug, Default)]
pub struct GeneratedBatch {
    pub transactions: Vec<Transaction>,
    pub cross_shard_transactions: Vec<CrossShardTransaction>,
}

impl GeneratedBatch {
    /// Total transactions of both kinds.
    pub fn len(&self) -> usize {
        self.transactions.len() + self.cross_shard_transactions.len()
    }

    /// Whether the batch holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Produce transactions against the pool until the requested count is reached.
///
/// Each slot draws a percentage in `0..100`; draws below the request's
/// `cross_shard_ratio` target another shard. Constraint violations retry with
/// a fresh draw, bounded by `cfg.max_pick_attempts` per slot so an undersized
/// pool surfaces [`GenerateError::PoolExhausted`] instead of spinning. A
/// degenerate content hash drops the attempt and redraws.
///
/// Constraint state is seeded from the origin shard's current nonces and
/// discarded when this call returns; pool nonces are left untouched.
pub fn generate_transactions<R: Rng + CryptoRng + ?Sized>(
    req: &GenerateTransactionsRequest,
    pool: &AccountPool,
    cfg: &GeneratorConfig,
    rng: &mut R,
) -> Result<GeneratedBatch, GenerateError> {
    let origin = req.shard_id;
    let origin_accounts = pool.accounts_for(origin).unwrap_or(&[]);
    let mut constraints = RunConstraints::seeded_from(origin_accounts);
    let mut batch = GeneratedBatch::default();

    while batch.len() < req.count {
        let produced = batch.len();
        let mut last_error = None;

        for _ in 0..cfg.max_pick_attempts {
            let cross = rng.gen_range(0..100u32) < req.cross_shard_ratio;
            let outcome = if cross {
                try_cross_shard(origin, pool, &mut constraints, cfg, rng, &mut batch)
            } else {
                try_intra_shard(origin_accounts, &mut constraints, cfg, rng, &mut batch)
            };
            match outcome {
                Ok(()) => break,
                Err(err) => {
                    trace!(%err, "Pick rejected, redrawing");
                    last_error = Some(err);
                }
            }
        }

        if batch.len() == produced {
            return Err(GenerateError::PoolExhausted {
                requested: req.count,
                produced,
                attempts: cfg.max_pick_attempts,
                last: last_error.unwrap_or(SelectionError::EmptyShard(origin)),
            });
        }
    }

    debug!(
        %origin,
        intra = batch.transactions.len(),
        cross = batch.cross_shard_transactions.len(),
        "Generated transaction batch"
    );
    Ok(batch)
}

fn try_intra_shard<R: Rng + CryptoRng + ?Sized>(
    accounts: &[shardload_types::Account],
    constraints: &mut RunConstraints,
    cfg: &GeneratorConfig,
    rng: &mut R,
    batch: &mut GeneratedBatch,
) -> Result<(), SelectionError> {
    let pick = pick_intra_shard(accounts, constraints, cfg, rng)?;
    match Transaction::new(
        pick.from.address,
        pick.to.address,
        cfg.transfer_value,
        pick.nonce,
    ) {
        Ok(tx) => {
            batch.transactions.push(tx);
            Ok(())
        }
        // Degenerate hash: drop the attempt, let the caller redraw.
        Err(err) => Err(SelectionError::DroppedAttempt(err)),
    }
}

fn try_cross_shard<R: Rng + CryptoRng + ?Sized>(
    origin: ShardId,
    pool: &AccountPool,
    constraints: &mut RunConstraints,
    cfg: &GeneratorConfig,
    rng: &mut R,
    batch: &mut GeneratedBatch,
) -> Result<(), SelectionError> {
    let pick = pick_cross_shard(origin, pool, constraints, cfg, rng)?;
    match CrossShardTransaction::new(
        pick.origin,
        pick.destination,
        pick.from.address,
        pick.to.address,
        cfg.transfer_value,
        pick.nonce,
    ) {
        Ok(tx) => {
            batch.cross_shard_transactions.push(tx);
            Ok(())
        }
        Err(err) => Err(SelectionError::DroppedAttempt(err)),
    }
}

/// Errors that end a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// No legal pick was found within the attempt bound.
    #[error(
        "Pool exhausted after {attempts} attempts: produced {produced}/{requested} ({last})"
    )]
    PoolExhausted {
        requested: usize,
        produced: usize,
        attempts: u32,
        #[source]
        last: SelectionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shardload_types::Address;
    use std::collections::HashSet;

    fn pool_with(shards: &[(u64, usize)]) -> AccountPool {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for &(id, count) in shards {
            pool.create_accounts(ShardId(id), count, &mut rng).unwrap();
        }
        pool
    }

    fn request(count: usize, shard: u64, ratio: u32) -> GenerateTransactionsRequest {
        GenerateTransactionsRequest {
            count,
            shard_id: ShardId(shard),
            cross_shard_ratio: ratio,
        }
    }

    #[test]
    fn test_exact_count_with_mixed_ratio() {
        // Three shards with three accounts each, ten transactions at 25%
        // cross-shard: exactly ten produced, split by the draws, with zero
        // duplicate-pair violations.
        let pool = pool_with(&[(0, 3), (1, 3), (2, 3)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = generate_transactions(&request(10, 0, 25), &pool, &cfg, &mut rng).unwrap();
        assert_eq!(batch.len(), 10);

        let mut pairs: HashSet<(Address, Address)> = HashSet::new();
        for tx in &batch.transactions {
            assert_ne!(tx.from, tx.to);
            assert!(pairs.insert((tx.from, tx.to)), "duplicate pair in batch");
        }
        for tx in &batch.cross_shard_transactions {
            assert_ne!(tx.from, tx.to);
            assert_ne!(tx.origin_shard, tx.destination_shard);
            assert!(pairs.insert((tx.from, tx.to)), "duplicate pair in batch");
        }
    }

    #[test]
    fn test_all_intra_when_ratio_zero() {
        let pool = pool_with(&[(0, 5), (1, 5)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = generate_transactions(&request(8, 0, 0), &pool, &cfg, &mut rng).unwrap();
        assert_eq!(batch.transactions.len(), 8);
        assert!(batch.cross_shard_transactions.is_empty());
    }

    #[test]
    fn test_all_cross_when_ratio_full() {
        let pool = pool_with(&[(0, 5), (1, 5), (2, 5)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = generate_transactions(&request(8, 0, 100), &pool, &cfg, &mut rng).unwrap();
        assert!(batch.transactions.is_empty());
        assert_eq!(batch.cross_shard_transactions.len(), 8);
        for tx in &batch.cross_shard_transactions {
            assert_eq!(tx.origin_shard, ShardId(0));
            assert_ne!(tx.destination_shard, ShardId(0));
        }
    }

    #[test]
    fn test_rate_cap_holds_across_batch() {
        let pool = pool_with(&[(0, 4), (1, 4)]);
        let cfg = GeneratorConfig::with_max_txs_per_account(2);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // 4 senders with a cap of 2 leave room for at most 8 transactions.
        let batch = generate_transactions(&request(6, 0, 50), &pool, &cfg, &mut rng).unwrap();
        let mut per_sender: std::collections::HashMap<Address, u32> = Default::default();
        for tx in &batch.transactions {
            *per_sender.entry(tx.from).or_insert(0) += 1;
        }
        for tx in &batch.cross_shard_transactions {
            *per_sender.entry(tx.from).or_insert(0) += 1;
        }
        assert!(per_sender.values().all(|&n| n <= 2));
    }

    #[test]
    fn test_nonce_contiguous_per_sender() {
        let pool = pool_with(&[(0, 3), (1, 3)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = generate_transactions(&request(12, 0, 30), &pool, &cfg, &mut rng).unwrap();

        let mut nonces: std::collections::HashMap<Address, Vec<u64>> = Default::default();
        for tx in &batch.transactions {
            nonces.entry(tx.from).or_default().push(tx.nonce);
        }
        for tx in &batch.cross_shard_transactions {
            nonces.entry(tx.from).or_default().push(tx.nonce);
        }
        for seq in nonces.values_mut() {
            seq.sort_unstable();
            for (n, nonce) in seq.iter().enumerate() {
                // Pool accounts start at nonce 0: the Nth accepted
                // transaction carries initial + N - 1.
                assert_eq!(*nonce, n as u64);
            }
        }
    }

    #[test]
    fn test_pool_exhausted_terminates() {
        // Two accounts allow two ordered pairs; asking for more must fail
        // with PoolExhausted instead of spinning.
        let pool = pool_with(&[(0, 2)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let err = generate_transactions(&request(5, 0, 0), &pool, &cfg, &mut rng).unwrap_err();
        let GenerateError::PoolExhausted {
            requested,
            produced,
            ..
        } = err;
        assert_eq!(requested, 5);
        assert_eq!(produced, 2);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let pool = pool_with(&[(0, 3), (1, 3)]);
        let cfg = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let batch = generate_transactions(&request(0, 0, 25), &pool, &cfg, &mut rng).unwrap();
        assert!(batch.is_empty());
    }
}
