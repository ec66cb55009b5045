//! Per-shard account pool.

use ed25519_dalek::SigningKey;
use rand::{CryptoRng, RngCore};
use shardload_types::{Account, ShardId};
use std::collections::HashMap;
use tracing::info;

/// Holds the generated accounts for every shard.
///
/// Each shard's set is replaced wholesale by [`create_accounts`] and kept in
/// creation order, so index-based uniform sampling is stable for a given
/// shard. The pool is read-only to the selection engine: generation never
/// writes nonces or balances back here.
///
/// [`create_accounts`]: AccountPool::create_accounts
pub struct AccountPool {
    by_shard: HashMap<ShardId, Vec<Account>>,
    initial_balance: u64,
}

impl AccountPool {
    /// Create an empty pool with the configured starting balance.
    pub fn new(initial_balance: u64) -> Self {
        Self {
            by_shard: HashMap::new(),
            initial_balance,
        }
    }

    /// Generate `count` fresh accounts for `shard`, replacing its current set.
    ///
    /// Each account gets a new Ed25519 keypair, the configured starting
    /// balance and a zero nonce. A failure to draw key material is fatal to
    /// the calling request: no partial set is stored.
    pub fn create_accounts<R: RngCore + CryptoRng>(
        &mut self,
        shard: ShardId,
        count: usize,
        rng: &mut R,
    ) -> Result<&[Account], PoolError> {
        let mut accounts = Vec::with_capacity(count);
        for _ in 0..count {
            let mut seed = [0u8; 32];
            rng.try_fill_bytes(&mut seed)
                .map_err(|e| PoolError::KeyGeneration(e.to_string()))?;
            let signing_key = SigningKey::from_bytes(&seed);
            let public_key = signing_key.verifying_key().to_bytes();
            accounts.push(Account::new(public_key, self.initial_balance));
        }

        info!(%shard, count, "Generated accounts");
        let slot = self.by_shard.entry(shard).or_default();
        *slot = accounts;
        Ok(slot)
    }

    /// Accounts currently held for `shard`, in stable order.
    pub fn accounts_for(&self, shard: ShardId) -> Option<&[Account]> {
        self.by_shard.get(&shard).map(|v| v.as_slice())
    }

    /// Shard IDs with an account set, sorted for deterministic sampling.
    pub fn shard_ids(&self) -> Vec<ShardId> {
        let mut ids: Vec<ShardId> = self.by_shard.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Total accounts across all shards.
    pub fn total_accounts(&self) -> usize {
        self.by_shard.values().map(|v| v.len()).sum()
    }
}

/// Errors from account pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The CSPRNG could not produce key material.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_create_accounts() {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let accounts = pool.create_accounts(ShardId(0), 5, &mut rng).unwrap();
        assert_eq!(accounts.len(), 5);
        for account in accounts {
            assert_eq!(account.balance, 1_000);
            assert_eq!(account.nonce, 0);
        }
        assert_eq!(pool.total_accounts(), 5);
    }

    #[test]
    fn test_addresses_are_unique() {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let accounts = pool.create_accounts(ShardId(0), 50, &mut rng).unwrap();
        let mut addresses: Vec<_> = accounts.iter().map(|a| a.address).collect();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 50);
    }

    #[test]
    fn test_create_replaces_shard_set() {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        pool.create_accounts(ShardId(1), 5, &mut rng).unwrap();
        pool.create_accounts(ShardId(1), 2, &mut rng).unwrap();
        assert_eq!(pool.accounts_for(ShardId(1)).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_count_yields_empty_set() {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let accounts = pool.create_accounts(ShardId(0), 0, &mut rng).unwrap();
        assert!(accounts.is_empty());
        assert_eq!(pool.accounts_for(ShardId(0)), Some(&[][..]));
    }

    #[test]
    fn test_shard_ids_sorted() {
        let mut pool = AccountPool::new(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for id in [3, 0, 2] {
            pool.create_accounts(ShardId(id), 1, &mut rng).unwrap();
        }
        assert_eq!(pool.shard_ids(), vec![ShardId(0), ShardId(2), ShardId(3)]);
    }
}
