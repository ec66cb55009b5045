//! Per-run constraint state.

use shardload_types::{Account, Address};
use std::collections::{HashMap, HashSet};

/// Bookkeeping that governs which `(from, to, nonce)` triples are legal
/// within one generation run.
///
/// Scoped to a single batch: seeded from the pool's current nonces, mutated
/// sequentially as picks succeed, discarded when the batch completes. Nothing
/// here is written back to the pool.
#[derive(Debug, Default)]
pub struct RunConstraints {
    /// Transactions sent per account so far in this run.
    sent_count: HashMap<Address, u32>,
    /// Destinations already used per sender, to avoid repeats within the run.
    prior_targets: HashMap<Address, HashSet<Address>>,
    /// Next nonce per sender.
    next_nonce: HashMap<Address, u64>,
}

impl RunConstraints {
    /// Fresh state seeded with the nonce cursors of `accounts`.
    pub fn seeded_from(accounts: &[Account]) -> Self {
        let mut state = Self::default();
        for account in accounts {
            state.next_nonce.insert(account.address, account.nonce);
        }
        state
    }

    /// Whether `to` was already used as a destination by `from` in this run.
    pub fn is_prior_target(&self, from: Address, to: Address) -> bool {
        self.prior_targets
            .get(&from)
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Transactions sent by `from` so far in this run.
    pub fn sent_count(&self, from: Address) -> u32 {
        self.sent_count.get(&from).copied().unwrap_or(0)
    }

    /// Record a successful pick and return the nonce for the new transaction.
    ///
    /// The returned value is the pre-increment cursor; the stored cursor
    /// advances by exactly one. `initial_nonce` seeds the cursor when the
    /// sender was not part of the seeding set.
    pub fn record_success(&mut self, from: Address, to: Address, initial_nonce: u64) -> u64 {
        self.prior_targets.entry(from).or_default().insert(to);
        *self.sent_count.entry(from).or_insert(0) += 1;
        let cursor = self.next_nonce.entry(from).or_insert(initial_nonce);
        let nonce = *cursor;
        *cursor += 1;
        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address::from_public_key(&[seed; 32])
    }

    #[test]
    fn test_nonce_is_pre_increment_and_monotonic() {
        let mut state = RunConstraints::default();
        assert_eq!(state.record_success(addr(1), addr(2), 5), 5);
        assert_eq!(state.record_success(addr(1), addr(3), 5), 6);
        assert_eq!(state.record_success(addr(1), addr(4), 5), 7);
    }

    #[test]
    fn test_seeding_uses_pool_nonce() {
        let mut account = Account::new([1u8; 32], 100);
        account.nonce = 9;
        let mut state = RunConstraints::seeded_from(std::slice::from_ref(&account));
        assert_eq!(state.record_success(account.address, addr(2), 0), 9);
    }

    #[test]
    fn test_prior_targets_tracked_per_sender() {
        let mut state = RunConstraints::default();
        state.record_success(addr(1), addr(2), 0);

        assert!(state.is_prior_target(addr(1), addr(2)));
        assert!(!state.is_prior_target(addr(1), addr(3)));
        // A different sender may reuse the destination.
        assert!(!state.is_prior_target(addr(4), addr(2)));
    }

    #[test]
    fn test_sent_count_advances() {
        let mut state = RunConstraints::default();
        assert_eq!(state.sent_count(addr(1)), 0);
        state.record_success(addr(1), addr(2), 0);
        state.record_success(addr(1), addr(3), 0);
        assert_eq!(state.sent_count(addr(1)), 2);
    }
}
