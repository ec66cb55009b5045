//! Tunables for account and transaction generation.

/// Configuration for the generation engine.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Starting balance for freshly created accounts.
    pub initial_balance: u64,

    /// Value carried by every generated transfer.
    pub transfer_value: u64,

    /// Maximum transactions a single account may send within one batch.
    pub max_txs_per_account: u32,

    /// Minimum sender balance for a pick to be legal.
    pub min_balance: u64,

    /// Attempt bound per produced transaction.
    ///
    /// Guarantees the batch loop terminates when the pool is too small for
    /// the requested count; exhaustion surfaces as
    /// [`GenerateError::PoolExhausted`](crate::GenerateError::PoolExhausted).
    pub max_pick_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000_000,
            transfer_value: 1,
            max_txs_per_account: 20,
            min_balance: 1,
            max_pick_attempts: 64,
        }
    }
}

impl GeneratorConfig {
    /// Config with a custom per-account rate cap.
    pub fn with_max_txs_per_account(max_txs_per_account: u32) -> Self {
        Self {
            max_txs_per_account,
            ..Default::default()
        }
    }
}
