//! Batch resolution: turn drained request batches into accounts and
//! transactions and forward them to shard endpoints.

use crate::buffer::DrainedBatch;
use crate::config::ServerConfig;
use crate::forwarder::{ForwardError, ShardForwarder};
use rand::rngs::OsRng;
use shardload_generator::{
    generate_transactions, AccountPool, GenerateError, GeneratorConfig, PoolError,
};
use shardload_types::{
    unix_nanos, AccountBatch, AccountState, CodecError, GenerateAccountsRequest,
    GenerateTransactionsRequest, ShardId, TransactionBatch,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Single task that resolves drained batches.
///
/// Owns the account pool, the batch sequence counter and the CSPRNG; all
/// generation for a batch runs sequentially here, so the constraint state
/// observes every successful pick before the next draw and no locks are
/// needed.
pub struct Resolver {
    config: Arc<ServerConfig>,
    generator: GeneratorConfig,
    pool: AccountPool,
    forwarder: ShardForwarder,
    sequence_id: u64,
}

impl Resolver {
    /// Build a resolver over an empty account pool.
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let generator = config.generator_config();
        let pool = AccountPool::new(generator.initial_balance);
        Self {
            config,
            generator,
            pool,
            forwarder: ShardForwarder::new(),
            sequence_id: 0,
        }
    }

    /// Consume delivered batches until the delivery channel closes.
    ///
    /// Failures are collected per request and logged as a list; one bad
    /// request never blocks its siblings and this loop never stops on error.
    pub async fn run(mut self, mut delivery: mpsc::Receiver<DrainedBatch>) {
        while let Some(batch) = delivery.recv().await {
            let errors = match batch {
                DrainedBatch::Accounts(requests) => self.resolve_accounts(requests).await,
                DrainedBatch::Transactions(requests) => self.resolve_transactions(requests).await,
            };
            for error in &errors {
                warn!(%error, "Request resolution failed");
            }
        }
    }

    async fn resolve_accounts(
        &mut self,
        requests: Vec<GenerateAccountsRequest>,
    ) -> Vec<ResolveError> {
        let mut errors = Vec::new();
        for request in requests {
            if let Err(error) = self.resolve_account_request(request).await {
                errors.push(error);
            }
        }
        errors
    }

    async fn resolve_transactions(
        &mut self,
        requests: Vec<GenerateTransactionsRequest>,
    ) -> Vec<ResolveError> {
        let mut errors = Vec::new();
        for request in requests {
            if let Err(error) = self.resolve_transaction_request(request).await {
                errors.push(error);
            }
        }
        errors
    }

    /// Create the requested accounts and forward the batch.
    ///
    /// A zero count yields an empty account set and an empty payload; that is
    /// not an error.
    async fn resolve_account_request(
        &mut self,
        request: GenerateAccountsRequest,
    ) -> Result<(), ResolveError> {
        let accounts = self
            .pool
            .create_accounts(request.shard_id, request.count, &mut OsRng)?;

        let mut content = Vec::with_capacity(accounts.len());
        for account in accounts {
            content.push(account.marshal()?);
        }
        let batch = AccountBatch {
            count: content.len(),
            content,
            shard_id: request.shard_id,
        };

        // Best-effort copy to the beacon; its failure never fails the request.
        if let Some(beacon) = &self.config.beacon_url {
            if let Err(error) = self
                .forwarder
                .send(&format!("{beacon}/accounts"), &batch)
                .await
            {
                warn!(%error, "Beacon forward failed");
            }
        }

        let url = self
            .config
            .shard_url(request.shard_id)
            .ok_or(ResolveError::UnknownShard(request.shard_id))?;
        self.forwarder
            .send(&format!("{url}/accounts"), &batch)
            .await?;

        info!(shard = %request.shard_id, count = batch.count, "Forwarded account batch");
        Ok(())
    }

    /// Generate the requested transactions and forward the batch.
    ///
    /// The sequence counter advances once per batch shipped, owned here and
    /// never shared. A forwarding failure is surfaced but the batch is
    /// considered sent; there is no retry.
    async fn resolve_transaction_request(
        &mut self,
        request: GenerateTransactionsRequest,
    ) -> Result<(), ResolveError> {
        let generated =
            generate_transactions(&request, &self.pool, &self.generator, &mut OsRng)?;

        let mut transactions = Vec::with_capacity(generated.transactions.len());
        for tx in &generated.transactions {
            transactions.push(serde_json::to_vec(tx).map_err(CodecError::Json)?);
        }
        let mut cross_shard_transactions =
            Vec::with_capacity(generated.cross_shard_transactions.len());
        for tx in &generated.cross_shard_transactions {
            cross_shard_transactions.push(serde_json::to_vec(tx).map_err(CodecError::Json)?);
        }

        self.sequence_id += 1;
        let batch = TransactionBatch {
            timestamp: unix_nanos(),
            sequence_id: self.sequence_id,
            transactions,
            cross_shard_transactions,
        };

        let url = self
            .config
            .shard_url(request.shard_id)
            .ok_or(ResolveError::UnknownShard(request.shard_id))?;
        self.forwarder.send(&format!("{url}/req"), &batch).await?;

        info!(
            shard = %request.shard_id,
            sequence_id = batch.sequence_id,
            intra = batch.transactions.len(),
            cross = batch.cross_shard_transactions.len(),
            "Forwarded transaction batch"
        );
        Ok(())
    }
}

/// Failures while resolving a single request within a drained batch.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Account generation failed: {0}")]
    Pool(#[from] PoolError),

    #[error("Transaction generation failed: {0}")]
    Generate(#[from] GenerateError),

    #[error("Entity encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("No address configured for {0}")]
    UnknownShard(ShardId),

    #[error("Forwarding failed: {0}")]
    Forward(#[from] ForwardError),
}
