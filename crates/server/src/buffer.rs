//! Request buffering and batch dispatch.
//!
//! Producers enqueue on a shared entrance channel; one dispatcher task owns
//! the kind-specific buffers, coalesces everything pending, and hands each
//! fully-drained buffer downstream as a single batch. A buffer is swapped
//! atomically for an empty one, so no request is lost, double-delivered, or
//! split across partial drains.

use shardload_types::{GenerateAccountsRequest, GenerateTransactionsRequest};
use tokio::sync::mpsc;
use tracing::debug;

/// An inbound generation request, discriminated by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferedRequest {
    Accounts(GenerateAccountsRequest),
    Transactions(GenerateTransactionsRequest),
}

/// The full contents of one kind's buffer, drained in a single swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainedBatch {
    Accounts(Vec<GenerateAccountsRequest>),
    Transactions(Vec<GenerateTransactionsRequest>),
}

/// Per-kind buffers between entrance and delivery.
///
/// Owned exclusively by the dispatcher task; each kind moves Idle ->
/// Buffering -> Delivering -> Idle independently.
#[derive(Debug, Default)]
struct RequestBuffer {
    accounts: Vec<GenerateAccountsRequest>,
    transactions: Vec<GenerateTransactionsRequest>,
}

impl RequestBuffer {
    fn push(&mut self, request: BufferedRequest) {
        match request {
            BufferedRequest::Accounts(req) => self.accounts.push(req),
            BufferedRequest::Transactions(req) => self.transactions.push(req),
        }
    }
}

/// Dispatcher loop: consume the entrance channel, deliver drained batches.
///
/// An inbound request always lands in its kind's buffer and triggers a drain
/// decision; anything else already queued on the entrance is coalesced into
/// the same drain. Delivery blocks while the resolver is behind, during which
/// further requests pile up on the entrance channel and join the next drain.
///
/// Returns when the entrance channel closes or the delivery side is dropped.
pub async fn run_dispatcher(
    mut entrance: mpsc::Receiver<BufferedRequest>,
    delivery: mpsc::Sender<DrainedBatch>,
) {
    let mut buffer = RequestBuffer::default();

    while let Some(first) = entrance.recv().await {
        buffer.push(first);
        while let Ok(request) = entrance.try_recv() {
            buffer.push(request);
        }

        if !buffer.accounts.is_empty() {
            let batch = std::mem::take(&mut buffer.accounts);
            debug!(len = batch.len(), "Delivering account request batch");
            if delivery.send(DrainedBatch::Accounts(batch)).await.is_err() {
                return;
            }
        }
        if !buffer.transactions.is_empty() {
            let batch = std::mem::take(&mut buffer.transactions);
            debug!(len = batch.len(), "Delivering transaction request batch");
            if delivery
                .send(DrainedBatch::Transactions(batch))
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardload_types::ShardId;

    fn tx_request(count: usize) -> GenerateTransactionsRequest {
        GenerateTransactionsRequest {
            count,
            shard_id: ShardId(0),
            cross_shard_ratio: 25,
        }
    }

    #[tokio::test]
    async fn test_no_request_lost_or_duplicated() {
        let (entrance_tx, entrance_rx) = mpsc::channel(256);
        let (delivery_tx, mut delivery_rx) = mpsc::channel(1);
        let dispatcher = tokio::spawn(run_dispatcher(entrance_rx, delivery_tx));

        // 8 producers, 16 distinguishable requests each.
        let producers: Vec<_> = (0..8)
            .map(|p| {
                let entrance = entrance_tx.clone();
                tokio::spawn(async move {
                    for i in 0..16 {
                        let marker = p * 16 + i + 1;
                        entrance
                            .send(BufferedRequest::Transactions(tx_request(marker)))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        drop(entrance_tx);
        for producer in producers {
            producer.await.unwrap();
        }

        let mut seen = Vec::new();
        while let Some(batch) = delivery_rx.recv().await {
            match batch {
                DrainedBatch::Transactions(reqs) => {
                    seen.extend(reqs.into_iter().map(|r| r.count))
                }
                DrainedBatch::Accounts(_) => panic!("no account requests were sent"),
            }
        }
        dispatcher.await.unwrap();

        seen.sort_unstable();
        let expected: Vec<usize> = (1..=128).collect();
        assert_eq!(seen, expected, "every request delivered exactly once");
    }

    #[tokio::test]
    async fn test_kinds_drain_independently() {
        let (entrance_tx, entrance_rx) = mpsc::channel(16);
        let (delivery_tx, mut delivery_rx) = mpsc::channel(4);
        tokio::spawn(run_dispatcher(entrance_rx, delivery_tx));

        let account_req = GenerateAccountsRequest {
            count: 3,
            shard_id: ShardId(1),
        };
        entrance_tx
            .send(BufferedRequest::Accounts(account_req))
            .await
            .unwrap();
        entrance_tx
            .send(BufferedRequest::Transactions(tx_request(5)))
            .await
            .unwrap();
        drop(entrance_tx);

        let mut accounts = 0;
        let mut transactions = 0;
        while let Some(batch) = delivery_rx.recv().await {
            match batch {
                DrainedBatch::Accounts(reqs) => accounts += reqs.len(),
                DrainedBatch::Transactions(reqs) => transactions += reqs.len(),
            }
        }
        assert_eq!(accounts, 1);
        assert_eq!(transactions, 1);
    }

    #[tokio::test]
    async fn test_coalesces_while_resolver_is_behind() {
        let (entrance_tx, entrance_rx) = mpsc::channel(16);
        let (delivery_tx, mut delivery_rx) = mpsc::channel(1);
        tokio::spawn(run_dispatcher(entrance_rx, delivery_tx));

        for i in 1..=6 {
            entrance_tx
                .send(BufferedRequest::Transactions(tx_request(i)))
                .await
                .unwrap();
        }
        drop(entrance_tx);

        // The resolver side reads slowly; total across batches must still be
        // exactly the six requests, in order.
        let mut seen = Vec::new();
        while let Some(DrainedBatch::Transactions(reqs)) = delivery_rx.recv().await {
            seen.extend(reqs.into_iter().map(|r| r.count));
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
    }
}
