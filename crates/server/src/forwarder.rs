//! Outbound delivery of batches to shard endpoints.

use serde::Serialize;

/// Ships serialized batches to shard endpoints over HTTP.
///
/// No retry lives here; retry policy, if any, belongs to the caller. The
/// client carries no request timeout, matching the fire-and-forget contract
/// of the pipeline (a hung shard endpoint blocks the resolver).
#[derive(Debug, Clone, Default)]
pub struct ShardForwarder {
    client: reqwest::Client,
}

impl ShardForwarder {
    /// Create a forwarder with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON-serialize `payload` and POST it to `url`.
    ///
    /// Distinguishes transport failures from shard-side rejection so callers
    /// can log them apart; neither is retried.
    pub async fn send<T: Serialize>(&self, url: &str, payload: &T) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(ForwardError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::NonSuccessStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Errors from forwarding a batch.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The request never completed (connection refused, DNS, reset, ...).
    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// The shard answered with a non-2xx status.
    #[error("{url} returned status {status}")]
    NonSuccessStatus { url: String, status: u16 },
}
