//! Server configuration: listen address, shard address table, tunables.

use serde::Deserialize;
use shardload_generator::GeneratorConfig;
use shardload_types::ShardId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

/// Configuration for the workload generator server.
///
/// The shard address table is static: `"Shard_<id>"` keys map to base URLs.
/// Shards are never discovered dynamically.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP front end listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Optional beacon endpoint that also receives account batches.
    #[serde(default)]
    pub beacon_url: Option<String>,

    /// Static shard address table.
    pub shards: HashMap<String, String>,

    /// Starting balance for generated accounts.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,

    /// Per-account rate cap within one batch.
    #[serde(default = "default_max_txs_per_account")]
    pub max_txs_per_account: u32,

    /// Attempt bound per produced transaction.
    #[serde(default = "default_max_pick_attempts")]
    pub max_pick_attempts: u32,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_initial_balance() -> u64 {
    10_000_000
}

fn default_max_txs_per_account() -> u32 {
    20
}

fn default_max_pick_attempts() -> u32 {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        let shards = [
            ("Shard_0", "http://127.0.0.1:9200"),
            ("Shard_1", "http://127.0.0.1:10200"),
            ("Shard_2", "http://127.0.0.1:8200"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            listen_addr: default_listen_addr(),
            beacon_url: None,
            shards,
            initial_balance: default_initial_balance(),
            max_txs_per_account: default_max_txs_per_account(),
            max_pick_attempts: default_max_pick_attempts(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML configuration string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_toml_str(&contents)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shards.is_empty() {
            return Err(ConfigError::NoShards);
        }
        for (key, url) in &self.shards {
            if key
                .strip_prefix("Shard_")
                .and_then(|id| id.parse::<u64>().ok())
                .is_none()
            {
                return Err(ConfigError::BadShardKey(key.clone()));
            }
            if url.is_empty() {
                return Err(ConfigError::BadShardKey(key.clone()));
            }
        }
        Ok(())
    }

    /// Resolve the base URL for a shard from the static table.
    pub fn shard_url(&self, shard: ShardId) -> Option<&str> {
        self.shards.get(&shard.table_key()).map(|s| s.as_str())
    }

    /// The generation tunables carried by this configuration.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            initial_balance: self.initial_balance,
            max_txs_per_account: self.max_txs_per_account,
            max_pick_attempts: self.max_pick_attempts,
            ..GeneratorConfig::default()
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {0}: {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No shard addresses configured")]
    NoShards,

    #[error("Shard table entry {0:?} is not of the form \"Shard_<id>\" with a URL")]
    BadShardKey(String),
}
