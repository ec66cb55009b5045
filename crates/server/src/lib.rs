//! HTTP front end and dispatch pipeline for the shardload generator.
//!
//! Inbound generation requests are accepted by thin axum handlers and fed
//! into a two-stage pipeline: a single dispatcher task buffers and coalesces
//! pending requests per kind, a single resolver task turns drained batches
//! into accounts and transactions and forwards them to shard endpoints.
//! Parallelism exists only at the producer edge; each pipeline stage is
//! single-threaded so buffer swaps and the sequence counter need no locks.

pub mod buffer;
pub mod config;
pub mod forwarder;
pub mod resolver;
pub mod routes;
pub mod server;

pub use buffer::{run_dispatcher, BufferedRequest, DrainedBatch};
pub use config::{ConfigError, ServerConfig};
pub use forwarder::{ForwardError, ShardForwarder};
pub use resolver::{ResolveError, Resolver};
pub use routes::{create_router, AppState};
pub use server::{Server, ServerError, ServerHandle};
