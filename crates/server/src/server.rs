//! Server wiring: channels, pipeline tasks, HTTP listener.

use crate::buffer::run_dispatcher;
use crate::config::{ConfigError, ServerConfig};
use crate::resolver::Resolver;
use crate::routes::{create_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Capacity of the entrance channel feeding the dispatcher.
const ENTRANCE_CAPACITY: usize = 64;

/// Capacity of the delivery channel feeding the resolver.
///
/// Kept at 1 so the dispatcher blocks while the resolver is behind and
/// pending requests coalesce into the next drain.
const DELIVERY_CAPACITY: usize = 1;

/// The workload generator server.
pub struct Server {
    config: Arc<ServerConfig>,
}

impl Server {
    /// Create a server from a validated configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Bind the listener and spawn the pipeline tasks.
    ///
    /// Failure to bind is fatal to the caller; everything after this point
    /// only logs and continues serving.
    pub async fn spawn(self) -> Result<ServerHandle, ServerError> {
        let (entrance_tx, entrance_rx) = mpsc::channel(ENTRANCE_CAPACITY);
        let (delivery_tx, delivery_rx) = mpsc::channel(DELIVERY_CAPACITY);

        let dispatcher = tokio::spawn(run_dispatcher(entrance_rx, delivery_tx));
        let resolver = tokio::spawn(Resolver::new(self.config.clone()).run(delivery_rx));

        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
        info!(%local_addr, shards = self.config.shards.len(), "Workload generator listening");

        let router = create_router(AppState {
            entrance: entrance_tx,
        });
        let http = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "HTTP server terminated");
            }
        });

        Ok(ServerHandle {
            local_addr,
            http,
            dispatcher,
            resolver,
        })
    }
}

/// Handle for a running server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    http: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
    resolver: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the HTTP front end to finish.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.http.await
    }

    /// Tear down all pipeline tasks.
    pub fn abort(&self) {
        self.http.abort();
        self.dispatcher.abort();
        self.resolver.abort();
    }
}

/// Unrecoverable setup failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),
}
