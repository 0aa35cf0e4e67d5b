use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use lib::types::ConnectionId;

use crate::{broadcast::Broadcaster, config::ServerConfig, registry::Registry};

#[derive(Clone)]
pub(crate) struct ServerState {
    pub(crate) registry: Registry,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) config: Arc<ServerConfig>,
    connections: Arc<AtomicU64>,
}

impl ServerState {
    pub(crate) fn new(config: ServerConfig) -> Self {
        let registry = Registry::new();
        Self {
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            config: Arc::new(config),
            connections: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.connections.fetch_add(1, Ordering::Relaxed))
    }
}
