use tracing::{debug, warn};

use crate::{connection::SendError, registry::Registry};

#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Registry,
}

impl Broadcaster {
    pub const fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Writes `label` followed by `payload` to every current member and
    /// returns how many writes succeeded.
    ///
    /// A recipient whose write fails or times out is closed and removed from
    /// the registry; the remaining recipients are still served.
    pub async fn broadcast(&self, payload: &[u8], label: &str) -> usize {
        let mut message = Vec::with_capacity(label.len() + payload.len());
        message.extend_from_slice(label.as_bytes());
        message.extend_from_slice(payload);

        let mut delivered = 0;
        for member in self.registry.snapshot().await {
            let connection = &member.connection;
            match connection.send(&message).await {
                Ok(()) => delivered += 1,
                Err(SendError::Closed) => {
                    debug!(
                        "skipping closed connection {} ({})",
                        connection.id(),
                        member.name
                    );
                }
                Err(err) => {
                    warn!(
                        "dropping connection {} ({}, {}) after failed delivery: {}",
                        connection.id(),
                        member.name,
                        connection.peer(),
                        err
                    );
                    connection.close().await;
                    self.registry.leave(connection.id()).await;
                }
            }
        }
        delivered
    }
}
