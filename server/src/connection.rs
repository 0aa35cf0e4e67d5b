use std::{error::Error, fmt, net::SocketAddr, time::Duration};

use lib::{
    protocol::{ProtocolError, write_message},
    types::ConnectionId,
};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::{Mutex, watch},
    time::timeout,
};
use tracing::debug;

type Transport = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug)]
pub enum SendError {
    /// The connection was closed before this write; nothing was sent.
    Closed,
    TimedOut(Duration),
    Protocol(ProtocolError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Closed => f.write_str("connection already closed"),
            SendError::TimedOut(limit) => write!(f, "write timed out after {:?}", limit),
            SendError::Protocol(err) => write!(f, "{}", err),
        }
    }
}

impl Error for SendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SendError::Protocol(err) => Some(err),
            SendError::Closed | SendError::TimedOut(_) => None,
        }
    }
}

/// Write side of one accepted client.
///
/// All writes go through a single mutex so broadcasts from different
/// sessions never interleave bytes on the same socket. Once `close` has run
/// the connection refuses every further write.
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<Transport>,
    closed: watch::Sender<bool>,
    write_timeout: Duration,
}

impl Connection {
    pub fn new<W>(id: ConnectionId, peer: SocketAddr, writer: W, write_timeout: Duration) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id,
            peer,
            writer: Mutex::new(Box::new(writer)),
            closed: watch::Sender::new(false),
            write_timeout,
        }
    }

    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// # Errors
    ///
    /// Fails with [`SendError::Closed`] after `close`, with
    /// [`SendError::TimedOut`] when the write does not finish in time, and
    /// with [`SendError::Protocol`] on transport failure.
    ///
    /// The timeout covers waiting for the writer lock as well, so callers
    /// queued behind a stalled write give up on the same deadline.
    pub async fn send(&self, message: &[u8]) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }

        let write = async {
            let mut writer = self.writer.lock().await;
            if self.is_closed() {
                return Err(SendError::Closed);
            }
            write_message(&mut *writer, message)
                .await
                .map_err(SendError::Protocol)
        };

        match timeout(self.write_timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(SendError::TimedOut(self.write_timeout)),
        }
    }

    /// Shuts the transport down. Only the first call does anything; the
    /// return value tells whether this call was it.
    ///
    /// The connection counts as closed before the writer lock is taken, so
    /// writers still queued for the lock fail with [`SendError::Closed`].
    pub async fn close(&self) -> bool {
        if self.closed.send_replace(true) {
            return false;
        }

        let shutdown = async {
            let mut writer = self.writer.lock().await;
            writer.shutdown().await
        };
        match timeout(self.write_timeout, shutdown).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                debug!("shutdown of connection {} ({}) failed: {}", self.id, self.peer, err);
            }
            Err(_) => {
                debug!("shutdown of connection {} ({}) timed out", self.id, self.peer);
            }
        }
        true
    }

    /// Resolves once the connection has been closed from anywhere.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
