use std::{io, sync::Arc, time::Duration};

use lib::{
    constants::{BUFFER_SIZE, QUIT_COMMAND},
    protocol::{
        NAME_PROMPT, ProtocolError, is_quit, joined, left, read_message, sender_label, welcome,
    },
    types::DisplayName,
};
use tokio::{io::AsyncRead, net::TcpStream, time::timeout};
use tracing::{debug, error, info};

use crate::{connection::Connection, error::BoxError, state::ServerState};

enum SessionState {
    /// Prompt sent or about to be; waiting for the name.
    Connected,
    Named(DisplayName),
    Active(DisplayName),
    Closed {
        name: Option<DisplayName>,
        reason: CloseReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Quit,
    Disconnected,
}

pub(crate) async fn handle_connection(stream: TcpStream, state: ServerState) -> Result<(), BoxError> {
    let peer = stream.peer_addr()?;
    let (reader, writer) = stream.into_split();
    let connection = Arc::new(Connection::new(
        state.next_connection_id(),
        peer,
        writer,
        state.config.write_timeout,
    ));

    info!("{} has connected (connection_id={})", peer, connection.id());
    run_session(connection, reader, &state).await;
    Ok(())
}

/// Drives one client from prompt to departure. Never fails: every error ends
/// this session and nothing else.
pub(crate) async fn run_session<R>(connection: Arc<Connection>, mut reader: R, state: &ServerState)
where
    R: AsyncRead + Unpin,
{
    let idle_timeout = state.config.idle_timeout;
    let mut buf = [0u8; BUFFER_SIZE];
    let mut session = SessionState::Connected;

    loop {
        session = match session {
            SessionState::Connected => {
                if let Err(err) = connection.send(NAME_PROMPT.as_bytes()).await {
                    debug!("could not prompt {} for a name: {}", connection.peer(), err);
                    SessionState::Closed {
                        name: None,
                        reason: CloseReason::Disconnected,
                    }
                } else {
                    match receive(&connection, &mut reader, &mut buf, idle_timeout).await {
                        Ok(raw) => SessionState::Named(DisplayName::from_bytes(raw)),
                        Err(err) => {
                            debug!("{} left before naming itself: {}", connection.peer(), err);
                            SessionState::Closed {
                                name: None,
                                reason: CloseReason::Disconnected,
                            }
                        }
                    }
                }
            }
            SessionState::Named(name) => register(&connection, name, state).await,
            SessionState::Active(name) => {
                match receive(&connection, &mut reader, &mut buf, idle_timeout).await {
                    Ok(payload) if is_quit(payload) => SessionState::Closed {
                        name: Some(name),
                        reason: CloseReason::Quit,
                    },
                    Ok(payload) => {
                        state
                            .broadcaster
                            .broadcast(payload, &sender_label(&name))
                            .await;
                        SessionState::Active(name)
                    }
                    Err(err) => {
                        debug!("read from {} ({}) ended: {}", name, connection.peer(), err);
                        SessionState::Closed {
                            name: Some(name),
                            reason: CloseReason::Disconnected,
                        }
                    }
                }
            }
            SessionState::Closed { name, reason } => {
                close(&connection, name, reason, state).await;
                return;
            }
        };
    }
}

async fn register(connection: &Arc<Connection>, name: DisplayName, state: &ServerState) -> SessionState {
    if let Err(err) = connection.send(welcome(&name).as_bytes()).await {
        debug!("could not welcome {} ({}): {}", name, connection.peer(), err);
        return SessionState::Closed {
            name: None,
            reason: CloseReason::Disconnected,
        };
    }

    if let Err(err) = state.registry.join(Arc::clone(connection), name.clone()).await {
        error!("failed to register {} ({}): {}", name, connection.peer(), err);
        return SessionState::Closed {
            name: None,
            reason: CloseReason::Disconnected,
        };
    }

    info!(
        "{} joined as {:?} (connection_id={}, members={})",
        connection.peer(),
        name.as_str(),
        connection.id(),
        state.registry.len().await
    );
    state.broadcaster.broadcast(joined(&name).as_bytes(), "").await;
    SessionState::Active(name)
}

async fn receive<'a, R>(
    connection: &Connection,
    reader: &mut R,
    buf: &'a mut [u8],
    idle_timeout: Option<Duration>,
) -> Result<&'a [u8], ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let read = async move {
        match idle_timeout {
            Some(limit) => timeout(limit, read_message(reader, buf))
                .await
                .unwrap_or_else(|_| Err(ProtocolError::Io(io::ErrorKind::TimedOut.into()))),
            None => read_message(reader, buf).await,
        }
    };

    tokio::select! {
        result = read => result,
        _ = connection.closed() => Err(ProtocolError::PeerDisconnected),
    }
}

async fn close(
    connection: &Connection,
    name: Option<DisplayName>,
    reason: CloseReason,
    state: &ServerState,
) {
    if reason == CloseReason::Quit
        && let Err(err) = connection.send(QUIT_COMMAND).await
    {
        debug!("could not echo quit to {}: {}", connection.peer(), err);
    }

    connection.close().await;
    state.registry.leave(connection.id()).await;

    let Some(name) = name else {
        info!(
            "{} disconnected without joining (connection_id={})",
            connection.peer(),
            connection.id()
        );
        return;
    };

    info!(
        "{} ({}) left the chat ({:?}, members={})",
        name,
        connection.peer(),
        reason,
        state.registry.len().await
    );
    state.broadcaster.broadcast(left(&name).as_bytes(), "").await;
}
