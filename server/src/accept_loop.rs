use std::future::{Future, pending};

use crate::{
    config::ServerConfig,
    error::{BoxError, ServerError},
    session::handle_connection,
    state::ServerState,
};
use tokio::net::TcpListener;
use tracing::{error, info};

/// # Errors
///
/// Returns [`ServerError::Bind`] when the configured address cannot be
/// listened on.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.bind_addr();
    let result = TcpListener::bind(addr.as_str()).await;
    result.map_err(|source| ServerError::Bind { addr, source })
}

/// # Errors
///
/// Fails only if the listener's local address cannot be read.
pub async fn run(listener: TcpListener, config: ServerConfig) -> Result<(), BoxError> {
    run_until(listener, config, pending::<()>()).await
}

/// Accepts clients until `shutdown` resolves. Sessions already running are
/// left to finish on their own.
///
/// # Errors
///
/// Fails only if the listener's local address cannot be read.
pub async fn run_until(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<(), BoxError> {
    let local_addr = listener.local_addr()?;
    let state = ServerState::new(config);
    tokio::pin!(shutdown);

    info!("chat relay listening on {}", local_addr);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping accept loop");
                return Ok(());
            }
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(err) = handle_connection(stream, state).await {
                                error!("connection handling failed: {}", err);
                            }
                        });
                    }
                    Err(err) => {
                        error!("accept error: {}", err);
                    }
                }
            }
        }
    }
}
