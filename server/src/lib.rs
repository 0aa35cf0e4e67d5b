mod accept_loop;
mod broadcast;
mod config;
mod connection;
mod error;
mod registry;
mod session;
mod signal;
mod state;

pub use accept_loop::{bind, run, run_until};
pub use broadcast::Broadcaster;
pub use config::{Cli, ServerConfig};
pub use connection::{Connection, SendError};
pub use error::{BoxError, ServerError};
pub use registry::{Member, Registry, RegistryError};
pub use signal::shutdown_signal;
