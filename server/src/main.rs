use clap::Parser;
use murmur_server::{BoxError, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();
    let listener = murmur_server::bind(&config).await?;
    murmur_server::run_until(listener, config, murmur_server::shutdown_signal()).await
}
