use std::net::SocketAddr;

use blocks_api::{server, Result, PORT};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let addr = SocketAddr::from(([0, 0, 0, 0], PORT));
    server::serve(addr, server::AppState::default()).await
}
