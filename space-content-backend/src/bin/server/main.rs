use std::sync::Arc;

use space_content_backend::error::AppError;
use space_content_backend::telemetry::setup_telemetry;
use space_content_backend::{run_server, shutdown_signal};
use space_content_config::get_config;
use space_content_target::TargetClient;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_telemetry();

    let config = get_config()?;
    info!("starting up server...");

    let target = Arc::new(TargetClient::new(config.target));
    let listener = TcpListener::bind(config.listen_address).await?;

    run_server(listener, target, shutdown_signal()).await
}
