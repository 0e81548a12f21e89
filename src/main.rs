//! Payroll engine server entry point.

use std::env;

use tracing::{error, info};

use payroll_engine::api::{AppState, Ports, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::telemetry::init_logging;

const CONFIG_ENV: &str = "PAYROLL_ENGINE_CONFIG";
const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config_dir = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let config = match ConfigLoader::load(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration from {config_dir}: {e}");
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    init_logging(config.config().logging());

    let bind_address = config.config().server().bind_address.clone();
    let app = create_router(AppState::new(config, Ports::in_memory()));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, config_dir = %config_dir, "Payroll engine listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server stopped");
        return Err(e);
    }
    Ok(())
}
