use std::env;
use std::error::Error;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::ConfigLoader;

const DEFAULT_POLICY_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let policy_dir = env::var("POLICY_DIR").unwrap_or_else(|_| DEFAULT_POLICY_DIR.to_string());
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&policy_dir)?;
    info!(
        policy_dir = %policy_dir,
        utc_offset_minutes = config.policy().utc_offset_minutes,
        "Policy loaded"
    );

    let router = create_router(AppState::from_config(config));
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Server starting...");

    axum::serve(listener, router).await?;
    Ok(())
}
