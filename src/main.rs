use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use carctl::command::CommandTable;
use carctl::config::Config;
use carctl::console;
use carctl::controller::CarController;
use carctl::transport::WsConnector;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "carctl.toml".to_string());
    let config = Config::from_file(&config_path)?;

    let table = CommandTable::for_variant(config.console.variant);
    let connector = WsConnector::new(&config.car)?;
    let (messages_tx, messages_rx) = mpsc::channel(32);
    let mut controller = CarController::new(Box::new(connector), table.clone(), messages_tx);

    if !controller.connect().await {
        anyhow::bail!("could not connect to {}", config.car.ws_url());
    }
    info!("Connected to {}", config.car.ws_url());

    console::run(controller, table, messages_rx).await
}
