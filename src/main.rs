use anyhow::Context;
use tracing::info;

use townsquare::app::App;
use townsquare::config::load_config;
use townsquare::logging::setup_logging;

/// Loads configuration, connects, and runs the client until `quit`.
pub fn main() -> anyhow::Result<()> {
    let config = load_config().context("Could not load configuration")?;
    setup_logging(&config.log_filter);
    info!(?config, "Configuration loaded");

    let mut app = App::new(&config).context("Could not start client")?;
    app.run();
    Ok(())
}
