use anyhow::Result;
use stt_configuration::{load_config, setup_logging};
use stt_setup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    setup_logging(&config);
    let app = Application::new(config)?;
    app.run().await?;
    Ok(())
}
