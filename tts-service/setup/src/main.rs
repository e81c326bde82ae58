use anyhow::Result;
use tts_configuration::{load_config, setup_logging};
use tts_setup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    setup_logging(&config);
    let app = Application::new(config)?;
    app.run().await?;
    Ok(())
}
