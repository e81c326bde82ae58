use anyhow::Result;
use clap::Parser;
use stt_client::{run, Args};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = run(Args::parse()).await?;
    print!("{report}");
    Ok(())
}
