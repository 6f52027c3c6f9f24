use std::{io, sync::Arc};

use anyhow::Result;
use stock::PriceClient;
use ticker::{Data, config::Config, render::SystemRenderer, shell::Shell};
use tokio::{
    io::BufReader,
    sync::mpsc::{self, UnboundedSender},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    info!(?config, "starting");

    let market = Arc::new(PriceClient::new(
        config.api_base_url.clone(),
        config.cookie_url.clone(),
    )?);
    let renderer = Arc::new(SystemRenderer::new(config.open_charts));
    let data = Data {
        market,
        renderer,
        config,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(forward_interrupts(tx));

    let mut shell = Shell::new(data, Box::new(io::stdout()));
    let code = match shell.run(BufReader::new(tokio::io::stdin()), &mut rx).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "shell failed");
            eprintln!("Error: {e:#}");
            1
        }
    };

    info!("Shutdown complete.");

    // stdin is read on a blocking thread that would hold up runtime shutdown
    std::process::exit(code);
}

/// Turn every Ctrl-C into a message the shell picks up at its next safe point.
async fn forward_interrupts(tx: UnboundedSender<()>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if tx.send(()).is_err() {
            break;
        }
    }
}
