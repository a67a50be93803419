mod app;
mod config;
mod controller;
mod cursor;
mod diag;
mod input;
mod screen;
mod supervisor;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use boombox_mpd::MpdSession;

use config::Config;
use controller::Controller;
use diag::Diag;
use screen::{Renderer, Screen};
use supervisor::Supervisor;

/// Front-panel controller for an MPD-based audio appliance.
#[derive(Parser, Debug)]
#[command(name = "boombox", version)]
struct Cli {
    /// Run supervised in the background, logging to the configured file
    #[arg(short, long)]
    background: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/boombox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&path).with_context(|| format!("loading {}", path.display()))?;

    init_logging(&config, cli.background)?;
    info!(config = %path.display(), "boombox starting");

    if cli.background {
        Supervisor::new(&config.daemon)
            .run(|| run_once(&config, true))
            .await
    } else {
        run_once(&config, false).await
    }
}

fn init_logging(config: &Config, background: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if background {
        if let Some(parent) = config.daemon.log_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.daemon.log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// One full appliance run: display, input sources, player session,
/// event loop. The supervisor restarts this on failure.
async fn run_once(config: &Config, background: bool) -> anyhow::Result<()> {
    let renderer = Renderer::new(build_screen()?);

    let (tx, mut rx) = tokio::sync::mpsc::channel(32);
    let mut have_source = false;
    if config.input.keyboard && !background {
        input::keyboard::spawn(tx.clone());
        have_source = true;
    }
    if let Some(device) = &config.input.ir_device {
        input::ir::spawn(device, tx.clone());
        have_source = true;
    }
    #[cfg(feature = "hardware")]
    let _buttons = {
        have_source = true;
        input::gpio::listen(tx.clone())?
    };
    if !have_source {
        anyhow::bail!("no input sources configured");
    }
    drop(tx);

    let session = MpdSession::connect(&config.connect_options()).await?;
    info!(version = %session.protocol_version, "connected to player");

    let probe_url = config.stations.first().map(|s| s.url.clone());
    let diag = Diag::new(&config.diagnostics, probe_url)?;
    let mut controller = Controller::new(session, renderer, diag, config);

    app::run(&mut controller, &mut rx, &config.timers).await
}

#[cfg(feature = "hardware")]
fn build_screen() -> anyhow::Result<Box<dyn Screen>> {
    Ok(Box::new(screen::lcd::LcdScreen::new(
        screen::lcd::DEFAULT_I2C_ADDR,
    )?))
}

#[cfg(not(feature = "hardware"))]
fn build_screen() -> anyhow::Result<Box<dyn Screen>> {
    Ok(Box::new(screen::term::TermScreen::new()?))
}
