use anyhow::Result;
use barmon::config::Config;
use barmon::ui::{self, DisplayKind, Presenter};
use barmon::{SampleEngine, Scheduler};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(version, about = "Sample CPU, memory and network usage for a status bar")]
struct Cli {
    #[arg(short, long, help = "Path to configuration file")]
    config_path: Option<PathBuf>,

    #[arg(long, help = "Print a single status line and exit")]
    once: bool,
}

fn init_logging(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config_path {
        Some(path) => Config::load_config(path)?,
        None => Config::default(),
    };
    init_logging(&config.global.log_level)?;

    let interval = config.global.interval();
    let mut presenter = Presenter::new(config.global.absent);

    if cli.once {
        // Rates need two snapshots one interval apart.
        let mut engine = SampleEngine::new();
        engine.sample();
        tokio::time::sleep(interval).await;
        println!("{}", presenter.render(&engine.sample()));
        return Ok(());
    }

    let (tx, rx) = tokio::sync::mpsc::channel(16);
    let mut ui_handle = match config.global.display {
        DisplayKind::Plain => ui::spawn_plain(rx, presenter),
        DisplayKind::Inline => ui::spawn_inline(rx, presenter),
    };

    let mut scheduler = Scheduler::new(interval);
    scheduler.start(SampleEngine::new(), tx)?;

    tokio::select! {
        res = &mut ui_handle => {
            scheduler.stop().await;
            res??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            scheduler.stop().await;
            ui_handle.await??;
        }
    }

    Ok(())
}
