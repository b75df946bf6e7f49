mod app;
mod classify;
mod config;
mod logging;
mod model;
mod net;
mod notam;
mod regions;
mod runtime;
mod ui;
mod view;

use anyhow::Result;
use std::sync::mpsc;

use app::App;
use config::parse_args;
use logging::init as init_logging;
use net::spawn_fetcher;
use notam::NotamStatus;
use runtime::{init_terminal, restore_terminal, run_app};
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let config = parse_args()?;
    let _log_guard = init_logging(&config);
    info!("skywatch-tui starting");
    debug!("config path: {}", config.config_path.display());

    let (tx, rx) = mpsc::channel();
    let (ctrl_tx, ctrl_rx) = mpsc::channel();

    spawn_fetcher(
        config.regions.clone(),
        config.api_base.clone(),
        config.update_interval,
        config.request_timeout,
        config.credentials(),
        tx,
        ctrl_rx,
    );

    let notam = NotamStatus::from_key(&config.notam_api_key);
    let app = App::new(config.regions.clone(), notam);

    let mut terminal = init_terminal()?;
    let res = run_app(&mut terminal, app, rx, ctrl_tx);
    restore_terminal(&mut terminal)?;

    if let Err(err) = res {
        warn!("runtime error: {err}");
        eprintln!("{err}");
    }

    info!("skywatch-tui exited");
    Ok(())
}
