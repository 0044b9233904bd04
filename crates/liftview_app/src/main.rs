// SPDX-License-Identifier: MIT OR Apache-2.0
//! `LiftView` - elevator scene viewer
//!
//! Drives one elevator car through a ten-storey building:
//! - Floor-button panel with manual door controls
//! - Timed door slides and eased floor-to-floor travel
//! - Rider characters and a control-panel image loaded off-thread
//! - Toy train circling the building
//! - Versioned offline cache for the page assets
//!
//! ## Usage
//!
//! ```text
//! liftview [SETTINGS]          run the demo script from SETTINGS (default liftview.ron)
//! liftview --init [SETTINGS]   write default settings and exit
//! ```

mod app;
mod assets;
mod camera;
mod host_loop;
mod offline_cache;
mod scene;
mod settings;
mod trace;
mod train;

use app::{App, AppError};
use settings::{AppSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("liftview_app=debug,liftview_sequencer=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiftView v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args().skip(1).collect()) {
        tracing::error!("LiftView crashed: {e}");
        std::process::exit(1);
    }
}

fn run(args: Vec<String>) -> Result<(), AppError> {
    let init = args.iter().any(|a| a == "--init");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);

    if init {
        AppSettings::default().save(&path)?;
        tracing::info!("Wrote default settings to {}", path.display());
        return Ok(());
    }

    let settings = AppSettings::load_or_default(&path)?;
    let mut app = App::new(settings)?;

    match app.prepare_offline_cache() {
        Ok(cache) => tracing::info!(
            "Offline cache {} ready with {} entries",
            cache.cache_name(),
            cache.storage().len_of(cache.cache_name())
        ),
        Err(e) => tracing::warn!("Offline cache not installed: {e}"),
    }

    let summary = app.run()?;
    tracing::info!(
        "Finished after {} frames ({:.0} ms): floor {}, button {:?}, {} trips{}",
        summary.frames,
        summary.elapsed_ms,
        summary.state.current_floor,
        summary.selected_floor,
        summary.arrivals,
        if summary.timed_out { ", timed out" } else { "" }
    );

    Ok(())
}
