mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use antibiogram::data::store::{MatrixStore, DEFAULT_SOURCE};
use app::AntibiogramApp;
use state::AppState;

/// Antibiotic susceptibility matrix viewer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Dataset to load (.json, .csv or .parquet)
    #[arg(long, env = "ANTIBIOGRAM_DATA", default_value = DEFAULT_SOURCE)]
    data: PathBuf,

    /// Start without loading; open a file from the File menu instead
    #[arg(long)]
    no_autoload: bool,
}

fn main() -> eframe::Result {
    env_logger::init();
    let cli = Cli::parse();

    let store = MatrixStore::new(cli.data);
    if !cli.no_autoload {
        if let Err(e) = store.load() {
            log::warn!("Starting without data: {e}");
        }
    }
    let state = AppState::new(store);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Antibiogram – Susceptibility Matrix",
        options,
        Box::new(|_cc| Ok(Box::new(AntibiogramApp::new(state)))),
    )
}
