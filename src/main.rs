mod app;
mod color;
mod config;
mod data;
mod regression;
mod state;
mod ui;

use app::TrendsApp;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();
    let config = Config::parse();
    log::debug!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "YouTube Trends – Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(TrendsApp::new(config)))),
    )
}
