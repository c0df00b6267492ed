use eframe::egui;

use crate::config::Config;
use crate::data::{cache, source};
use crate::state::AppState;
use crate::ui::dashboard::{self, DashboardAction};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TrendsApp {
    pub config: Config,
    pub state: AppState,
}

impl TrendsApp {
    /// Create the app and load the dataset (from the cache after the first
    /// success).
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            config,
            state: AppState::default(),
        };
        app.load();
        app
    }

    fn load(&mut self) {
        let config = &self.config;
        if !cache::shared().is_loaded() {
            match &config.csv {
                Some(path) => log::info!("Loading dataset from {}", path.display()),
                None => log::info!("Loading dataset {}", config.dataset),
            }
        }
        match cache::shared().get_or_load(|| source::load_dataset(config)) {
            Ok(dataset) => self.state.set_dataset(dataset),
            Err(err) => self.state.set_load_error(err),
        }
    }
}

impl eframe::App for TrendsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters (hidden when loading failed) ----
        if self.state.load_error.is_none() {
            egui::SidePanel::left("filter_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: metrics, charts, predictor ----
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| dashboard::central_panel(ui, &mut self.state))
            .inner;

        if action == DashboardAction::RetryLoad {
            log::info!("Retrying dataset load");
            self.load();
        }
    }
}
