use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – category filter
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("Nenhum dado carregado.");
        return;
    };

    let categories = dataset.categories();
    let n_selected = state.selected.len();
    let n_total = categories.len();

    ui.strong(format!("Filtre por categoria:  ({n_selected}/{n_total})"));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Todas").clicked() {
            state.select_all();
        }
        if ui.small_button("Nenhuma").clicked() {
            state.select_none();
        }
    });
    if state.selected.is_empty() {
        ui.label(RichText::new("Nenhuma categoria marcada: mostrando todas.").weak());
    }
    ui.separator();

    let mut toggled: Option<String> = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for category in &categories {
                let mut checked = state.selected.contains(category);
                if ui.checkbox(&mut checked, category.as_str()).changed() {
                    toggled = Some(category.clone());
                }
            }
        });

    // Recompute the dashboard once, after the widgets are drawn.
    if let Some(category) = toggled {
        state.toggle_category(&category);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} vídeos carregados, {} visíveis",
                ds.len(),
                view.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Load a local file in place of the downloaded dataset.
///
/// The table goes straight into the state; the process-wide cache keeps the
/// configured dataset.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Abrir dados de vídeos")
        .add_filter("Arquivos suportados", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => state.set_dataset(Arc::new(dataset)),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Erro: {e:#}"));
            }
        }
    }
}
