use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::regression::{
    MAX_VIEWS_INPUT, MIN_ROWS_FOR_FIT, PredictorOutcome, VIEWS_INPUT_STEP, step_views_input,
};
use crate::state::AppState;
use crate::ui::{plot, table};

const LOAD_ERROR_MESSAGE: &str =
    "Erro ao carregar os dados. Verifique sua chave API do Kaggle e a conexão.";

/// What the user asked for from the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    None,
    RetryLoad,
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render metrics, charts and the likes predictor for the current selection.
///
/// A failed load replaces the whole panel with the error; nothing else is
/// drawn in that case.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) -> DashboardAction {
    if let Some(err) = &state.load_error {
        return load_error_panel(ui, err);
    }

    let Some(view) = state.view.as_ref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Carregando dados…");
        });
        return DashboardAction::None;
    };

    let mut predict_clicked = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new("📊 Dashboard de Análise de Tendências do YouTube").size(26.0));
            ui.add_space(8.0);

            // ---- Metrics ----
            ui.heading("Métricas Gerais (para a seleção atual)");
            ui.columns(3, |cols| {
                metric(
                    &mut cols[0],
                    "Total de Vídeos",
                    format_thousands(view.summary.video_count as i64),
                );
                metric(
                    &mut cols[1],
                    "Total de Visualizações",
                    format_thousands(view.summary.total_views.trunc() as i64),
                );
                metric(
                    &mut cols[2],
                    "Total de Likes",
                    format_thousands(view.summary.total_likes.trunc() as i64),
                );
            });
            ui.separator();

            // ---- Charts ----
            ui.heading("Análises Visuais Interativas");
            ui.add_space(4.0);
            ui.strong("🏆 Top 10 Vídeos por Visualizações");
            plot::top_titles_chart(ui, &view.top_titles);
            ui.add_space(8.0);
            ui.strong("📊 Contagem de Vídeos por Categoria");
            plot::category_count_chart(ui, &view.category_counts);
            ui.separator();

            // ---- Regression ----
            ui.heading("🤖 Previsão de Likes (Regressão Linear)");
            match &view.predictor {
                PredictorOutcome::InsufficientData { rows } => {
                    ui.label(format!(
                        "Selecione mais categorias ou dados para treinar o modelo \
                         (são necessários mais de {MIN_ROWS_FOR_FIT} vídeos; a seleção atual tem {rows})."
                    ));
                }
                PredictorOutcome::Trained(predictor) => {
                    metric(ui, "Erro Médio (RMSE)", format!("{:.2}", predictor.rmse()));
                    ui.label(
                        RichText::new(format!(
                            "likes = {:.6} × views + {:.2}  (treino: {}, teste: {})",
                            predictor.coefficient(),
                            predictor.intercept(),
                            predictor.train_rows(),
                            predictor.test_rows()
                        ))
                        .small()
                        .weak(),
                    );
                    ui.add_space(4.0);

                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("Número de visualizações:");
                        if ui.small_button("−").clicked() {
                            state.views_input = step_views_input(state.views_input, false);
                        }
                        ui.add(
                            egui::DragValue::new(&mut state.views_input)
                                .speed(VIEWS_INPUT_STEP as f64)
                                .range(0..=MAX_VIEWS_INPUT),
                        );
                        if ui.small_button("+").clicked() {
                            state.views_input = step_views_input(state.views_input, true);
                        }
                    });
                    if ui.button("Prevêr Likes").clicked() {
                        predict_clicked = true;
                    }
                    if let Some(likes) = state.predicted_likes {
                        ui.label(
                            RichText::new(format!(
                                "Likes previstos para {} visualizações: {}",
                                format_thousands(i64::try_from(state.views_input).unwrap_or(i64::MAX)),
                                format_thousands(likes)
                            ))
                            .strong()
                            .color(Color32::from_rgb(0x2e, 0x9e, 0x4f)),
                        );
                    }
                }
            }
            ui.separator();

            // ---- Data preview ----
            egui::CollapsingHeader::new(format!(
                "Dados filtrados ({} linhas)",
                format_thousands(view.filtered.len() as i64)
            ))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                table::preview_table(ui, &view.filtered);
            });
        });

    if predict_clicked {
        state.predict();
    }
    DashboardAction::None
}

fn load_error_panel(ui: &mut Ui, err: &crate::data::DataUnavailable) -> DashboardAction {
    let mut action = DashboardAction::None;
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(LOAD_ERROR_MESSAGE).color(Color32::RED).strong());
        ui.add_space(6.0);
        egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
            ui.monospace(format!("{} failed", err.stage));
            for cause in err.chain() {
                ui.monospace(format!("  caused by: {cause}"));
            }
        });
        ui.add_space(6.0);
        if ui.button("Tentar novamente").clicked() {
            action = DashboardAction::RetryLoad;
        }
    });
    action
}

/// A small caption above a large value.
fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

/// Format an integer with `,` as thousands separator: `1234567` → `1,234,567`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-45_000), "-45,000");
        assert_eq!(format_thousands(i64::MIN), "-9,223,372,036,854,775,808");
    }
}
