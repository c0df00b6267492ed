use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot, uniform_grid_spacer};

use crate::color::{Ramp, generate_palette};
use crate::data::aggregate::{CategoryCount, TitleViews};

const BAR_WIDTH: f64 = 0.7;
const MAX_LABEL_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Horizontal bar charts (central panel)
// ---------------------------------------------------------------------------

/// Top titles by summed views, largest bar on top.
pub fn top_titles_chart(ui: &mut Ui, top: &[TitleViews]) {
    let bars = top
        .iter()
        .map(|entry| (entry.title.as_str(), entry.views))
        .collect::<Vec<_>>();
    horizontal_bars(
        ui,
        "top_titles_chart",
        &bars,
        Ramp::Viridis,
        "Total de Visualizações",
        "Título do Vídeo",
    );
}

/// Videos per category, most frequent on top.
pub fn category_count_chart(ui: &mut Ui, counts: &[CategoryCount]) {
    let bars = counts
        .iter()
        .map(|entry| (entry.category.as_str(), entry.videos as f64))
        .collect::<Vec<_>>();
    horizontal_bars(
        ui,
        "category_count_chart",
        &bars,
        Ramp::Plasma,
        "Número de Vídeos",
        "Categoria",
    );
}

/// Draw `(label, value)` pairs as horizontal bars, first pair at the top.
fn horizontal_bars(
    ui: &mut Ui,
    id: &str,
    bars: &[(&str, f64)],
    ramp: Ramp,
    x_label: &str,
    y_label: &str,
) {
    if bars.is_empty() {
        ui.label("Sem dados para a seleção atual.");
        return;
    }

    let n = bars.len();
    let colors = generate_palette(ramp, n);

    // Plot y grows upwards, so bar i sits at n - 1 - i.
    let chart_bars: Vec<Bar> = bars
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, value), color))| {
            Bar::new((n - 1 - i) as f64, *value)
                .name(*label)
                .fill(color)
                .width(BAR_WIDTH)
        })
        .collect();

    let axis_labels: Vec<String> = bars.iter().rev().map(|(label, _)| short_label(label)).collect();

    Plot::new(id)
        .height(28.0 * n as f32 + 60.0)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark, _range| axis_label(&axis_labels, mark.value))
        .include_x(0.0)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars).horizontal());
        });
}

/// Label for a y grid mark: only integral positions inside the range get one.
fn axis_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Truncate long titles so the axis stays readable.
fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_labels_only_on_integer_marks() {
        let labels = vec!["bottom".to_string(), "top".to_string()];
        assert_eq!(axis_label(&labels, 0.0), "bottom");
        assert_eq!(axis_label(&labels, 1.0), "top");
        assert_eq!(axis_label(&labels, 0.5), "");
        assert_eq!(axis_label(&labels, -1.0), "");
        assert_eq!(axis_label(&labels, 7.0), "");
    }

    #[test]
    fn long_titles_are_shortened() {
        assert_eq!(short_label("short"), "short");
        let long = "ç".repeat(60);
        let shortened = short_label(&long);
        assert_eq!(shortened.chars().count(), MAX_LABEL_CHARS);
        assert!(shortened.ends_with('…'));
    }
}
