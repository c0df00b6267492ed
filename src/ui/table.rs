use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::VideoTable;
use crate::ui::dashboard::format_thousands;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the filtered rows.
pub fn preview_table(ui: &mut Ui, table: &VideoTable) {
    let records = table.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder().at_least(200.0))
        .header(20.0, |mut header| {
            for name in ["category", "views", "likes", "title"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let video = &records[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(&video.category);
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(format_thousands(video.views.trunc() as i64));
                });
                row.col(|ui: &mut Ui| {
                    ui.monospace(format_thousands(video.likes.trunc() as i64));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(video.title.as_deref().unwrap_or("<null>"));
                });
            });
        });
}
