use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::ui::chart;

// ---------------------------------------------------------------------------
// Result table (central panel)
// ---------------------------------------------------------------------------

/// Render the current query result in the central panel.
pub fn results(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.store.is_loaded() {
                ui.heading("Search for an organism or a drug");
            } else {
                ui.heading("Open a dataset to begin  (File → Open…)");
            }
        });
        return;
    };

    ui.heading(view.title());
    legend(ui, state);

    if let Some(counts) = view.class_counts() {
        chart::class_chart(ui, &counts);
    }
    ui.separator();

    let table = view.table();
    let colors = &state.colors;

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(180.0))
            .columns(
                Column::auto().at_least(70.0),
                table.header.len().saturating_sub(1),
            )
            .header(22.0, |mut header| {
                for title in &table.header {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(20.0, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for (i, cell) in cells.iter().enumerate() {
                        row.col(|ui: &mut Ui| {
                            if i == 0 {
                                ui.label(cell);
                            } else {
                                ui.label(RichText::new(cell).strong().color(colors.color_for(cell)));
                            }
                        });
                    }
                });
            });
    });
}

/// Colour key for the labels in the loaded dataset.
fn legend(ui: &mut Ui, state: &AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in state.colors.legend_entries() {
            ui.label(RichText::new(format!("■ {label}")).color(color));
        }
    });
}
