use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use antibiogram::data::model::single_line;
use antibiogram::data::resolve::normalize;

use crate::state::{AppState, QueryMode};

// ---------------------------------------------------------------------------
// Left side panel – query inputs and name lists
// ---------------------------------------------------------------------------

/// Render the left search panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search");
    ui.separator();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for mode in QueryMode::ALL {
            if ui.selectable_label(state.mode == mode, mode.label()).clicked() {
                state.set_mode(mode);
            }
        }
    });
    ui.separator();

    // ---- One text field per name ----
    let hint = if state.mode.wants_drugs() {
        "Drug name (exact)"
    } else {
        "Organism name"
    };
    let removable = state.mode.is_comparison() && state.inputs.len() > 2;
    let mut submit = false;
    let mut remove = None;

    for (i, input) in state.inputs.iter_mut().enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            let response = ui.add(
                egui::TextEdit::singleline(input)
                    .hint_text(hint)
                    .desired_width(170.0),
            );
            if response.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if removable && ui.small_button("✕").clicked() {
                remove = Some(i);
            }
        });
    }
    if let Some(i) = remove {
        state.remove_input(i);
    }

    ui.horizontal(|ui: &mut Ui| {
        if state.mode.is_comparison() && ui.button("+ Add").clicked() {
            state.add_input();
        }
        if ui.button("Search").clicked() {
            submit = true;
        }
    });
    if submit {
        state.run_query();
    }

    ui.separator();

    // ---- Clickable organism / drug list ----
    let Some(snapshot) = state.store.current() else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.add(egui::TextEdit::singleline(&mut state.list_filter).hint_text("Filter list"));
    let filter = normalize(state.list_filter.trim());
    let (title, names) = if state.mode.wants_drugs() {
        ("Drugs", snapshot.drugs())
    } else {
        ("Organisms", snapshot.organisms())
    };
    let names: Vec<String> = names
        .into_iter()
        .filter(|n| normalize(n).contains(&filter))
        .map(single_line)
        .collect();

    ui.strong(format!("{title}  ({})", names.len()));
    ScrollArea::vertical()
        .id_salt("name_list")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in &names {
                if ui.selectable_label(false, name).clicked() {
                    state.pick(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.view.is_some(), egui::Button::new("Export table as CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(line) = state.stats_line() {
            ui.label(line);
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open susceptibility matrix")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export table")
        .add_filter("CSV", &["csv"])
        .set_file_name("antibiogram.csv")
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_csv(&path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
