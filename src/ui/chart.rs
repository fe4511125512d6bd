use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use antibiogram::data::model::SensitivityClass;

use crate::color::class_color;

/// Bar chart of organism counts per sensitivity class for one drug.
pub fn class_chart(ui: &mut Ui, counts: &[(SensitivityClass, usize)]) {
    Plot::new("class_counts")
        .legend(Legend::default())
        .height(160.0)
        .show_axes([false, true])
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (class, count)) in counts.iter().enumerate() {
                let color = class_color(*class).unwrap_or(Color32::LIGHT_BLUE);
                let bar = Bar::new(i as f64, *count as f64).width(0.6).fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color).name(class.to_string()));
            }
        });
}
