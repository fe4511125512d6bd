use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use antibiogram::data::model::SensitivityClass;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_color(hue, 0.55, 0.60)
        })
        .collect()
}

fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Fixed colour for the well-known classes; `None` for [`SensitivityClass::Other`].
pub fn class_color(class: SensitivityClass) -> Option<Color32> {
    match class {
        SensitivityClass::Susceptible => Some(hsl_color(130.0, 0.60, 0.45)),
        SensitivityClass::Intermediate => Some(hsl_color(40.0, 0.90, 0.50)),
        SensitivityClass::Resistant => Some(hsl_color(0.0, 0.75, 0.55)),
        SensitivityClass::Unknown => Some(Color32::GRAY),
        SensitivityClass::Other => None,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: sensitivity label → Color32
// ---------------------------------------------------------------------------

/// Colours for every label present in a dataset. Labels outside the S/I/R
/// vocabulary get distinct palette hues.
#[derive(Debug, Clone, Default)]
pub struct SensitivityColors {
    mapping: BTreeMap<String, Color32>,
}

impl SensitivityColors {
    pub fn new(labels: &BTreeSet<String>) -> Self {
        let others: Vec<&String> = labels
            .iter()
            .filter(|l| SensitivityClass::classify(l) == SensitivityClass::Other)
            .collect();
        let palette = generate_palette(others.len());

        let mut mapping: BTreeMap<String, Color32> = others
            .into_iter()
            .zip(palette)
            .map(|(l, c)| (l.clone(), c))
            .collect();
        for label in labels {
            if let Some(c) = class_color(SensitivityClass::classify(label)) {
                mapping.insert(label.clone(), c);
            }
        }
        SensitivityColors { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .or_else(|| class_color(SensitivityClass::classify(label)))
            .unwrap_or(Color32::GRAY)
    }

    /// Legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(l, c)| (l.clone(), *c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn known_classes_share_fixed_colours() {
        let labels: BTreeSet<String> = ["S", "+", "R", "footnote"].iter().map(|s| s.to_string()).collect();
        let colors = SensitivityColors::new(&labels);
        assert_eq!(colors.color_for("S"), colors.color_for("+"));
        assert_ne!(colors.color_for("S"), colors.color_for("R"));
        assert_eq!(colors.legend_entries().len(), 4);
        // Labels never seen fall back to their class colour.
        assert_eq!(colors.color_for("I"), colors.color_for("±"));
    }
}
