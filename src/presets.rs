//! Named starting points for [`GlobalPlotSettings`].
//!
//! The registry is built once and never handed out by reference: [`preset`]
//! returns an owned copy, so callers can customise freely.

use std::sync::OnceLock;

use crate::error::{PlotError, Result};
use crate::settings::{GlobalPlotSettings, PlotSettingsBuilder};

const PRESET_NAMES: [&str; 5] = [
    "default",
    "publication",
    "presentation",
    "nature_style",
    "science_style",
];

fn build_preset(name: &str) -> Result<GlobalPlotSettings> {
    let b = PlotSettingsBuilder::new().description(format!("{name} preset"));
    let b = match name {
        "default" => PlotSettingsBuilder::new(),
        "publication" => b
            .figure_width(6.0)
            .figure_height(4.5)
            .dpi(300u32)
            .tick_label_size(10.0)
            .axis_label_size(12.0)
            .title_size(14.0)
            .grid_alpha(0.2),
        "presentation" => b
            .figure_width(10.0)
            .figure_height(7.5)
            .dpi(150u32)
            .tick_label_size(14.0)
            .axis_label_size(16.0)
            .title_size(18.0),
        // Nature single column
        "nature_style" => b
            .figure_width(3.5)
            .figure_height(2.625)
            .dpi(300u32)
            .tick_label_size(7.0)
            .axis_label_size(8.0)
            .title_size(8.0)
            .legend_font_size(7.0)
            .show_grid(false)
            .despine(),
        // Science single column
        "science_style" => b
            .figure_width(3.3)
            .figure_height(2.5)
            .dpi(300u32)
            .tick_label_size(6.0)
            .axis_label_size(7.0)
            .title_size(8.0)
            .legend_font_size(6.0)
            .show_grid(false)
            .despine(),
        other => return Err(unknown(other)),
    };
    b.build()
}

fn unknown(name: &str) -> PlotError {
    PlotError::UnknownPreset {
        name: name.to_string(),
        available: preset_names().into_iter().map(String::from).collect(),
    }
}

fn registry() -> &'static [(&'static str, GlobalPlotSettings)] {
    static REGISTRY: OnceLock<Vec<(&'static str, GlobalPlotSettings)>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        PRESET_NAMES
            .iter()
            .filter_map(|name| match build_preset(name) {
                Ok(s) => Some((*name, s)),
                Err(e) => {
                    log::error!("preset '{name}' failed to build: {e}");
                    None
                }
            })
            .collect()
    })
}

/// Names of all registered presets, in a stable order.
pub fn preset_names() -> Vec<&'static str> {
    PRESET_NAMES.to_vec()
}

/// An owned copy of the named preset.
pub fn preset(name: &str) -> Result<GlobalPlotSettings> {
    registry()
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, s)| s.clone())
        .ok_or_else(|| unknown(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in preset_names() {
            assert!(preset(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn journal_styles_hide_top_and_right() {
        let n = preset("nature_style").unwrap();
        assert!(!n.show_top_spine && !n.show_right_spine && !n.show_grid);
        assert_eq!(n.figure_width, 3.5);
        assert_eq!(n.x_tick_label_size, 7.0);
    }

    #[test]
    fn unknown_lists_available() {
        let err = preset("poster").unwrap_err().to_string();
        assert!(err.contains("poster"));
        assert!(err.contains("science_style"));
    }

    #[test]
    fn copies_are_independent() {
        let mut a = preset("publication").unwrap();
        a.title = "changed".into();
        a.dpi = 72;
        let b = preset("publication").unwrap();
        assert_eq!(b.title, "");
        assert_eq!(b.dpi, 300);
    }
}
