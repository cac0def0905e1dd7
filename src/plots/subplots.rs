//! Empty subplot grids for composite figures, plus panel helpers.

use crate::error::{PlotError, Result};
use crate::figure::{Axes, AxesGrid, Figure, FontSpec, HAlign, VAlign};
use crate::settings::GlobalPlotSettings;
use crate::style::FontWeight;

/// Where panel labels sit, in axes coordinates.
const LABEL_OFFSET: (f64, f64) = (-0.1, 1.05);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubplotOptions {
    pub sharex: bool,
    pub sharey: bool,
    /// Titles in row-major order; may be shorter than the grid.
    pub titles: Vec<String>,
    /// Figure title; falls back to the settings' title.
    pub suptitle: Option<String>,
    pub width_ratios: Option<Vec<f64>>,
    pub height_ratios: Option<Vec<f64>>,
    pub hspace: Option<f64>,
    pub wspace: Option<f64>,
}

/// Link limits across the grid and hide the tick labels shared panels repeat:
/// x labels everywhere but the bottom row, y labels everywhere but the first column.
pub(crate) fn share_axes(fig: &mut Figure, grid: &AxesGrid, sharex: bool, sharey: bool) {
    fig.sharex = sharex;
    fig.sharey = sharey;
    for id in grid.iter() {
        let (row, col) = fig.position(id);
        let ax = &mut fig[id];
        if sharex && row + 1 < grid.rows {
            ax.show_x_ticklabels = false;
        }
        if sharey && col > 0 {
            ax.show_y_ticklabels = false;
        }
    }
}

fn check_ratios(what: &str, ratios: &Option<Vec<f64>>, n: usize) -> Result<Option<Vec<f64>>> {
    match ratios {
        None => Ok(None),
        Some(r) if r.len() != n => Err(PlotError::count_mismatch(what, n, r.len())),
        Some(r) if r.iter().any(|v| !(v.is_finite() && *v > 0.0)) => {
            Err(PlotError::setting(what, "ratios must be positive"))
        }
        Some(r) => Ok(Some(r.clone())),
    }
}

/// A `rows × cols` grid of empty axes, ready for drawing.
pub fn subplots(
    rows: usize,
    cols: usize,
    settings: &GlobalPlotSettings,
    opts: &SubplotOptions,
) -> Result<(Figure, AxesGrid)> {
    if rows == 0 || cols == 0 {
        return Err(PlotError::setting("subplot_layout", "rows and cols must be at least 1"));
    }
    let n = rows * cols;
    if opts.titles.len() > n {
        return Err(PlotError::count_mismatch("subplot titles", n, opts.titles.len()));
    }
    let width_ratios = check_ratios("width ratios", &opts.width_ratios, cols)?;
    let height_ratios = check_ratios("height ratios", &opts.height_ratios, rows)?;

    let (mut fig, grid) = Figure::grid(settings, rows, cols);
    if let Some(w) = width_ratios {
        fig.layout.width_ratios = w;
    }
    if let Some(h) = height_ratios {
        fig.layout.height_ratios = h;
    }
    if opts.hspace.is_some() {
        fig.layout.hspace = opts.hspace;
    }
    if opts.wspace.is_some() {
        fig.layout.wspace = opts.wspace;
    }
    share_axes(&mut fig, &grid, opts.sharex, opts.sharey);

    for (i, id) in grid.iter().enumerate() {
        let ax = &mut fig[id];
        // the settings' title belongs to the figure, panels get their own
        ax.settings.title = opts.titles.get(i).cloned().unwrap_or_default();
        ax.settings.title_size = settings.axis_label_size;
    }
    let title = opts.suptitle.as_deref().unwrap_or(&settings.title);
    if !title.is_empty() {
        let font = FontSpec {
            size: settings.title_size,
            family: settings.title_family.clone(),
            weight: settings.title_weight,
            slant: settings.title_style,
            color: settings.title_color,
        };
        fig.set_suptitle(title, font);
    }
    log::debug!("subplots: {rows}x{cols}, sharex={} sharey={}", opts.sharex, opts.sharey);
    Ok((fig, grid))
}

/// Re-apply `settings` to one panel, optionally hiding its axis labels.
///
/// The panel keeps its own title and title size.
pub fn apply_subplot_formatting(axes: &mut Axes, settings: &GlobalPlotSettings, hide_x_label: bool, hide_y_label: bool) {
    let title = std::mem::take(&mut axes.settings.title);
    let title_size = axes.settings.title_size;
    axes.settings = settings.clone();
    axes.settings.title = title;
    axes.settings.title_size = title_size;
    axes.show_x_label = !hide_x_label;
    axes.show_y_label = !hide_y_label;
}

/// `(a)`, `(b)`, …, `(z)`, `(aa)`, `(ab)`, …
fn panel_label(mut i: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    letters.reverse();
    format!("({})", String::from_utf8_lossy(&letters))
}

/// Bold 12 pt, the usual panel label font.
pub fn panel_label_font() -> FontSpec {
    FontSpec::new(12.0).weight(FontWeight::Bold)
}

/// Tag each panel above its top-left corner, with `(a)`, `(b)`, … unless `labels` is given.
pub fn add_subplot_labels(fig: &mut Figure, labels: Option<&[String]>, font: &FontSpec) -> Result<()> {
    let ids: Vec<_> = fig.axes_ids().collect();
    if let Some(l) = labels
        && l.len() > ids.len()
    {
        return Err(PlotError::count_mismatch("subplot labels", ids.len(), l.len()));
    }
    for (i, id) in ids.into_iter().enumerate() {
        let text = match labels {
            Some(l) => match l.get(i) {
                Some(t) => t.clone(),
                None => break,
            },
            None => panel_label(i),
        };
        let (x, y) = LABEL_OFFSET;
        fig[id].text_axes(x, y, text, font.clone(), HAlign::Right, VAlign::Top);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Artist;

    #[test]
    fn panel_labels_run_past_z() {
        assert_eq!(panel_label(0), "(a)");
        assert_eq!(panel_label(25), "(z)");
        assert_eq!(panel_label(26), "(aa)");
        assert_eq!(panel_label(27), "(ab)");
    }

    #[test]
    fn shared_axes_hide_inner_tick_labels() {
        let opts = SubplotOptions {
            sharex: true,
            sharey: true,
            ..Default::default()
        };
        let (fig, grid) = subplots(2, 2, &GlobalPlotSettings::default(), &opts).unwrap();
        let ax = |r, c| &fig[grid.get(r, c).unwrap()];
        assert!(!ax(0, 0).show_x_ticklabels && ax(0, 0).show_y_ticklabels);
        assert!(ax(1, 0).show_x_ticklabels && ax(1, 0).show_y_ticklabels);
        assert!(ax(1, 1).show_x_ticklabels && !ax(1, 1).show_y_ticklabels);
    }

    #[test]
    fn settings_title_becomes_the_suptitle() {
        let settings = GlobalPlotSettings {
            title: "Overview".into(),
            ..Default::default()
        };
        let opts = SubplotOptions {
            titles: vec!["left".into()],
            ..Default::default()
        };
        let (fig, grid) = subplots(1, 2, &settings, &opts).unwrap();
        assert_eq!(fig.suptitle.as_ref().unwrap().text, "Overview");
        assert_eq!(fig[grid.get(0, 0).unwrap()].settings.title, "left");
        assert_eq!(fig[grid.get(0, 1).unwrap()].settings.title, "");
    }

    #[test]
    fn ratio_lengths_are_checked() {
        let opts = SubplotOptions {
            width_ratios: Some(vec![2.0, 1.0, 1.0]),
            ..Default::default()
        };
        let err = subplots(1, 2, &GlobalPlotSettings::default(), &opts).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 3, .. }));
    }

    #[test]
    fn every_panel_gets_a_label() {
        let (mut fig, _) = subplots(2, 2, &GlobalPlotSettings::default(), &SubplotOptions::default()).unwrap();
        add_subplot_labels(&mut fig, None, &panel_label_font()).unwrap();
        let texts: Vec<String> = fig
            .all_axes()
            .iter()
            .flat_map(|ax| ax.artists())
            .filter_map(|l| match &l.artist {
                Artist::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["(a)", "(b)", "(c)", "(d)"]);
    }

    #[test]
    fn formatting_keeps_the_panel_title() {
        let (mut fig, grid) = subplots(1, 1, &GlobalPlotSettings::default(), &SubplotOptions {
            titles: vec!["kept".into()],
            ..Default::default()
        })
        .unwrap();
        let settings = GlobalPlotSettings {
            x_label: "time".into(),
            ..Default::default()
        };
        apply_subplot_formatting(&mut fig[grid.first()], &settings, true, false);
        let ax = &fig[grid.first()];
        assert_eq!(ax.settings.title, "kept");
        assert_eq!(ax.settings.x_label, "time");
        assert!(!ax.show_x_label);
    }
}
