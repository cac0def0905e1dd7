//! Filled areas: overlapping, stacked, or between two curves.

use crate::error::{PlotError, Result};
use crate::figure::axes::patch_for;
use crate::figure::{Artist, Axes, AxesId, Figure, LegendHandle, Stroke};
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;

use super::{check_alpha, cumulative_rows, edge_stroke, require_series};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AreaMode {
    /// Every series filled from the baseline; later series cover earlier ones.
    #[default]
    Overlay,
    /// Layers on top of each other; boundaries are running sums.
    Stacked,
    /// The region between exactly two series, styled by the first.
    FillBetween,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AreaOptions {
    pub mode: AreaMode,
    /// Lower edge of overlay fills.
    pub baseline: f64,
    pub alpha: f64,
    /// Draw each series' line along its upper boundary.
    pub show_line: bool,
}

impl Default for AreaOptions {
    fn default() -> Self {
        AreaOptions {
            mode: AreaMode::Overlay,
            baseline: 0.0,
            alpha: 0.7,
            show_line: true,
        }
    }
}

impl AreaOptions {
    pub fn stacked() -> Self {
        AreaOptions {
            mode: AreaMode::Stacked,
            ..Default::default()
        }
    }

    pub fn fill_between() -> Self {
        AreaOptions {
            mode: AreaMode::FillBetween,
            ..Default::default()
        }
    }
}

/// Upper boundary of each stacked layer: the running sum of the series' y values.
pub fn stack_series(series: &[SeriesStyle]) -> Result<Vec<Vec<f64>>> {
    let rows: Vec<&[f64]> = series.iter().map(|s| s.y()).collect();
    cumulative_rows(&rows)
}

fn boundary_line(ax: &mut Axes, s: &SeriesStyle, x: &[f64], y: &[f64], label: &str) {
    if !s.has_line() {
        return;
    }
    let stroke = Stroke::solid(s.color, s.line_width).styled(s.line_style).alpha(s.line_alpha);
    ax.add_artist(
        Artist::Line {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            stroke: stroke.clone(),
        },
        s.z_order.map(f64::from),
    );
    ax.add_legend_entry(label, LegendHandle::Line {
        stroke: Some(stroke),
        marker: None,
    });
}

pub fn area_plot(
    series: &[SeriesStyle],
    settings: &GlobalPlotSettings,
    opts: &AreaOptions,
) -> Result<(Figure, AxesId)> {
    require_series(series, "area plot")?;
    check_alpha("alpha", opts.alpha)?;
    if opts.mode == AreaMode::FillBetween && series.len() != 2 {
        return Err(PlotError::count_mismatch("fill-between series", 2, series.len()));
    }

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    // with lines shown the legend labels the lines, otherwise the fills
    let fill_label = |s: &SeriesStyle| if opts.show_line && s.has_line() { String::new() } else { s.label.clone() };
    match opts.mode {
        AreaMode::Overlay => {
            for s in series {
                let x = s.x_or_index();
                let base = vec![opts.baseline; x.len()];
                let patch = patch_for(s, s.color, opts.alpha, edge_stroke(s));
                ax.fill_between(&x, &base, s.y(), patch, &fill_label(s), None);
                if opts.show_line {
                    boundary_line(ax, s, &x, s.y(), &s.label);
                }
            }
            ax.sticky_y.push(opts.baseline);
        }
        AreaMode::Stacked => {
            let tops = stack_series(series)?;
            let x = series[0].x_or_index();
            let mut below = vec![0.0; x.len()];
            for (s, top) in series.iter().zip(&tops) {
                let patch = patch_for(s, s.color, opts.alpha, edge_stroke(s));
                ax.fill_between(&x, &below, top, patch, &fill_label(s), None);
                if opts.show_line {
                    boundary_line(ax, s, &x, top, &s.label);
                }
                below.clone_from(top);
            }
            ax.sticky_y.push(0.0);
        }
        AreaMode::FillBetween => {
            let (upper, lower) = (&series[0], &series[1]);
            let x = upper.x_or_index();
            let patch = patch_for(upper, upper.color, opts.alpha, edge_stroke(upper));
            ax.fill_between(&x, lower.y(), upper.y(), patch, &fill_label(upper), None);
            if opts.show_line {
                for s in [upper, lower] {
                    boundary_line(ax, s, &s.x_or_index(), s.y(), &s.label);
                }
            }
        }
    }
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(y: &[f64], label: &str) -> SeriesStyle {
        SeriesStyle::builder(y.iter().copied()).label(label).build().unwrap()
    }

    #[test]
    fn stacked_boundaries_sum_layers() {
        let tops = stack_series(&[s(&[1.0, 2.0], "a"), s(&[0.5, 0.5], "b")]).unwrap();
        assert_eq!(tops[1], vec![1.5, 2.5]);
    }

    #[test]
    fn fill_between_needs_two_series() {
        let err = area_plot(&[s(&[1.0], "a")], &GlobalPlotSettings::default(), &AreaOptions::fill_between()).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn legend_labels_lines_when_shown() {
        let (fig, id) = area_plot(&[s(&[1.0, 3.0], "a")], &GlobalPlotSettings::default(), &AreaOptions::default()).unwrap();
        let entries = fig[id].legend_entries();
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0].handle, LegendHandle::Line { .. }));

        let opts = AreaOptions {
            show_line: false,
            ..Default::default()
        };
        let (fig, id) = area_plot(&[s(&[1.0, 3.0], "a")], &GlobalPlotSettings::default(), &opts).unwrap();
        assert!(matches!(fig[id].legend_entries()[0].handle, LegendHandle::Patch(_)));
    }
}
