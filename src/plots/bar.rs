//! Vertical and horizontal bar charts.

use crate::error::{PlotError, Result};
use crate::figure::axes::patch_for;
use crate::figure::{Artist, AxesId, Figure, LegendHandle};
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;
use crate::style::Orientation;

use super::{cumulative_rows, edge_stroke, require_series};

/// How several series share the category positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarMode {
    /// Each series at its own positions, drawn on top of each other.
    #[default]
    Overlay,
    /// Side by side within each category.
    Grouped,
    /// On top of each other; each series starts where the previous one ended.
    Stacked,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarOptions {
    pub mode: BarMode,
    pub orientation: Orientation,
    /// Width of one category slot in data units; grouped bars split it.
    pub bar_width: f64,
    /// Labels for the distinct bar positions, in ascending position order.
    pub categories: Option<Vec<String>>,
}

impl Default for BarOptions {
    fn default() -> Self {
        BarOptions {
            mode: BarMode::Overlay,
            orientation: Orientation::Vertical,
            bar_width: 0.8,
            categories: None,
        }
    }
}

impl BarOptions {
    pub fn grouped() -> Self {
        BarOptions {
            mode: BarMode::Grouped,
            ..Default::default()
        }
    }

    pub fn stacked() -> Self {
        BarOptions {
            mode: BarMode::Stacked,
            ..Default::default()
        }
    }

    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        self
    }

    pub fn categories<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.categories = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

/// One bar: `pos` is the center along the category axis, `lo..hi` the value span.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BarRect {
    pub pos: f64,
    pub width: f64,
    pub lo: f64,
    pub hi: f64,
}

impl BarRect {
    /// Corners in data coordinates for the given orientation.
    pub(crate) fn corners(&self, orientation: Orientation) -> Vec<(f64, f64)> {
        let (a, b) = (self.pos - self.width / 2.0, self.pos + self.width / 2.0);
        let pts = [(a, self.lo), (b, self.lo), (b, self.hi), (a, self.hi)];
        match orientation {
            Orientation::Vertical => pts.to_vec(),
            Orientation::Horizontal => pts.iter().map(|(x, y)| (*y, *x)).collect(),
        }
    }
}

/// Sorted distinct bar positions over all series.
fn distinct_positions(series: &[SeriesStyle]) -> Vec<f64> {
    let mut pos: Vec<f64> = series
        .iter()
        .flat_map(|s| s.x_or_index())
        .filter(|p| p.is_finite())
        .collect();
    pos.sort_by(f64::total_cmp);
    pos.dedup();
    pos
}

/// Bar geometry per series, before styling.
pub(crate) fn layout_bars(series: &[SeriesStyle], mode: BarMode, width: f64) -> Result<Vec<Vec<BarRect>>> {
    match mode {
        BarMode::Overlay => Ok(series
            .iter()
            .map(|s| {
                s.points()
                    .into_iter()
                    .map(|(pos, v)| BarRect {
                        pos,
                        width,
                        lo: 0.0,
                        hi: v,
                    })
                    .collect()
            })
            .collect()),
        BarMode::Grouped => {
            let n = series.len() as f64;
            let w = width / n;
            Ok(series
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let offset = (i as f64 - (n - 1.0) / 2.0) * w;
                    s.points()
                        .into_iter()
                        .map(|(pos, v)| BarRect {
                            pos: pos + offset,
                            width: w,
                            lo: 0.0,
                            hi: v,
                        })
                        .collect()
                })
                .collect())
        }
        BarMode::Stacked => {
            let rows: Vec<&[f64]> = series.iter().map(|s| s.y()).collect();
            let tops = cumulative_rows(&rows)?;
            let positions = series[0].x_or_index();
            Ok(tops
                .iter()
                .enumerate()
                .map(|(k, top)| {
                    positions
                        .iter()
                        .enumerate()
                        .map(|(i, pos)| BarRect {
                            pos: *pos,
                            width,
                            lo: if k == 0 { 0.0 } else { tops[k - 1][i] },
                            hi: top[i],
                        })
                        .collect()
                })
                .collect())
        }
    }
}

/// Draw bars for every series. Bar faces use the series color and hatch, the
/// outline its marker edge color and width.
pub fn bar_plot(
    series: &[SeriesStyle],
    settings: &GlobalPlotSettings,
    opts: &BarOptions,
) -> Result<(Figure, AxesId)> {
    require_series(series, "bar plot")?;
    if !(opts.bar_width > 0.0) {
        return Err(PlotError::setting("bar_width", "must be positive"));
    }
    let positions = distinct_positions(series);
    if let Some(cats) = &opts.categories
        && cats.len() != positions.len()
    {
        return Err(PlotError::count_mismatch("bar category labels", positions.len(), cats.len()));
    }
    let bars = layout_bars(series, opts.mode, opts.bar_width)?;

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    for (s, rects) in series.iter().zip(&bars) {
        let patch = patch_for(s, s.color, s.line_alpha, edge_stroke(s));
        for r in rects.iter().filter(|r| r.hi.is_finite() && r.lo.is_finite()) {
            ax.add_artist(
                Artist::Polygon {
                    points: r.corners(opts.orientation),
                    patch: patch.clone(),
                },
                s.z_order.map(f64::from),
            );
        }
        ax.add_legend_entry(s.label.clone(), LegendHandle::Patch(patch));
    }

    if let Some(cats) = &opts.categories {
        let ticks: Vec<(f64, String)> = positions.iter().copied().zip(cats.iter().cloned()).collect();
        match opts.orientation {
            Orientation::Vertical => ax.set_x_ticks(ticks),
            Orientation::Horizontal => ax.set_y_ticks(ticks),
        }
    }
    match opts.orientation {
        Orientation::Vertical => ax.sticky_y.push(0.0),
        Orientation::Horizontal => ax.sticky_x.push(0.0),
    }
    log::debug!("bar plot: {} series, mode {:?}", series.len(), opts.mode);
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(y: &[f64]) -> SeriesStyle {
        SeriesStyle::builder(y.iter().copied()).build().unwrap()
    }

    #[test]
    fn stacked_tops_are_cumulative() {
        let bars = layout_bars(&[s(&[1.0, 2.0]), s(&[3.0, 4.0])], BarMode::Stacked, 0.8).unwrap();
        assert_eq!(bars[1][0].lo, 1.0);
        assert_eq!(bars[1][0].hi, 4.0);
        assert_eq!(bars[1][1].hi, 6.0);
    }

    #[test]
    fn grouped_bars_split_the_slot() {
        let bars = layout_bars(&[s(&[1.0]), s(&[2.0])], BarMode::Grouped, 0.8).unwrap();
        assert!((bars[0][0].pos + 0.2).abs() < 1e-12);
        assert!((bars[1][0].pos - 0.2).abs() < 1e-12);
        assert!((bars[0][0].width - 0.4).abs() < 1e-12);
    }

    #[test]
    fn horizontal_corners_swap_axes() {
        let r = BarRect {
            pos: 1.0,
            width: 0.5,
            lo: 0.0,
            hi: 3.0,
        };
        assert!(r.corners(Orientation::Horizontal).contains(&(3.0, 1.25)));
    }

    #[test]
    fn category_labels_must_match_positions() {
        let opts = BarOptions::default().categories(["Q1", "Q2"]);
        let err = bar_plot(&[s(&[1.0, 2.0, 3.0])], &GlobalPlotSettings::default(), &opts).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 3, got: 2, .. }));
    }

    #[test]
    fn categories_become_ticks() {
        let opts = BarOptions::grouped().categories(["a", "b"]);
        let (fig, id) = bar_plot(&[s(&[1.0, 2.0]), s(&[2.0, 1.0])], &GlobalPlotSettings::default(), &opts).unwrap();
        let ticks = fig[id].x_tick_override.clone().unwrap();
        assert_eq!(ticks[1], (1.0, "b".to_string()));
        assert_eq!(fig[id].view_limits().1.0, 0.0);
    }
}
