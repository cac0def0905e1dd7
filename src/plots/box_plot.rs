//! Box-and-whisker plots, simple or grouped.

use crate::color::{Color, cycle_color};
use crate::error::{PlotError, Result};
use crate::figure::axes::plain_patch;
use crate::figure::{Artist, Axes, AxesId, Figure, LegendHandle, MarkerStyle, Stroke};
use crate::settings::GlobalPlotSettings;
use crate::stats::{BoxStats, box_stats};
use crate::style::{GridAxis, LineStyle, Marker, Orientation};

const WHISKER_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);
const MEDIAN_COLOR: Color = Color::rgb(0xCC, 0x00, 0x00);
const MEAN_COLOR: Color = Color::rgb(0x00, 0x80, 0x00);
const FLIER_COLOR: Color = Color::rgb(0xFF, 0x00, 0x00);
const BOX_ALPHA: f64 = 0.7;
const BOX_GAP: f64 = 0.2;
const GROUP_GAP: f64 = 1.0;

/// Samples to summarise: one box per sample, or groups of boxes.
#[derive(Clone, Debug, PartialEq)]
pub enum BoxData {
    Simple(Vec<Vec<f64>>),
    /// Every group holds the same number of samples.
    Grouped(Vec<Vec<Vec<f64>>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoxOptions {
    /// One color per box (simple) or per box position within a group (grouped).
    pub colors: Option<Vec<Color>>,
    pub orientation: Orientation,
    pub show_means: bool,
    pub show_outliers: bool,
    pub notch: bool,
    pub box_width: f64,
    /// Whiskers reach the furthest point within this many IQRs of the box.
    pub whisker_range: f64,
    /// Tick labels for the groups of a grouped plot.
    pub group_labels: Option<Vec<String>>,
    /// Fill boxes with their color; outlines only otherwise.
    pub filled: bool,
}

impl Default for BoxOptions {
    fn default() -> Self {
        BoxOptions {
            colors: None,
            orientation: Orientation::Vertical,
            show_means: true,
            show_outliers: true,
            notch: false,
            box_width: 0.5,
            whisker_range: 1.5,
            group_labels: None,
            filled: true,
        }
    }
}

/// `(position, value)` to data coordinates.
fn at(o: Orientation, pos: f64, v: f64) -> (f64, f64) {
    match o {
        Orientation::Vertical => (pos, v),
        Orientation::Horizontal => (v, pos),
    }
}

fn outline(o: Orientation, pos: f64, hw: f64, b: &BoxStats, notch: bool) -> Vec<(f64, f64)> {
    let (l, r) = (pos - hw, pos + hw);
    let pts = if notch {
        vec![
            (l, b.q1),
            (r, b.q1),
            (r, b.notch_low),
            (pos + hw / 2.0, b.median),
            (r, b.notch_high),
            (r, b.q3),
            (l, b.q3),
            (l, b.notch_high),
            (pos - hw / 2.0, b.median),
            (l, b.notch_low),
        ]
    } else {
        vec![(l, b.q1), (r, b.q1), (r, b.q3), (l, b.q3)]
    };
    pts.into_iter().map(|(p, v)| at(o, p, v)).collect()
}

fn draw_box(ax: &mut Axes, pos: f64, stats: &BoxStats, face: Color, opts: &BoxOptions) {
    let o = opts.orientation;
    let hw = opts.box_width / 2.0;
    let face_alpha = if opts.filled { BOX_ALPHA } else { 0.0 };
    let patch = plain_patch(face, face_alpha, Some((Color::BLACK, 1.0)));
    ax.add_artist(
        Artist::Polygon {
            points: outline(o, pos, hw, stats, opts.notch),
            patch,
        },
        None,
    );

    let whisker = Stroke::solid(WHISKER_COLOR, 1.5).styled(LineStyle::Dashed);
    let cap = Stroke::solid(WHISKER_COLOR, 1.5);
    for (from, to) in [(stats.q1, stats.whisker_low), (stats.q3, stats.whisker_high)] {
        ax.add_artist(
            Artist::Line {
                points: vec![at(o, pos, from), at(o, pos, to)],
                stroke: whisker.clone(),
            },
            None,
        );
        ax.add_artist(
            Artist::Line {
                points: vec![at(o, pos - hw / 2.0, to), at(o, pos + hw / 2.0, to)],
                stroke: cap.clone(),
            },
            None,
        );
    }
    let mhw = if opts.notch { hw / 2.0 } else { hw };
    ax.add_artist(
        Artist::Line {
            points: vec![at(o, pos - mhw, stats.median), at(o, pos + mhw, stats.median)],
            stroke: Stroke::solid(MEDIAN_COLOR, 2.0),
        },
        None,
    );
    if opts.show_means {
        ax.add_artist(
            Artist::Markers {
                points: vec![at(o, pos, stats.mean)],
                style: MarkerStyle {
                    marker: Marker::Diamond,
                    size: 6.0,
                    face: MEAN_COLOR,
                    edge: MEAN_COLOR,
                    edge_width: 1.0,
                    alpha: 1.0,
                },
            },
            None,
        );
    }
    if opts.show_outliers && !stats.fliers.is_empty() {
        ax.add_artist(
            Artist::Markers {
                points: stats.fliers.iter().map(|v| at(o, pos, *v)).collect(),
                style: MarkerStyle {
                    marker: Marker::Circle,
                    size: 4.0,
                    face: FLIER_COLOR,
                    edge: FLIER_COLOR,
                    edge_width: 1.0,
                    alpha: 0.5,
                },
            },
            None,
        );
    }
}

fn check_count(what: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(PlotError::count_mismatch(what, expected, got));
    }
    Ok(())
}

/// Draw one box per sample (or per sample within each group).
///
/// `labels` name the boxes of a simple plot, or the box positions within a
/// group (shown in the legend) for a grouped plot.
pub fn box_plot<S: AsRef<str>>(
    data: &BoxData,
    labels: &[S],
    settings: &GlobalPlotSettings,
    opts: &BoxOptions,
) -> Result<(Figure, AxesId)> {
    if !(opts.box_width > 0.0) {
        return Err(PlotError::setting("box_width", "must be positive"));
    }
    if !(opts.whisker_range >= 0.0) {
        return Err(PlotError::setting("whisker_range", "must not be negative"));
    }
    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    let o = opts.orientation;
    let positions: Vec<f64>;
    let ticks: Vec<(f64, String)>;

    match data {
        BoxData::Simple(samples) => {
            if samples.is_empty() {
                return Err(PlotError::Empty("box plot needs at least one sample".into()));
            }
            check_count("box labels", samples.len(), labels.len())?;
            if let Some(c) = &opts.colors {
                check_count("box colors", samples.len(), c.len())?;
            }
            let stats = samples
                .iter()
                .map(|s| box_stats(s, opts.whisker_range))
                .collect::<Result<Vec<_>>>()?;
            positions = (1..=samples.len()).map(|i| i as f64).collect();
            for (i, (pos, b)) in positions.iter().zip(&stats).enumerate() {
                let face = opts.colors.as_ref().map_or(cycle_color(0), |c| c[i]);
                draw_box(ax, *pos, b, face, opts);
            }
            ticks = positions
                .iter()
                .zip(labels)
                .map(|(p, l)| (*p, l.as_ref().to_string()))
                .collect();
        }
        BoxData::Grouped(groups) => {
            let per_group = groups.first().map_or(0, Vec::len);
            if per_group == 0 {
                return Err(PlotError::Empty("grouped box plot needs at least one sample per group".into()));
            }
            for g in groups {
                check_count("boxes per group", per_group, g.len())?;
            }
            check_count("box labels", per_group, labels.len())?;
            if let Some(c) = &opts.colors {
                check_count("box colors", per_group, c.len())?;
            }
            if let Some(gl) = &opts.group_labels {
                check_count("group labels", groups.len(), gl.len())?;
            }
            let step = opts.box_width + BOX_GAP;
            let group_span = per_group as f64 * step + GROUP_GAP;
            let colors: Vec<Color> = match &opts.colors {
                Some(c) => c.clone(),
                None => (0..per_group).map(cycle_color).collect(),
            };
            let mut pos_all = Vec::new();
            let mut centers = Vec::new();
            for (gi, group) in groups.iter().enumerate() {
                let start = gi as f64 * group_span;
                for (j, sample) in group.iter().enumerate() {
                    let pos = start + j as f64 * step;
                    draw_box(ax, pos, &box_stats(sample, opts.whisker_range)?, colors[j], opts);
                    pos_all.push(pos);
                }
                centers.push(start + (per_group as f64 - 1.0) * step / 2.0);
            }
            for (label, color) in labels.iter().zip(&colors) {
                ax.add_legend_entry(
                    label.as_ref(),
                    LegendHandle::Patch(plain_patch(*color, BOX_ALPHA, None)),
                );
            }
            ticks = match &opts.group_labels {
                Some(gl) => centers.into_iter().zip(gl.iter().cloned()).collect(),
                None => Vec::new(),
            };
            positions = pos_all;
        }
    }

    let pad = opts.box_width.max(0.5);
    let lo = positions.iter().copied().fold(f64::INFINITY, f64::min) - pad;
    let hi = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max) + pad;
    match o {
        Orientation::Vertical => {
            if ax.settings.x_limits.is_none() {
                ax.set_xlim(lo, hi);
            }
            if !ticks.is_empty() {
                ax.set_x_ticks(ticks);
            }
            ax.settings.grid_axis = GridAxis::Y;
        }
        Orientation::Horizontal => {
            if ax.settings.y_limits.is_none() {
                ax.set_ylim(lo, hi);
            }
            if !ticks.is_empty() {
                ax.set_y_ticks(ticks);
            }
            ax.settings.grid_axis = GridAxis::X;
        }
    }
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine() -> Vec<f64> {
        (1..=9).map(f64::from).collect()
    }

    #[test]
    fn simple_boxes_get_label_ticks() {
        let data = BoxData::Simple(vec![nine(), nine()]);
        let (fig, id) = box_plot(&data, &["a", "b"], &GlobalPlotSettings::default(), &BoxOptions::default()).unwrap();
        let ax = &fig[id];
        assert_eq!(ax.x_tick_override.as_ref().unwrap()[1], (2.0, "b".to_string()));
        assert_eq!(ax.view_limits().0, (0.5, 2.5));
    }

    #[test]
    fn label_count_must_match() {
        let data = BoxData::Simple(vec![nine()]);
        let err = box_plot(&data, &["a", "b"], &GlobalPlotSettings::default(), &BoxOptions::default()).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 1, got: 2, .. }));
    }

    #[test]
    fn grouped_colors_are_checked_per_group() {
        let data = BoxData::Grouped(vec![vec![nine(), nine()], vec![nine(), nine()]]);
        let opts = BoxOptions {
            colors: Some(vec![Color::BLACK]),
            ..Default::default()
        };
        let err = box_plot(&data, &["m", "f"], &GlobalPlotSettings::default(), &opts).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn grouped_plot_has_legend_and_group_ticks() {
        let data = BoxData::Grouped(vec![vec![nine(), nine()], vec![nine(), nine()]]);
        let opts = BoxOptions {
            group_labels: Some(vec!["ctrl".into(), "treat".into()]),
            orientation: Orientation::Horizontal,
            ..Default::default()
        };
        let (fig, id) = box_plot(&data, &["m", "f"], &GlobalPlotSettings::default(), &opts).unwrap();
        assert_eq!(fig[id].legend_entries().len(), 2);
        assert_eq!(fig[id].y_tick_override.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn notched_outline_has_ten_points() {
        let b = box_stats(&nine(), 1.5).unwrap();
        assert_eq!(outline(Orientation::Vertical, 1.0, 0.25, &b, true).len(), 10);
    }
}
