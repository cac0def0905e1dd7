//! One rendering function per chart family.
//!
//! Every function validates its inputs before touching a canvas, builds a
//! [`Figure`](crate::figure::Figure) from the settings and records artists
//! on its axes. Nothing here draws pixels; that happens on export.

pub mod area;
pub mod bar;
pub mod box_plot;
pub mod contour;
pub mod heatmap;
pub mod histogram;
pub mod line;
pub mod pie;
pub mod subplots;
pub mod surface;
pub mod timeseries;

pub use area::{AreaMode, AreaOptions, area_plot, stack_series};
pub use bar::{BarMode, BarOptions, bar_plot};
pub use box_plot::{BoxData, BoxOptions, box_plot};
pub use contour::{ContourOptions, Levels, contour_from_fn, contour_plot};
pub use heatmap::{Grid2, HeatmapOptions, correlation_heatmap, format_value, heatmap};
pub use histogram::{HistogramOptions, histogram};
pub use line::{LineLayout, SeriesGroups, line_plot};
pub use pie::{PieOptions, format_pct, pie_chart};
pub use subplots::{SubplotOptions, add_subplot_labels, apply_subplot_formatting, panel_label_font, subplots};
pub use surface::{SurfaceKind, SurfaceOptions, surface_from_fn, surface_plot};
pub use timeseries::{
    Aggregate, Selection, TimeSeriesOptions, TimeSeriesTable, WeekSeparatorOptions, add_boundary_lines,
    add_week_separators, fill_under_curve, plot_timeseries,
};

use crate::error::{PlotError, Result};
use crate::figure::Stroke;
use crate::series::SeriesStyle;

/// Running sums of equally long value rows: `out[k][i] = rows[0][i] + … + rows[k][i]`.
/// Non-finite values count as zero so one gap does not erase the layers above it.
pub(crate) fn cumulative_rows(rows: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();
    let mut acc = vec![0.0; n];
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() != n {
            return Err(PlotError::count_mismatch("stacked series length", n, row.len()));
        }
        for (a, v) in acc.iter_mut().zip(row.iter()) {
            if v.is_finite() {
                *a += v;
            }
        }
        out.push(acc.clone());
    }
    Ok(out)
}

/// Outline drawn around bars, boxes and histogram bins: the series' marker edge.
pub(crate) fn edge_stroke(series: &SeriesStyle) -> Option<Stroke> {
    (series.marker_edgewidth > 0.0 && !series.marker_edgecolor.is_none())
        .then(|| Stroke::solid(series.marker_edgecolor, series.marker_edgewidth))
}

pub(crate) fn require_series(series: &[SeriesStyle], what: &str) -> Result<()> {
    if series.is_empty() {
        return Err(PlotError::Empty(format!("{what} needs at least one series")));
    }
    Ok(())
}

/// Rejects alphas outside `[0, 1]` before anything is drawn.
pub(crate) fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(PlotError::setting(name, format!("{alpha} is outside [0, 1]")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_rows_stack_in_order() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, f64::NAN, 30.0];
        let out = cumulative_rows(&[&a, &b]).unwrap();
        assert_eq!(out[0], vec![1.0, 2.0, 3.0]);
        assert_eq!(out[1], vec![11.0, 2.0, 33.0]);
    }

    #[test]
    fn cumulative_rows_reject_ragged_input() {
        let err = cumulative_rows(&[&[1.0, 2.0], &[1.0]]).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 1, .. }));
    }
}
