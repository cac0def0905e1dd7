//! Frequency distributions of one or more samples.

use crate::error::{PlotError, Result};
use crate::figure::axes::patch_for;
use crate::figure::{Artist, AxesId, Figure, LegendHandle, Stroke};
use crate::color::Color;
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;
use crate::stats::{Bins, Histogram};
use crate::style::Orientation;

use super::bar::BarRect;
use super::{check_alpha, cumulative_rows, require_series};

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramOptions {
    pub bins: Bins,
    /// Counting range; values outside are ignored. Defaults to the data range.
    pub range: Option<(f64, f64)>,
    pub density: bool,
    pub cumulative: bool,
    pub stacked: bool,
    pub orientation: Orientation,
    pub alpha: f64,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        HistogramOptions {
            bins: Bins::default(),
            range: None,
            density: false,
            cumulative: false,
            stacked: false,
            orientation: Orientation::Vertical,
            alpha: 0.7,
        }
    }
}

impl HistogramOptions {
    pub fn bins(mut self, bins: impl Into<Bins>) -> Self {
        self.bins = bins.into();
        self
    }
}

/// Finite min/max over every sample.
fn data_range(series: &[SeriesStyle]) -> Option<(f64, f64)> {
    series
        .iter()
        .flat_map(|s| s.y().iter().copied())
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Counts per series over shared bin edges, after density/cumulative transforms.
pub(crate) fn compute_all(series: &[SeriesStyle], opts: &HistogramOptions) -> Result<Vec<Histogram>> {
    let (lo, hi) = match opts.range {
        Some((lo, hi)) if lo < hi => (lo, hi),
        Some((lo, hi)) => {
            return Err(PlotError::setting("range", format!("min {lo} must be below max {hi}")));
        }
        None => data_range(series).ok_or_else(|| PlotError::Empty("histogram data has no finite values".into()))?,
    };
    let edges = opts.bins.edges(lo, hi)?;
    Ok(series
        .iter()
        .map(|s| {
            let h = Histogram::compute(s.y(), &edges);
            let h = if opts.density { h.into_density() } else { h };
            if opts.cumulative { h.into_cumulative(opts.density) } else { h }
        })
        .collect())
}

/// Draw histograms. Several series are stacked or dodged within each bin.
pub fn histogram(
    series: &[SeriesStyle],
    settings: &GlobalPlotSettings,
    opts: &HistogramOptions,
) -> Result<(Figure, AxesId)> {
    require_series(series, "histogram")?;
    check_alpha("alpha", opts.alpha)?;
    let hists = compute_all(series, opts)?;
    let edges = hists[0].edges.clone();

    let n = series.len();
    let bars: Vec<Vec<BarRect>> = if opts.stacked || n == 1 {
        let rows: Vec<&[f64]> = hists.iter().map(|h| h.counts.as_slice()).collect();
        let tops = if opts.stacked {
            cumulative_rows(&rows)?
        } else {
            vec![hists[0].counts.clone()]
        };
        tops.iter()
            .enumerate()
            .map(|(k, top)| {
                edges
                    .windows(2)
                    .enumerate()
                    .map(|(i, w)| BarRect {
                        pos: (w[0] + w[1]) / 2.0,
                        width: w[1] - w[0],
                        lo: if k == 0 { 0.0 } else { tops[k - 1][i] },
                        hi: top[i],
                    })
                    .collect()
            })
            .collect()
    } else {
        // dodge: series share 80 % of each bin
        hists
            .iter()
            .enumerate()
            .map(|(k, h)| {
                edges
                    .windows(2)
                    .zip(&h.counts)
                    .map(|(w, c)| {
                        let slot = (w[1] - w[0]) * 0.8 / n as f64;
                        BarRect {
                            pos: w[0] + (w[1] - w[0]) * 0.1 + slot * (k as f64 + 0.5),
                            width: slot,
                            lo: 0.0,
                            hi: *c,
                        }
                    })
                    .collect()
            })
            .collect()
    };

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    for (s, rects) in series.iter().zip(&bars) {
        let edge = if s.marker_edgewidth > 0.0 {
            Some(Stroke::solid(s.marker_edgecolor, s.marker_edgewidth))
        } else {
            Some(Stroke::solid(Color::BLACK, 0.5))
        };
        let patch = patch_for(s, s.color, opts.alpha, edge);
        for r in rects.iter().filter(|r| r.hi > r.lo) {
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
    match opts.orientation {
        Orientation::Vertical => ax.sticky_y.push(0.0),
        Orientation::Horizontal => ax.sticky_x.push(0.0),
    }
    log::debug!("histogram: {} series over {} bins", n, edges.len() - 1);
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(values: &[f64]) -> SeriesStyle {
        SeriesStyle::builder(values.iter().copied()).build().unwrap()
    }

    #[test]
    fn counts_cover_every_finite_sample() {
        let s = sample(&[1.0, 2.0, 2.5, f64::NAN, 3.0, 4.0]);
        let h = compute_all(&[s], &HistogramOptions::default().bins(3)).unwrap();
        assert_eq!(h[0].total(), 5.0);
    }

    #[test]
    fn density_integrates_to_one() {
        let s = sample(&[0.1, 0.2, 0.4, 0.8, 0.9, 0.95]);
        let opts = HistogramOptions {
            density: true,
            ..HistogramOptions::default().bins(4)
        };
        let h = &compute_all(&[s], &opts).unwrap()[0];
        let area: f64 = h.counts.iter().zip(h.widths()).map(|(c, w)| c * w).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn explicit_range_drops_outside_values() {
        let s = sample(&[-5.0, 0.5, 1.5, 50.0]);
        let opts = HistogramOptions {
            range: Some((0.0, 2.0)),
            ..HistogramOptions::default().bins(2)
        };
        assert_eq!(compute_all(&[s], &opts).unwrap()[0].counts, vec![1.0, 1.0]);
    }

    #[test]
    fn stacked_histogram_draws_every_series() {
        let a = sample(&[1.0, 2.0, 3.0]);
        let b = sample(&[1.0, 1.5, 3.0]);
        let opts = HistogramOptions {
            stacked: true,
            ..HistogramOptions::default().bins(2)
        };
        let (fig, id) = histogram(&[a, b], &GlobalPlotSettings::default(), &opts).unwrap();
        assert_eq!(fig[id].artist_count(), 4);
    }

    #[test]
    fn alpha_is_validated() {
        let opts = HistogramOptions {
            alpha: 1.5,
            ..Default::default()
        };
        assert!(histogram(&[sample(&[1.0])], &GlobalPlotSettings::default(), &opts).is_err());
    }
}
