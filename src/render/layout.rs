//! Placement of axes rectangles on the figure canvas.
//!
//! Three modes, in order of precedence: explicit `subplot_adjust` fractions,
//! tight layout (margins sized from the decorations' text extents), and the
//! fixed default fractions.

use plotters::prelude::DrawingBackend;

use crate::figure::{AxesKind, Figure};
use crate::settings::SubplotAdjust;

use super::canvas::Canvas;
use super::colorbar;
use super::decor::{self, Insets};
use super::geom::{Px, PxRect};
use super::transform::DataTransform;

/// Padding around the figure edge and between panels in tight mode, in points.
pub const FIG_PAD: f64 = 10.8;

const DEFAULT_ADJUST: (f64, f64, f64, f64, f64, f64) = (0.125, 0.9, 0.88, 0.11, 0.2, 0.2);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub plot: PxRect,
    pub colorbar: Option<PxRect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub axes: Vec<Placement>,
    /// Top-center anchor of the figure title.
    pub suptitle: Option<Px>,
}

/// Split `[start, end]` into `ratios.len()` spans separated by `space` times the mean span.
pub fn split(start: f64, end: f64, ratios: &[f64], space: f64) -> Vec<(f64, f64)> {
    let n = ratios.len().max(1);
    let total = (end - start).max(1.0);
    let mean = total / (n as f64 + space * (n as f64 - 1.0));
    let gap = space * mean;
    let sum: f64 = ratios.iter().sum::<f64>().max(f64::EPSILON);
    let mut out = Vec::with_capacity(n);
    let mut x = start;
    for r in ratios {
        let w = mean * n as f64 * r / sum;
        out.push((x, x + w));
        x += w + gap;
    }
    out
}

fn ratios(given: &[f64], n: usize) -> Vec<f64> {
    if given.len() == n && given.iter().all(|r| *r > 0.0) {
        given.to_vec()
    } else {
        vec![1.0; n]
    }
}

pub fn plan<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, fig: &Figure) -> Plan {
    let (w, h) = canvas.size();
    let pad = canvas.pt(FIG_PAD);
    let (band, suptitle) = match &fig.suptitle {
        Some(t) => {
            let (_, th) = canvas.measure(&t.text, &t.font);
            (th + pad, Some((w / 2.0, pad / 2.0)))
        }
        None => (0.0, None),
    };
    let mut axes = match (&fig.subplot_adjust, fig.tight_layout) {
        (Some(adj), _) => fractions(canvas, fig, adj, w, h),
        (None, true) => tight(canvas, fig, w, h, pad, band),
        (None, false) => fractions(canvas, fig, &SubplotAdjust::default(), w, h),
    };
    for (id, place) in fig.axes_ids().zip(axes.iter_mut()) {
        let ax = &fig[id];
        if ax.equal_aspect && !ax.is_3d() {
            let (x, y) = fig.resolved_limits(id);
            let s = &ax.settings;
            let dx = (s.x_scale.forward(x.1) - s.x_scale.forward(x.0)).abs();
            let dy = (s.y_scale.forward(y.1) - s.y_scale.forward(y.0)).abs();
            place.plot = equalize(place.plot, dx, dy);
            if let Some(cb) = place.colorbar.as_mut() {
                cb.y0 = place.plot.y0;
                cb.y1 = place.plot.y1;
                let width = cb.width();
                cb.x0 = place.plot.x1 + colorbar::geometry(place.plot.width(), place.plot.height(), canvas.px_per_pt).0;
                cb.x1 = cb.x0 + width;
            }
        }
        log::debug!("axes {} plot rect {:?}", id.index(), place.plot);
    }
    Plan { axes, suptitle }
}

/// Shrink `r` around its center so one data unit spans the same pixels on both axes.
pub fn equalize(r: PxRect, dx: f64, dy: f64) -> PxRect {
    if !(dx > 0.0 && dy > 0.0) {
        return r;
    }
    let want = dx / dy;
    let have = r.width() / r.height();
    let (cx, cy) = r.center();
    if have > want {
        let w = r.height() * want;
        PxRect::new(cx - w / 2.0, r.y0, cx + w / 2.0, r.y1)
    } else {
        let h = r.width() / want;
        PxRect::new(r.x0, cy - h / 2.0, r.x1, cy + h / 2.0)
    }
}

fn with_colorbar<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, fig: &Figure, idx: usize, cell: PxRect, steal: bool) -> Placement {
    let ax = &fig.all_axes()[idx];
    if ax.colorbar.is_none() {
        return Placement {
            plot: cell,
            colorbar: None,
        };
    }
    let (pad, width) = colorbar::geometry(cell.width(), cell.height(), canvas.px_per_pt);
    let plot = if steal {
        PxRect::new(cell.x0, cell.y0, cell.x1 - pad - width - cell.width() * 0.05, cell.y1)
    } else {
        cell
    };
    let x0 = plot.x1 + pad;
    Placement {
        plot,
        colorbar: Some(PxRect::new(x0, plot.y0, x0 + width, plot.y1)),
    }
}

fn fractions<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, fig: &Figure, adj: &SubplotAdjust, w: f64, h: f64) -> Vec<Placement> {
    let g = &fig.layout;
    let (dl, dr, dt, db, dh, dw) = DEFAULT_ADJUST;
    let left = adj.left.unwrap_or(dl) * w;
    let right = adj.right.unwrap_or(dr) * w;
    let top = (1.0 - adj.top.unwrap_or(dt)) * h;
    let bottom = (1.0 - adj.bottom.unwrap_or(db)) * h;
    let wspace = g.wspace.or(adj.wspace).unwrap_or(dw);
    let hspace = g.hspace.or(adj.hspace).unwrap_or(dh);
    let cols = split(left, right, &ratios(&g.width_ratios, g.cols), wspace);
    let rows = split(top, bottom, &ratios(&g.height_ratios, g.rows), hspace);
    fig.axes_ids()
        .map(|id| {
            let (r, c) = fig.position(id);
            let cell = PxRect::new(cols[c].0, rows[r].0, cols[c].1, rows[r].1);
            with_colorbar(canvas, fig, id.index(), cell, true)
        })
        .collect()
}

fn tight<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, fig: &Figure, w: f64, h: f64, pad: f64, band: f64) -> Vec<Placement> {
    let g = &fig.layout;
    let wr = ratios(&g.width_ratios, g.cols);
    let hr = ratios(&g.height_ratios, g.rows);
    let approx_cols = split(pad, w - pad, &wr, 0.1);
    let approx_rows = split(pad + band, h - pad, &hr, 0.1);

    let mut col_l = vec![0.0f64; g.cols];
    let mut col_r = vec![0.0f64; g.cols];
    let mut row_t = vec![0.0f64; g.rows];
    let mut row_b = vec![0.0f64; g.rows];
    for id in fig.axes_ids() {
        let ax = &fig[id];
        let (r, c) = fig.position(id);
        let cell = PxRect::new(approx_cols[c].0, approx_rows[r].0, approx_cols[c].1, approx_rows[r].1);
        let mut ins = match ax.kind {
            AxesKind::ThreeD(_) => {
                // ticks and labels are drawn inside the projected box
                let mut i = decor::insets(canvas, ax, &DataTransform::new(cell, Default::default(), Default::default()));
                i.left = 0.0;
                i.bottom = 0.0;
                i
            }
            _ => {
                let (xl, yl) = fig.resolved_limits(id);
                let s = &ax.settings;
                let tf = DataTransform::new(cell, (s.x_scale, xl), (s.y_scale, yl));
                decor::insets(canvas, ax, &tf)
            }
        };
        if let Some(cb) = &ax.colorbar {
            ins.right += colorbar::extent(canvas, cb, &ax.settings, cell.width(), cell.height());
        }
        let Insets {
            left,
            right,
            top,
            bottom,
        } = ins;
        col_l[c] = col_l[c].max(left);
        col_r[c] = col_r[c].max(right);
        row_t[r] = row_t[r].max(top);
        row_b[r] = row_b[r].max(bottom);
    }

    let mean_w = (w - 2.0 * pad) / g.cols as f64;
    let mean_h = (h - 2.0 * pad - band) / g.rows as f64;
    let gap_w = pad + g.wspace.unwrap_or(0.0) * mean_w;
    let gap_h = pad + g.hspace.unwrap_or(0.0) * mean_h;

    let spans = |start: f64, total: f64, before: &[f64], after: &[f64], gap: f64, r: &[f64]| {
        let n = r.len();
        let deco: f64 = before.iter().sum::<f64>() + after.iter().sum::<f64>();
        let avail = (total - deco - gap * (n as f64 - 1.0)).max(10.0 * n as f64);
        let sum: f64 = r.iter().sum();
        let mut x = start;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            x += before[i];
            let len = avail * r[i] / sum;
            out.push((x, x + len));
            x += len + after[i] + gap;
        }
        out
    };
    let cols = spans(pad, w - 2.0 * pad, &col_l, &col_r, gap_w, &wr);
    let rows = spans(pad + band, h - 2.0 * pad - band, &row_t, &row_b, gap_h, &hr);

    fig.axes_ids()
        .map(|id| {
            let (r, c) = fig.position(id);
            let plot = PxRect::new(cols[c].0, rows[r].0, cols[c].1, rows[r].1);
            with_colorbar(canvas, fig, id.index(), plot, false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_honors_ratios_and_spacing() {
        let s = split(0.0, 300.0, &[1.0, 2.0], 0.0);
        assert_eq!(s, vec![(0.0, 100.0), (100.0, 300.0)]);
        let s = split(0.0, 210.0, &[1.0, 1.0], 0.1);
        assert!((s[0].1 - 100.0).abs() < 1e-9);
        assert!((s[1].0 - 110.0).abs() < 1e-9);
    }

    #[test]
    fn equalize_keeps_center() {
        let r = equalize(PxRect::new(0.0, 0.0, 200.0, 100.0), 1.0, 1.0);
        assert_eq!(r, PxRect::new(50.0, 0.0, 150.0, 100.0));
    }
}
