//! Vertical color bar drawn to the right of an axes.

use plotters::prelude::DrawingBackend;

use crate::color::Color;
use crate::error::Result;
use crate::figure::{ColorBar, HAlign, Stroke, VAlign};
use crate::settings::GlobalPlotSettings;
use crate::style::Scale;

use super::canvas::Canvas;
use super::decor::{LABEL_PAD, SPINE_WIDTH, TICK_MAJOR_LEN, TICK_PAD, label_font, tick_font, tick_target};
use super::geom::PxRect;
use super::ticks::{self, AxisTicks};
use super::transform::AxisMap;

/// Gap between plot and bar, and bar width, for a plot of the given size.
pub fn geometry(plot_w: f64, plot_h: f64, px_per_pt: f64) -> (f64, f64) {
    let pad = (plot_w * 0.05).max(6.0 * px_per_pt);
    let width = (plot_h / 20.0).clamp(6.0 * px_per_pt, (plot_w * 0.08).max(6.0 * px_per_pt));
    (pad, width)
}

fn bar_ticks(cb: &ColorBar, s: &GlobalPlotSettings, len_px: f64, px_per_pt: f64) -> AxisTicks {
    let locale = s.number_locale.as_deref();
    match &cb.boundaries {
        Some(b) if b.len() <= 11 => {
            let step = b.windows(2).map(|w| (w[1] - w[0]).abs()).fold(f64::INFINITY, f64::min);
            let labels = ticks::format_linear(b, step, locale);
            ticks::fixed(b, Some(&labels), locale)
        }
        _ => {
            let target = tick_target(len_px, tick_font(s, false).size * px_per_pt, false);
            ticks::locate(Scale::Linear, (cb.vmin, cb.vmax), target, false, locale)
        }
    }
}

/// Horizontal space the bar needs right of the plot, including its labels.
pub fn extent<DB: DrawingBackend>(
    canvas: &Canvas<'_, DB>,
    cb: &ColorBar,
    s: &GlobalPlotSettings,
    plot_w: f64,
    plot_h: f64,
) -> f64 {
    let (pad, width) = geometry(plot_w, plot_h, canvas.px_per_pt);
    let t = bar_ticks(cb, s, plot_h, canvas.px_per_pt);
    let f = tick_font(s, false);
    let label_w = t
        .major
        .iter()
        .map(|t| canvas.measure(&t.label, &f).0)
        .fold(0.0, f64::max);
    let mut total = pad + width + canvas.pt(TICK_MAJOR_LEN + TICK_PAD) + label_w;
    if !cb.label.is_empty() {
        total += canvas.pt(LABEL_PAD) + canvas.measure(&cb.label, &label_font(s, false)).1;
    }
    total
}

pub fn draw_colorbar<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    cb: &ColorBar,
    bar: &PxRect,
    s: &GlobalPlotSettings,
) -> Result<()> {
    let map = AxisMap::new(Scale::Linear, (cb.vmin, cb.vmax), bar.y1, bar.y0);
    match &cb.boundaries {
        Some(bounds) if bounds.len() >= 2 => {
            for w in bounds.windows(2) {
                let (y0, y1) = (map.map(w[0]), map.map(w[1]));
                let mid = (w[0] + w[1]) / 2.0;
                let color = cb.cmap.map(mid, cb.vmin, cb.vmax);
                canvas.fill_rect(PxRect::new(bar.x0, y0, bar.x1, y1), color, 1.0)?;
            }
        }
        _ => {
            let steps = (bar.height().round() as usize).clamp(2, 256);
            let dy = bar.height() / steps as f64;
            for i in 0..steps {
                let t = (i as f64 + 0.5) / steps as f64;
                let y1 = bar.y1 - i as f64 * dy;
                // overlap by a pixel so no seams show
                let slice = PxRect::new(bar.x0, y1 - dy - 1.0, bar.x1, y1);
                canvas.fill_rect(slice, cb.cmap.sample(t), 1.0)?;
            }
        }
    }
    let outline = Stroke::solid(Color::BLACK, SPINE_WIDTH);
    let mut ring = bar.corners();
    ring.push(ring[0]);
    canvas.stroke_polyline(&ring, &outline, None)?;

    let t = bar_ticks(cb, s, bar.height(), canvas.px_per_pt);
    let tick_len = canvas.pt(TICK_MAJOR_LEN);
    let f = tick_font(s, false);
    let mut right = bar.x1 + tick_len;
    for tick in t.major.iter().filter(|t| map.contains(t.value)) {
        let y = map.map(tick.value);
        canvas.stroke_polyline(&[(bar.x1, y), (bar.x1 + tick_len, y)], &outline, None)?;
        let b = canvas.draw_text(
            &tick.label,
            (bar.x1 + canvas.pt(TICK_MAJOR_LEN + TICK_PAD), y),
            &f,
            HAlign::Left,
            VAlign::Center,
            false,
        )?;
        right = right.max(b.x1);
    }
    if !cb.label.is_empty() {
        let anchor = (right + canvas.pt(LABEL_PAD), bar.center().1);
        canvas.draw_text(&cb.label, anchor, &label_font(s, false), HAlign::Left, VAlign::Center, true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_thin_and_detached() {
        let (pad, width) = geometry(400.0, 300.0, 1.0);
        assert_eq!(pad, 20.0);
        assert_eq!(width, 15.0);
    }
}
