//! Legend layout and drawing inside an axes.

use plotters::prelude::DrawingBackend;

use crate::color::Color;
use crate::error::Result;
use crate::figure::{Axes, HAlign, LegendEntry, LegendHandle, MarkerStyle, Patch, Stroke, VAlign};
use crate::style::{LegendLocation, LineStyle};

use super::canvas::Canvas;
use super::decor::legend_font;
use super::geom::{Px, PxRect};

/// Spacing in units of the legend font size.
const BORDER_PAD: f64 = 0.4;
const LABEL_SPACING: f64 = 0.5;
const HANDLE_LENGTH: f64 = 2.0;
const HANDLE_HEIGHT: f64 = 0.7;
const HANDLE_TEXT_PAD: f64 = 0.8;
const BORDER_AXES_PAD: f64 = 0.5;

/// Candidate order when searching for the best location.
const BEST_ORDER: [LegendLocation; 10] = [
    LegendLocation::UpperRight,
    LegendLocation::UpperLeft,
    LegendLocation::LowerLeft,
    LegendLocation::LowerRight,
    LegendLocation::Right,
    LegendLocation::CenterLeft,
    LegendLocation::CenterRight,
    LegendLocation::LowerCenter,
    LegendLocation::UpperCenter,
    LegendLocation::Center,
];

/// Top-left corner of a `w × h` box placed at `loc` inside `inner`.
pub fn place(loc: LegendLocation, inner: &PxRect, w: f64, h: f64) -> Px {
    let (cx, cy) = inner.center();
    match loc {
        LegendLocation::UpperRight | LegendLocation::Best => (inner.x1 - w, inner.y0),
        LegendLocation::UpperLeft => (inner.x0, inner.y0),
        LegendLocation::LowerLeft => (inner.x0, inner.y1 - h),
        LegendLocation::LowerRight => (inner.x1 - w, inner.y1 - h),
        LegendLocation::Right | LegendLocation::CenterRight => (inner.x1 - w, cy - h / 2.0),
        LegendLocation::CenterLeft => (inner.x0, cy - h / 2.0),
        LegendLocation::LowerCenter => (cx - w / 2.0, inner.y1 - h),
        LegendLocation::UpperCenter => (cx - w / 2.0, inner.y0),
        LegendLocation::Center => (cx - w / 2.0, cy - h / 2.0),
    }
}

/// The location whose box covers the fewest data points; earlier candidates win ties.
pub fn best_location(inner: &PxRect, w: f64, h: f64, data: &[Px]) -> LegendLocation {
    let mut best = (usize::MAX, LegendLocation::UpperRight);
    for loc in BEST_ORDER {
        let (x, y) = place(loc, inner, w, h);
        let bx = PxRect::from_size(x, y, w, h);
        let hits = data.iter().filter(|p| bx.contains(**p)).count();
        if hits < best.0 {
            best = (hits, loc);
        }
        if hits == 0 {
            break;
        }
    }
    best.1
}

/// Draw the legend of `ax` inside `rect`. `data` are the artists' pixel positions.
pub fn draw_legend<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    ax: &Axes,
    rect: &PxRect,
    data: &[Px],
) -> Result<()> {
    let s = &ax.settings;
    let entries = ax.legend_entries();
    if !s.show_legend {
        return Ok(());
    }
    if entries.is_empty() {
        log::debug!("legend requested but no labelled artists");
        return Ok(());
    }
    let font = legend_font(s);
    let em = canvas.pt(font.size);
    let text_sizes: Vec<(f64, f64)> = entries.iter().map(|e| canvas.measure(&e.label, &font)).collect();
    let text_w = text_sizes.iter().map(|t| t.0).fold(0.0, f64::max);
    let row_h: Vec<f64> = text_sizes.iter().map(|t| t.1.max(em * HANDLE_HEIGHT)).collect();
    let pad = em * BORDER_PAD;
    let w = 2.0 * pad + em * (HANDLE_LENGTH + HANDLE_TEXT_PAD) + text_w;
    let h = 2.0 * pad
        + row_h.iter().sum::<f64>()
        + em * LABEL_SPACING * (entries.len().saturating_sub(1)) as f64;

    let bap = em * BORDER_AXES_PAD;
    let inner = rect.inset(bap, bap, bap, bap);
    let loc = match s.legend_location {
        LegendLocation::Best => best_location(&inner, w, h, data),
        other => other,
    };
    let (x0, y0) = place(loc, &inner, w, h);
    let frame = PxRect::from_size(x0, y0, w, h);

    if s.legend_shadow {
        let off = canvas.pt(2.0);
        let shadow = PxRect::from_size(x0 + off, y0 + off, w, h);
        canvas.fill_rect(shadow, Color::BLACK, 0.3)?;
    }
    if s.legend_frameon {
        canvas.fill_rect(frame, Color::WHITE, s.legend_framealpha)?;
        let edge = Stroke::solid(Color::rgb(204, 204, 204), 1.0).alpha(s.legend_framealpha);
        let mut ring = frame.corners();
        ring.push(ring[0]);
        canvas.stroke_polyline(&ring, &edge, None)?;
    }

    let mut y = y0 + pad;
    let hx0 = x0 + pad;
    let hx1 = hx0 + em * HANDLE_LENGTH;
    let tx = hx1 + em * HANDLE_TEXT_PAD;
    for (entry, rh) in entries.iter().zip(&row_h) {
        let cy = y + rh / 2.0;
        draw_handle(canvas, entry, hx0, hx1, cy, em * HANDLE_HEIGHT)?;
        canvas.draw_text(&entry.label, (tx, cy), &font, HAlign::Left, VAlign::Center, false)?;
        y += rh + em * LABEL_SPACING;
    }
    Ok(())
}

fn draw_handle<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    entry: &LegendEntry,
    x0: f64,
    x1: f64,
    cy: f64,
    height: f64,
) -> Result<()> {
    match &entry.handle {
        LegendHandle::Line { stroke, marker } => {
            if let Some(stroke) = stroke {
                draw_legend_line_sample(canvas, x0, x1, cy, stroke)?;
            }
            if let Some(marker) = marker {
                draw_legend_marker(canvas, ((x0 + x1) / 2.0, cy), marker)?;
            }
            Ok(())
        }
        LegendHandle::Patch(patch) => {
            let r = PxRect::new(x0, cy - height / 2.0, x1, cy + height / 2.0);
            draw_legend_patch(canvas, &r, patch)
        }
    }
}

/// Draw a line sample with the entry's dash pattern.
fn draw_legend_line_sample<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    start_x: f64,
    end_x: f64,
    y: f64,
    stroke: &Stroke,
) -> Result<()> {
    if stroke.style == LineStyle::None {
        return Ok(());
    }
    canvas.stroke_polyline(&[(start_x, y), (end_x, y)], stroke, None)
}

fn draw_legend_marker<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, at: Px, marker: &MarkerStyle) -> Result<()> {
    canvas.draw_marker(at, marker)
}

fn draw_legend_patch<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, r: &PxRect, patch: &Patch) -> Result<()> {
    canvas.draw_patch(&r.corners(), patch, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_locations_hug_the_right_edges() {
        let inner = PxRect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(place(LegendLocation::UpperRight, &inner, 20.0, 10.0), (80.0, 0.0));
        assert_eq!(place(LegendLocation::LowerLeft, &inner, 20.0, 10.0), (0.0, 40.0));
        assert_eq!(place(LegendLocation::Center, &inner, 20.0, 10.0), (40.0, 20.0));
    }

    #[test]
    fn best_avoids_data() {
        let inner = PxRect::new(0.0, 0.0, 100.0, 100.0);
        // data crowding the upper right corner
        let data: Vec<Px> = (0..20).map(|i| (90.0 + i as f64 * 0.1, 5.0)).collect();
        assert_eq!(best_location(&inner, 20.0, 20.0, &data), LegendLocation::UpperLeft);
        assert_eq!(best_location(&inner, 20.0, 20.0, &[]), LegendLocation::UpperRight);
    }
}
