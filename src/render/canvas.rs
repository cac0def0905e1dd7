//! Pixel-level drawing on a plotters drawing area.
//!
//! [`Canvas`] adds what the figure renderer needs on top of plotters: point
//! based sizes, dash patterns, hatching, clipping and an ink bounding box of
//! everything drawn (used to crop exports tightly).

use std::f64::consts::SQRT_2;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::Color;
use crate::error::{PlotError, Result};
use crate::figure::{FontSpec, HAlign, MarkerStyle, Patch, Stroke, VAlign};
use crate::style::Marker;

use super::geom::{
    Px, PxRect, clip_polygon, clip_polyline, dash_polyline, hatch_geometry, regular_polygon,
    star_polygon,
};
use super::text::{LINE_SPACING, font_desc, font_px, measure};

fn ipt(p: Px) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

pub struct Canvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    pub dpi: f64,
    pub px_per_pt: f64,
    ink: Option<PxRect>,
}

impl<'a, DB: DrawingBackend> Canvas<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>, dpi: f64) -> Self {
        Canvas {
            area,
            dpi,
            px_per_pt: dpi / 72.0,
            ink: None,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        let (w, h) = self.area.dim_in_pixel();
        (w as f64, h as f64)
    }

    /// Points to pixels.
    pub fn pt(&self, v: f64) -> f64 {
        v * self.px_per_pt
    }

    pub fn ink(&self) -> Option<PxRect> {
        self.ink
    }

    fn mark(&mut self, r: PxRect) {
        self.ink = Some(match self.ink {
            Some(i) => i.union(&r),
            None => r,
        });
    }

    fn stroke_px(&self, width_pt: f64) -> u32 {
        self.pt(width_pt).round().max(1.0) as u32
    }

    /// Paint the whole canvas. Not counted as ink.
    pub fn fill_background(&mut self, color: Color) -> Result<()> {
        if color.is_none() {
            return Ok(());
        }
        self.area.fill(&color.to_rgba(1.0)).map_err(PlotError::render)
    }

    pub fn fill_rect(&mut self, r: PxRect, color: Color, alpha: f64) -> Result<()> {
        if color.is_none() || alpha <= 0.0 {
            return Ok(());
        }
        self.area
            .draw(&Rectangle::new(
                [ipt((r.x0, r.y0)), ipt((r.x1, r.y1))],
                color.to_rgba(alpha).filled(),
            ))
            .map_err(PlotError::render)?;
        self.mark(r);
        Ok(())
    }

    /// Stroke a polyline honoring the dash pattern, optionally clipped.
    pub fn stroke_polyline(&mut self, pts: &[Px], stroke: &Stroke, clip: Option<&PxRect>) -> Result<()> {
        if !stroke.is_visible() || pts.len() < 2 {
            return Ok(());
        }
        let width_px = self.pt(stroke.width);
        let pattern: Vec<f64> = stroke
            .style
            .dash_pattern()
            .map(|p| p.iter().map(|l| l * width_px.max(1.0)).collect())
            .unwrap_or_default();
        let runs: Vec<Vec<Px>> = match clip {
            Some(r) => clip_polyline(pts, r),
            None => split_non_finite(pts),
        };
        let style = ShapeStyle {
            color: stroke.color.to_rgba(stroke.alpha),
            filled: false,
            stroke_width: self.stroke_px(stroke.width),
        };
        for run in runs {
            let pieces = if pattern.is_empty() {
                vec![run]
            } else {
                dash_polyline(&run, &pattern)
            };
            for piece in pieces {
                if piece.len() < 2 {
                    continue;
                }
                let ipts: Vec<(i32, i32)> = piece.iter().map(|p| ipt(*p)).collect();
                self.area
                    .draw(&PathElement::new(ipts, style))
                    .map_err(PlotError::render)?;
                if let Some(bb) = PxRect::from_points(&piece) {
                    let hw = width_px / 2.0;
                    self.mark(bb.inset(-hw, -hw, -hw, -hw));
                }
            }
        }
        Ok(())
    }

    /// Fill, hatch and outline a polygon.
    pub fn draw_patch(&mut self, pts: &[Px], patch: &Patch, clip: Option<&PxRect>) -> Result<()> {
        let poly = match clip {
            Some(r) => clip_polygon(pts, r),
            None => pts
                .iter()
                .copied()
                .filter(|p| p.0.is_finite() && p.1.is_finite())
                .collect(),
        };
        if poly.len() < 3 {
            return Ok(());
        }
        if !patch.face.is_none() && patch.face_alpha > 0.0 {
            let ipts: Vec<(i32, i32)> = poly.iter().map(|p| ipt(*p)).collect();
            self.area
                .draw(&Polygon::new(ipts, patch.face.to_rgba(patch.face_alpha).filled()))
                .map_err(PlotError::render)?;
            if let Some(bb) = PxRect::from_points(&poly) {
                self.mark(bb);
            }
        }
        if !patch.hatch.is_empty() && !patch.hatch_color.is_none() {
            self.draw_hatch(&poly, patch)?;
        }
        if let Some(edge) = &patch.edge {
            let mut ring = pts.to_vec();
            if let Some(first) = pts.first() {
                ring.push(*first);
            }
            self.stroke_polyline(&ring, edge, clip)?;
        }
        Ok(())
    }

    fn draw_hatch(&mut self, poly: &[Px], patch: &Patch) -> Result<()> {
        let g = hatch_geometry(poly, &patch.hatch, self.dpi);
        let color = patch.hatch_color.to_rgba(1.0);
        let line_style = ShapeStyle {
            color,
            filled: false,
            stroke_width: self.stroke_px(patch.hatch_width),
        };
        for (a, b) in &g.lines {
            self.area
                .draw(&PathElement::new(vec![ipt(*a), ipt(*b)], line_style))
                .map_err(PlotError::render)?;
        }
        for (c, r) in &g.rings {
            self.area
                .draw(&Circle::new(ipt(*c), r.round().max(1.0) as i32, line_style))
                .map_err(PlotError::render)?;
        }
        for solid in &g.solids {
            let ipts: Vec<(i32, i32)> = solid.iter().map(|p| ipt(*p)).collect();
            self.area
                .draw(&Polygon::new(ipts, color.filled()))
                .map_err(PlotError::render)?;
        }
        Ok(())
    }

    /// Draw one marker centered on `c`.
    pub fn draw_marker(&mut self, c: Px, style: &MarkerStyle) -> Result<()> {
        if style.marker.is_none() || !c.0.is_finite() || !c.1.is_finite() {
            return Ok(());
        }
        let r = self.pt(style.size) / 2.0;
        let edge_px = self.pt(style.edge_width);
        let face = style.face.to_rgba(style.alpha);
        let edge = style.edge.to_rgba(style.alpha);
        let edge_style = ShapeStyle {
            color: edge,
            filled: false,
            stroke_width: self.stroke_px(style.edge_width),
        };
        let reach = r * SQRT_2 + edge_px;
        self.mark(PxRect::new(c.0 - reach, c.1 - reach, c.0 + reach, c.1 + reach));

        if style.marker.is_line_art() {
            let color = if style.edge.is_none() { face } else { edge };
            let line = ShapeStyle {
                color,
                filled: false,
                stroke_width: self.stroke_px(style.edge_width.max(1.0)),
            };
            let (a, b) = if style.marker == Marker::Plus {
                (
                    [(c.0 - r, c.1), (c.0 + r, c.1)],
                    [(c.0, c.1 - r), (c.0, c.1 + r)],
                )
            } else {
                let d = r / SQRT_2 * 1.2;
                (
                    [(c.0 - d, c.1 - d), (c.0 + d, c.1 + d)],
                    [(c.0 - d, c.1 + d), (c.0 + d, c.1 - d)],
                )
            };
            for seg in [a, b] {
                self.area
                    .draw(&PathElement::new(vec![ipt(seg[0]), ipt(seg[1])], line))
                    .map_err(PlotError::render)?;
            }
            return Ok(());
        }

        if matches!(style.marker, Marker::Circle | Marker::Point) {
            let radius = if style.marker == Marker::Point { r * 0.5 } else { r };
            let ri = radius.round().max(1.0) as i32;
            if !style.face.is_none() {
                self.area
                    .draw(&Circle::new(ipt(c), ri, face.filled()))
                    .map_err(PlotError::render)?;
            }
            if !style.edge.is_none() && style.edge_width > 0.0 {
                self.area
                    .draw(&Circle::new(ipt(c), ri, edge_style))
                    .map_err(PlotError::render)?;
            }
            return Ok(());
        }

        let outline = marker_outline(style.marker, c, r);
        let ipts: Vec<(i32, i32)> = outline.iter().map(|p| ipt(*p)).collect();
        if !style.face.is_none() {
            self.area
                .draw(&Polygon::new(ipts.clone(), face.filled()))
                .map_err(PlotError::render)?;
        }
        if !style.edge.is_none() && style.edge_width > 0.0 {
            let mut ring = ipts;
            ring.push(ring[0]);
            self.area
                .draw(&PathElement::new(ring, edge_style))
                .map_err(PlotError::render)?;
        }
        Ok(())
    }

    pub fn measure(&self, text: &str, font: &FontSpec) -> (f64, f64) {
        measure(text, font, self.px_per_pt)
    }

    /// Screen rectangle a text block would occupy.
    pub fn text_box(&self, text: &str, anchor: Px, font: &FontSpec, h: HAlign, v: VAlign, rotated: bool) -> PxRect {
        let (w, hgt) = self.measure(text, font);
        let (sw, sh) = if rotated { (hgt, w) } else { (w, hgt) };
        let x0 = match h {
            HAlign::Left => anchor.0,
            HAlign::Center => anchor.0 - sw / 2.0,
            HAlign::Right => anchor.0 - sw,
        };
        let y0 = match v {
            VAlign::Top => anchor.1,
            VAlign::Center => anchor.1 - sh / 2.0,
            VAlign::Bottom => anchor.1 - sh,
        };
        PxRect::from_size(x0, y0, sw, sh)
    }

    /// Draw text aligned on `anchor`; `rotated` runs it bottom-to-top. Returns its box.
    pub fn draw_text(
        &mut self,
        text: &str,
        anchor: Px,
        font: &FontSpec,
        h: HAlign,
        v: VAlign,
        rotated: bool,
    ) -> Result<PxRect> {
        let rect = self.text_box(text, anchor, font, h, v, rotated);
        if text.is_empty() || font.color.is_none() {
            return Ok(rect);
        }
        let px = font_px(font, self.px_per_pt);
        let step = px * LINE_SPACING;
        let color = font.color.to_rgba(1.0);
        let desc = font_desc(font, self.px_per_pt, rotated);
        for (i, line) in text.lines().enumerate() {
            let (pos, at) = if rotated {
                (
                    Pos::new(HPos::Center, VPos::Center),
                    (rect.x0 + px / 2.0 + i as f64 * step, rect.center().1),
                )
            } else {
                let y = rect.y0 + i as f64 * step;
                match h {
                    HAlign::Left => (Pos::new(HPos::Left, VPos::Top), (rect.x0, y)),
                    HAlign::Center => (Pos::new(HPos::Center, VPos::Top), (rect.center().0, y)),
                    HAlign::Right => (Pos::new(HPos::Right, VPos::Top), (rect.x1, y)),
                }
            };
            let style = desc.color(&color).pos(pos);
            self.area
                .draw(&Text::new(line, ipt(at), style))
                .map_err(PlotError::render)?;
        }
        self.mark(rect);
        Ok(rect)
    }
}

/// Split at non-finite points without clipping.
fn split_non_finite(pts: &[Px]) -> Vec<Vec<Px>> {
    let mut out = Vec::new();
    let mut cur = Vec::new();
    for p in pts {
        if p.0.is_finite() && p.1.is_finite() {
            cur.push(*p);
        } else if cur.len() > 1 {
            out.push(std::mem::take(&mut cur));
        } else {
            cur.clear();
        }
    }
    if cur.len() > 1 {
        out.push(cur);
    }
    out
}

/// Closed outline of a filled marker shape with "radius" `r`.
fn marker_outline(marker: Marker, c: Px, r: f64) -> Vec<Px> {
    match marker {
        Marker::Square => vec![
            (c.0 - r, c.1 - r),
            (c.0 + r, c.1 - r),
            (c.0 + r, c.1 + r),
            (c.0 - r, c.1 + r),
        ],
        Marker::TriangleUp => vec![(c.0, c.1 - r), (c.0 + r, c.1 + r), (c.0 - r, c.1 + r)],
        Marker::TriangleDown => vec![(c.0, c.1 + r), (c.0 - r, c.1 - r), (c.0 + r, c.1 - r)],
        Marker::TriangleLeft => vec![(c.0 - r, c.1), (c.0 + r, c.1 - r), (c.0 + r, c.1 + r)],
        Marker::TriangleRight => vec![(c.0 + r, c.1), (c.0 - r, c.1 + r), (c.0 - r, c.1 - r)],
        Marker::Diamond => {
            let d = r * SQRT_2;
            vec![(c.0, c.1 - d), (c.0 + d, c.1), (c.0, c.1 + d), (c.0 - d, c.1)]
        }
        Marker::ThinDiamond => {
            let d = r * SQRT_2;
            let w = d * 0.6;
            vec![(c.0, c.1 - d), (c.0 + w, c.1), (c.0, c.1 + d), (c.0 - w, c.1)]
        }
        Marker::Star => star_polygon(c, r, 5),
        Marker::Pentagon => regular_polygon(c, r, 5, 0.0),
        Marker::Hexagon => regular_polygon(c, r, 6, 0.0),
        _ => regular_polygon(c, r, 16, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlines_are_centered() {
        for m in [Marker::Square, Marker::Diamond, Marker::Star, Marker::Hexagon] {
            let pts = marker_outline(m, (10.0, 10.0), 4.0);
            let bb = PxRect::from_points(&pts).unwrap();
            let (cx, _) = bb.center();
            assert!((cx - 10.0).abs() < 1e-9, "{m:?}");
        }
    }

    #[test]
    fn filled_rect_paints_and_marks_ink() {
        let mut buf = vec![255u8; 20 * 20 * 3];
        {
            let area = plotters_bitmap::BitMapBackend::with_buffer(&mut buf, (20, 20)).into_drawing_area();
            let mut canvas = Canvas::new(&area, 72.0);
            canvas
                .fill_rect(PxRect::new(5.0, 5.0, 15.0, 15.0), Color::rgb(255, 0, 0), 1.0)
                .unwrap();
            assert_eq!(canvas.ink(), Some(PxRect::new(5.0, 5.0, 15.0, 15.0)));
            area.present().unwrap();
        }
        let px = |x: usize, y: usize| &buf[(y * 20 + x) * 3..(y * 20 + x) * 3 + 3];
        assert_eq!(px(10, 10), &[255, 0, 0]);
        assert_eq!(px(1, 1), &[255, 255, 255]);
    }

    #[test]
    fn non_finite_points_split_lines() {
        let runs = split_non_finite(&[(0.0, 0.0), (1.0, 1.0), (f64::NAN, 0.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(runs.len(), 2);
    }
}
