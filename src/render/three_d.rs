//! Orthographic 3D projection with painter's-algorithm ordering.
//!
//! Data is normalised into a box with aspect 4:4:3, rotated by the view's
//! azimuth and elevation, and fitted into the axes rectangle.

use plotters::prelude::DrawingBackend;

use crate::color::Color;
use crate::error::Result;
use crate::figure::{Artist, Axes, HAlign, Patch, Stroke, VAlign, View3D};
use crate::style::{LineStyle, Scale};

use super::canvas::Canvas;
use super::decor::{label_font, tick_font};
use super::geom::{Px, PxRect};
use super::ticks;

const Z_ASPECT: f64 = 0.75;

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    sin_a: f64,
    cos_a: f64,
    sin_e: f64,
    cos_e: f64,
    limits: [(f64, f64); 3],
    scale: f64,
    origin: Px,
}

impl Projection {
    pub fn new(view: &View3D, limits: [(f64, f64); 3], rect: &PxRect) -> Self {
        let (a, e) = (view.azim.to_radians(), view.elev.to_radians());
        let mut p = Projection {
            sin_a: a.sin(),
            cos_a: a.cos(),
            sin_e: e.sin(),
            cos_e: e.cos(),
            limits,
            scale: 1.0,
            origin: (0.0, 0.0),
        };
        let corners: Vec<(f64, f64)> = cube_corners().iter().map(|c| p.view_uv(*c)).collect();
        let (umin, umax) = min_max(corners.iter().map(|c| c.0));
        let (vmin, vmax) = min_max(corners.iter().map(|c| c.1));
        // leave room for tick and axis labels around the box
        let scale = (rect.width() * 0.78 / (umax - umin)).min(rect.height() * 0.78 / (vmax - vmin));
        let (cx, cy) = rect.center();
        p.scale = scale;
        p.origin = (cx - (umin + umax) / 2.0 * scale, cy + (vmin + vmax) / 2.0 * scale);
        p
    }

    /// Data value to the box coordinate in `[-1, 1]` (z in `[-0.75, 0.75]`).
    fn normalize(&self, p: (f64, f64, f64)) -> [f64; 3] {
        let n = |v: f64, (lo, hi): (f64, f64)| {
            if (hi - lo).abs() < f64::EPSILON {
                0.0
            } else {
                2.0 * (v - lo) / (hi - lo) - 1.0
            }
        };
        [
            n(p.0, self.limits[0]),
            n(p.1, self.limits[1]),
            n(p.2, self.limits[2]) * Z_ASPECT,
        ]
    }

    fn view_uv(&self, b: [f64; 3]) -> (f64, f64) {
        let [x, y, z] = b;
        let u = -x * self.sin_a + y * self.cos_a;
        let v = -x * self.cos_a * self.sin_e - y * self.sin_a * self.sin_e + z * self.cos_e;
        (u, v)
    }

    /// Distance towards the viewer; larger is closer.
    fn depth_box(&self, b: [f64; 3]) -> f64 {
        let [x, y, z] = b;
        x * self.cos_a * self.cos_e + y * self.sin_a * self.cos_e + z * self.sin_e
    }

    fn box_to_px(&self, b: [f64; 3]) -> Px {
        let (u, v) = self.view_uv(b);
        (self.origin.0 + u * self.scale, self.origin.1 - v * self.scale)
    }

    pub fn to_px(&self, p: (f64, f64, f64)) -> Px {
        self.box_to_px(self.normalize(p))
    }

    pub fn depth(&self, p: (f64, f64, f64)) -> f64 {
        self.depth_box(self.normalize(p))
    }

    /// Which end of each box axis faces away from the viewer (the back panes).
    fn back_sides(&self) -> [f64; 3] {
        let side = |weight: f64| if weight > 0.0 { -1.0 } else { 1.0 };
        [
            side(self.cos_a * self.cos_e),
            side(self.sin_a * self.cos_e),
            side(self.sin_e) * Z_ASPECT,
        ]
    }
}

fn cube_corners() -> Vec<[f64; 3]> {
    let mut v = Vec::with_capacity(8);
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [-Z_ASPECT, Z_ASPECT] {
                v.push([x, y, z]);
            }
        }
    }
    v
}

fn min_max(it: impl Iterator<Item = f64>) -> (f64, f64) {
    it.fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| (a.min(v), b.max(v)))
}

enum Drawable<'a> {
    Quad {
        pts: [Px; 4],
        face: Color,
        alpha: f64,
        edge: Option<&'a Stroke>,
    },
    Path {
        pts: Vec<Px>,
        stroke: &'a Stroke,
    },
}

/// Data limits of a 3D axes: x, y from the artists, z from [`Axes::z_limits`].
pub fn limits3(ax: &Axes) -> [(f64, f64); 3] {
    let (x, y) = ax.view_limits();
    [x, y, ax.z_limits()]
}

pub fn draw_3d<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, ax: &Axes, view: &View3D, rect: &PxRect) -> Result<()> {
    let limits = limits3(ax);
    let proj = Projection::new(view, limits, rect);
    log::debug!("3D view elev={} azim={} limits={limits:?}", view.elev, view.azim);
    draw_panes(canvas, ax, &proj)?;

    let mut items: Vec<(f64, Drawable<'_>)> = Vec::new();
    for layered in ax.artists() {
        match &layered.artist {
            Artist::Surface { quads, alpha, edge } => {
                for q in quads {
                    if q.corners.iter().any(|c| !(c.0.is_finite() && c.1.is_finite() && c.2.is_finite())) {
                        continue;
                    }
                    let depth = q.corners.iter().map(|c| proj.depth(*c)).sum::<f64>() / 4.0;
                    let pts = q.corners.map(|c| proj.to_px(c));
                    items.push((
                        depth,
                        Drawable::Quad {
                            pts,
                            face: q.face,
                            alpha: *alpha,
                            edge: edge.as_ref(),
                        },
                    ));
                }
            }
            Artist::Line3 { points, stroke } => {
                let finite: Vec<&(f64, f64, f64)> = points.iter().filter(|p| p.2.is_finite()).collect();
                if finite.len() < 2 {
                    continue;
                }
                let depth = finite.iter().map(|p| proj.depth(**p)).sum::<f64>() / finite.len() as f64;
                let pts = finite.iter().map(|p| proj.to_px(**p)).collect();
                items.push((depth, Drawable::Path { pts, stroke }));
            }
            _ => {}
        }
    }
    items.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (_, item) in items {
        match item {
            Drawable::Quad {
                pts,
                face,
                alpha,
                edge,
            } => {
                let mut patch = Patch::filled(face, alpha);
                patch.edge = edge.cloned();
                canvas.draw_patch(&pts, &patch, None)?;
            }
            Drawable::Path { pts, stroke } => canvas.stroke_polyline(&pts, stroke, None)?,
        }
    }

    draw_axes(canvas, ax, view, &proj)
}

fn draw_panes<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, ax: &Axes, proj: &Projection) -> Result<()> {
    let back = proj.back_sides();
    let pane = Patch::filled(Color::rgb(242, 242, 242), 1.0)
        .edge(Stroke::solid(Color::rgb(200, 200, 200), 0.8));
    let zt = Z_ASPECT;
    let quads: [[[f64; 3]; 4]; 3] = [
        [
            [back[0], -1.0, -zt],
            [back[0], 1.0, -zt],
            [back[0], 1.0, zt],
            [back[0], -1.0, zt],
        ],
        [
            [-1.0, back[1], -zt],
            [1.0, back[1], -zt],
            [1.0, back[1], zt],
            [-1.0, back[1], zt],
        ],
        [
            [-1.0, -1.0, back[2]],
            [1.0, -1.0, back[2]],
            [1.0, 1.0, back[2]],
            [-1.0, 1.0, back[2]],
        ],
    ];
    for q in &quads {
        let pts: Vec<Px> = q.iter().map(|b| proj.box_to_px(*b)).collect();
        canvas.draw_patch(&pts, &pane, None)?;
    }

    let s = &ax.settings;
    if !s.show_grid {
        return Ok(());
    }
    let grid = Stroke::solid(s.grid_color, s.grid_linewidth)
        .styled(s.grid_style)
        .alpha(s.grid_alpha);
    let box_ticks = |dim: usize| -> Vec<f64> {
        let (lo, hi) = proj.limits[dim];
        ticks::locate(Scale::Linear, (lo, hi), 5, false, None)
            .major
            .iter()
            .map(|t| {
                let n = if (hi - lo).abs() < f64::EPSILON { 0.0 } else { 2.0 * (t.value - lo) / (hi - lo) - 1.0 };
                if dim == 2 { n * Z_ASPECT } else { n }
            })
            .collect()
    };
    // each tick draws a line across the two back panes containing its axis
    for dim in 0..3 {
        for t in box_ticks(dim) {
            for other in (0..3).filter(|d| *d != dim) {
                let third = 3 - dim - other;
                let span = if third == 2 { Z_ASPECT } else { 1.0 };
                let mut a = [0.0; 3];
                let mut b = [0.0; 3];
                a[dim] = t;
                b[dim] = t;
                a[other] = back[other];
                b[other] = back[other];
                a[third] = -span;
                b[third] = span;
                canvas.stroke_polyline(&[proj.box_to_px(a), proj.box_to_px(b)], &grid, None)?;
            }
        }
    }
    Ok(())
}

fn draw_axes<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, ax: &Axes, view: &View3D, proj: &Projection) -> Result<()> {
    let s = &ax.settings;
    let back = proj.back_sides();
    let center = proj.box_to_px([0.0, 0.0, 0.0]);
    let edge_stroke = Stroke::solid(Color::BLACK, 0.8).styled(LineStyle::Solid);
    let tf = tick_font(s, true);
    let labels = [s.x_label.as_str(), s.y_label.as_str(), view.z_label.as_str()];

    for dim in 0..3 {
        // edge along `dim` on the front side of the floor (x, y) or a left vertical edge (z)
        let (o1, o2) = match dim {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let (s1, s2) = if dim == 2 {
            // pick the vertical edge furthest left on screen
            let mut best = (f64::INFINITY, (1.0, 1.0));
            for a in [-1.0, 1.0] {
                for b in [-1.0, 1.0] {
                    let mut p = [0.0; 3];
                    p[o1] = a;
                    p[o2] = b;
                    let u = proj.box_to_px(p).0;
                    if u < best.0 {
                        best = (u, (a, b));
                    }
                }
            }
            best.1
        } else {
            let front = -back[o1].signum();
            (front, back[2])
        };
        let at = |t: f64| {
            let mut p = [0.0; 3];
            p[dim] = t;
            p[o1] = s1;
            p[o2] = s2;
            p
        };
        let span = if dim == 2 { Z_ASPECT } else { 1.0 };
        let (a, b) = (proj.box_to_px(at(-span)), proj.box_to_px(at(span)));
        canvas.stroke_polyline(&[a, b], &edge_stroke, None)?;

        let (lo, hi) = proj.limits[dim];
        let t = ticks::locate(Scale::Linear, (lo, hi), 5, false, s.number_locale.as_deref());
        let push = canvas.pt(12.0);
        let outward = |p: Px, dist: f64| {
            let (dx, dy) = (p.0 - center.0, p.1 - center.1);
            let len = (dx * dx + dy * dy).sqrt().max(1e-9);
            (p.0 + dx / len * dist, p.1 + dy / len * dist)
        };
        for tick in &t.major {
            let n = if (hi - lo).abs() < f64::EPSILON { 0.0 } else { 2.0 * (tick.value - lo) / (hi - lo) - 1.0 };
            let p = proj.box_to_px(at(n * span));
            canvas.draw_text(&tick.label, outward(p, push), &tf, HAlign::Center, VAlign::Center, false)?;
        }
        if !labels[dim].is_empty() {
            let mid = proj.box_to_px(at(0.0));
            let font = label_font(s, dim == 0);
            canvas.draw_text(labels[dim], outward(mid, push * 3.0), &font, HAlign::Center, VAlign::Center, false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proj(elev: f64, azim: f64) -> Projection {
        let view = View3D {
            elev,
            azim,
            ..View3D::default()
        };
        Projection::new(&view, [(0.0, 1.0), (0.0, 1.0), (0.0, 1.0)], &PxRect::new(0.0, 0.0, 400.0, 400.0))
    }

    #[test]
    fn box_fits_inside_rect() {
        let p = proj(30.0, -60.0);
        for c in cube_corners() {
            let (x, y) = p.box_to_px(c);
            assert!((0.0..=400.0).contains(&x) && (0.0..=400.0).contains(&y));
        }
    }

    #[test]
    fn higher_z_is_higher_on_screen_and_closer_from_above() {
        let p = proj(30.0, -60.0);
        let low = p.to_px((0.5, 0.5, 0.0));
        let high = p.to_px((0.5, 0.5, 1.0));
        assert!(high.1 < low.1);
        assert!(p.depth((0.5, 0.5, 1.0)) > p.depth((0.5, 0.5, 0.0)));
    }

    #[test]
    fn floor_is_a_back_pane_when_looking_down() {
        assert!(proj(30.0, -60.0).back_sides()[2] < 0.0);
        assert!(proj(-30.0, -60.0).back_sides()[2] > 0.0);
    }
}
