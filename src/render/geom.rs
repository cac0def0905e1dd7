//! Pixel-space geometry: rectangles, clipping, dash patterns and hatch lines.
//!
//! Plotters draws whatever it is given, so everything that must stay inside
//! an axes is clipped here first.

use std::f64::consts::PI;

use crate::style::Hatch;

pub type Px = (f64, f64);

/// Axis-aligned pixel rectangle, y growing downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PxRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PxRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        PxRect {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        PxRect::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Px {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn union(&self, o: &PxRect) -> PxRect {
        PxRect {
            x0: self.x0.min(o.x0),
            y0: self.y0.min(o.y0),
            x1: self.x1.max(o.x1),
            y1: self.y1.max(o.y1),
        }
    }

    pub fn inset(&self, left: f64, top: f64, right: f64, bottom: f64) -> PxRect {
        PxRect {
            x0: self.x0 + left,
            y0: self.y0 + top,
            x1: (self.x1 - right).max(self.x0 + left + 1.0),
            y1: (self.y1 - bottom).max(self.y0 + top + 1.0),
        }
    }

    pub fn contains(&self, p: Px) -> bool {
        p.0 >= self.x0 && p.0 <= self.x1 && p.1 >= self.y0 && p.1 <= self.y1
    }

    pub fn intersects(&self, o: &PxRect) -> bool {
        self.x0 < o.x1 && o.x0 < self.x1 && self.y0 < o.y1 && o.y0 < self.y1
    }

    pub fn corners(&self) -> Vec<Px> {
        vec![
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ]
    }

    pub fn from_points(points: &[Px]) -> Option<PxRect> {
        let mut it = points.iter().filter(|p| p.0.is_finite() && p.1.is_finite());
        let first = it.next()?;
        let mut r = PxRect::new(first.0, first.1, first.0, first.1);
        for p in it {
            r = r.union(&PxRect::new(p.0, p.1, p.0, p.1));
        }
        Some(r)
    }
}

/// Liang–Barsky segment clipping. Returns the visible part, if any.
pub fn clip_segment(a: Px, b: Px, r: &PxRect) -> Option<(Px, Px)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.0 - r.x0),
        (dx, r.x1 - a.0),
        (-dy, a.1 - r.y0),
        (dy, r.y1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return None;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return None;
                }
                t1 = t1.min(t);
            }
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Clip a polyline into the visible runs. Non-finite points break the line.
pub fn clip_polyline(points: &[Px], r: &PxRect) -> Vec<Vec<Px>> {
    let mut runs: Vec<Vec<Px>> = Vec::new();
    let mut cur: Vec<Px> = Vec::new();
    let finite = |p: &Px| p.0.is_finite() && p.1.is_finite();
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if !finite(&a) || !finite(&b) {
            if cur.len() > 1 {
                runs.push(std::mem::take(&mut cur));
            }
            cur.clear();
            continue;
        }
        match clip_segment(a, b, r) {
            Some((ca, cb)) => {
                let continues = cur.last().is_some_and(|l| (l.0 - ca.0).abs() < 1e-9 && (l.1 - ca.1).abs() < 1e-9);
                if !continues {
                    if cur.len() > 1 {
                        runs.push(std::mem::take(&mut cur));
                    }
                    cur.clear();
                    cur.push(ca);
                }
                cur.push(cb);
            }
            None => {
                if cur.len() > 1 {
                    runs.push(std::mem::take(&mut cur));
                }
                cur.clear();
            }
        }
    }
    if cur.len() > 1 {
        runs.push(cur);
    }
    runs
}

/// Sutherland–Hodgman clipping of a polygon against a rectangle.
pub fn clip_polygon(points: &[Px], r: &PxRect) -> Vec<Px> {
    #[derive(Clone, Copy)]
    enum Edge {
        Left,
        Right,
        Top,
        Bottom,
    }
    let inside = |p: Px, e: Edge| match e {
        Edge::Left => p.0 >= r.x0,
        Edge::Right => p.0 <= r.x1,
        Edge::Top => p.1 >= r.y0,
        Edge::Bottom => p.1 <= r.y1,
    };
    let cross = |a: Px, b: Px, e: Edge| -> Px {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        match e {
            Edge::Left | Edge::Right => {
                let x = if matches!(e, Edge::Left) { r.x0 } else { r.x1 };
                let t = if dx == 0.0 { 0.0 } else { (x - a.0) / dx };
                (x, a.1 + t * dy)
            }
            Edge::Top | Edge::Bottom => {
                let y = if matches!(e, Edge::Top) { r.y0 } else { r.y1 };
                let t = if dy == 0.0 { 0.0 } else { (y - a.1) / dy };
                (a.0 + t * dx, y)
            }
        }
    };
    let mut out: Vec<Px> = points
        .iter()
        .copied()
        .filter(|p| p.0.is_finite() && p.1.is_finite())
        .collect();
    for e in [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom] {
        if out.is_empty() {
            break;
        }
        let input = std::mem::take(&mut out);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            match (inside(cur, e), inside(prev, e)) {
                (true, true) => out.push(cur),
                (true, false) => {
                    out.push(cross(prev, cur, e));
                    out.push(cur);
                }
                (false, true) => out.push(cross(prev, cur, e)),
                (false, false) => {}
            }
            prev = cur;
        }
    }
    out
}

/// Split a polyline into the "on" pieces of a dash pattern (lengths in pixels).
pub fn dash_polyline(points: &[Px], pattern: &[f64]) -> Vec<Vec<Px>> {
    if pattern.is_empty() || pattern.iter().all(|l| *l <= 0.0) {
        return vec![points.to_vec()];
    }
    let mut out: Vec<Vec<Px>> = Vec::new();
    let mut idx = 0usize;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut cur: Vec<Px> = Vec::new();
    if let Some(p) = points.first() {
        cur.push(*p);
    }
    for w in points.windows(2) {
        let (mut a, b) = (w[0], w[1]);
        let mut seg = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        while seg > remaining {
            let t = remaining / seg;
            let p = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
            if on {
                cur.push(p);
                out.push(std::mem::take(&mut cur));
            } else {
                cur = vec![p];
            }
            seg -= remaining;
            a = p;
            on = !on;
            idx = (idx + 1) % pattern.len();
            remaining = pattern[idx].max(0.01);
        }
        remaining -= seg;
        if on {
            cur.push(b);
        } else {
            cur = vec![b];
        }
    }
    if on && cur.len() > 1 {
        out.push(cur);
    }
    out
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(p: Px, poly: &[Px]) -> bool {
    let mut inside = false;
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Pieces of the parallel lines `{p : p·n = c}` (c = k·spacing) that lie inside `poly`.
fn line_hatch(poly: &[Px], angle_deg: f64, spacing: f64) -> Vec<(Px, Px)> {
    let th = angle_deg.to_radians();
    let d = (th.cos(), -th.sin()); // y grows downwards
    let n = (-d.1, d.0);
    let proj = |p: &Px| p.0 * n.0 + p.1 * n.1;
    let (lo, hi) = poly
        .iter()
        .map(proj)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| (a.min(v), b.max(v)));
    if !lo.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut c = (lo / spacing).ceil() * spacing;
    while c <= hi {
        let mut ts: Vec<f64> = Vec::new();
        let m = poly.len();
        for i in 0..m {
            let a = poly[i];
            let b = poly[(i + 1) % m];
            let (pa, pb) = (proj(&a) - c, proj(&b) - c);
            if (pa > 0.0) != (pb > 0.0) {
                let t = pa / (pa - pb);
                let x = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
                ts.push(x.0 * d.0 + x.1 * d.1);
            }
        }
        ts.sort_by(f64::total_cmp);
        for pair in ts.chunks_exact(2) {
            let base = (n.0 * c, n.1 * c);
            let p0 = (base.0 + d.0 * pair[0], base.1 + d.1 * pair[0]);
            let p1 = (base.0 + d.0 * pair[1], base.1 + d.1 * pair[1]);
            out.push((p0, p1));
        }
        c += spacing;
    }
    out
}

/// A hatch decomposed into drawable pieces.
#[derive(Debug, Default)]
pub struct HatchGeometry {
    pub lines: Vec<(Px, Px)>,
    /// Outlined circles: (center, radius).
    pub rings: Vec<(Px, f64)>,
    /// Filled shapes (dots and stars) as polygons.
    pub solids: Vec<Vec<Px>>,
}

/// Lines per inch contributed by each repetition of a hatch symbol.
const HATCH_DENSITY: f64 = 6.0;

/// Build hatch geometry for an already clipped pixel polygon.
pub fn hatch_geometry(poly: &[Px], hatch: &Hatch, px_per_inch: f64) -> HatchGeometry {
    let mut g = HatchGeometry::default();
    if poly.len() < 3 || hatch.is_empty() {
        return g;
    }
    let count = |chars: &[char]| chars.iter().map(|c| hatch.density(*c)).sum::<usize>();
    let spacing = |n: usize| px_per_inch / (HATCH_DENSITY * n as f64);

    let diag_ne = count(&['/', 'x', 'X']);
    let diag_nw = count(&['\\', 'x', 'X']);
    let vert = count(&['|', '+']);
    let horiz = count(&['-', '+']);
    for (n, angle) in [(diag_ne, 45.0), (diag_nw, 135.0), (vert, 90.0), (horiz, 0.0)] {
        if n > 0 {
            g.lines.extend(line_hatch(poly, angle, spacing(n)));
        }
    }

    let Some(bb) = PxRect::from_points(poly) else {
        return g;
    };
    let grid = |n: usize, mut emit: Box<dyn FnMut(Px, f64) + '_>| {
        if n == 0 {
            return;
        }
        let s = spacing(n);
        let mut row = 0usize;
        let mut y = (bb.y0 / s).floor() * s;
        while y <= bb.y1 + s {
            // staggered rows
            let offset = if row % 2 == 1 { s / 2.0 } else { 0.0 };
            let mut x = (bb.x0 / s).floor() * s + offset;
            while x <= bb.x1 + s {
                if point_in_polygon((x, y), poly) {
                    emit((x, y), s);
                }
                x += s;
            }
            y += s;
            row += 1;
        }
    };
    let (mut rings, mut solids) = (Vec::new(), Vec::new());
    grid(hatch.density('o'), Box::new(|c, s| rings.push((c, s * 0.2))));
    grid(hatch.density('O'), Box::new(|c, s| rings.push((c, s * 0.35))));
    grid(hatch.density('.'), Box::new(|c, s| solids.push(regular_polygon(c, s * 0.1, 8, 0.0))));
    grid(hatch.density('*'), Box::new(|c, s| solids.push(star_polygon(c, s * 0.3, 5))));
    g.rings = rings;
    g.solids = solids;
    g
}

/// Vertices of a regular `n`-gon with the first vertex at `rot` radians from "up".
pub fn regular_polygon(c: Px, r: f64, n: usize, rot: f64) -> Vec<Px> {
    (0..n)
        .map(|i| {
            let a = rot + 2.0 * PI * i as f64 / n as f64;
            (c.0 + r * a.sin(), c.1 - r * a.cos())
        })
        .collect()
}

pub fn star_polygon(c: Px, r: f64, points: usize) -> Vec<Px> {
    let inner = r * 0.381966;
    (0..points * 2)
        .map(|i| {
            let a = PI * i as f64 / points as f64;
            let rr = if i % 2 == 0 { r } else { inner };
            (c.0 + rr * a.sin(), c.1 - rr * a.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_crossing_is_trimmed() {
        let r = PxRect::new(0.0, 0.0, 10.0, 10.0);
        let (a, b) = clip_segment((-5.0, 5.0), (15.0, 5.0), &r).unwrap();
        assert_eq!(a, (0.0, 5.0));
        assert_eq!(b, (10.0, 5.0));
        assert!(clip_segment((-5.0, -5.0), (-1.0, -1.0), &r).is_none());
    }

    #[test]
    fn polyline_leaving_and_reentering_splits() {
        let r = PxRect::new(0.0, 0.0, 10.0, 10.0);
        let runs = clip_polyline(&[(1.0, 1.0), (5.0, 20.0), (9.0, 1.0)], &r);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn polygon_clip_of_larger_square_is_the_rect() {
        let r = PxRect::new(0.0, 0.0, 10.0, 10.0);
        let out = clip_polygon(&[(-5.0, -5.0), (15.0, -5.0), (15.0, 15.0), (-5.0, 15.0)], &r);
        let bb = PxRect::from_points(&out).unwrap();
        assert_eq!(bb, r);
    }

    #[test]
    fn dashes_cover_half_of_an_even_pattern() {
        let pieces = dash_polyline(&[(0.0, 0.0), (100.0, 0.0)], &[10.0, 10.0]);
        assert_eq!(pieces.len(), 5);
        let len: f64 = pieces.iter().map(|p| p.last().unwrap().0 - p[0].0).sum();
        assert!((len - 50.0).abs() < 1e-9);
    }

    #[test]
    fn hatch_lines_stay_inside() {
        let sq = vec![(0.0, 0.0), (72.0, 0.0), (72.0, 72.0), (0.0, 72.0)];
        let g = hatch_geometry(&sq, &Hatch::new("/").unwrap(), 72.0);
        assert!(!g.lines.is_empty());
        let r = PxRect::new(-1e-6, -1e-6, 72.0 + 1e-6, 72.0 + 1e-6);
        assert!(g.lines.iter().all(|(a, b)| r.contains(*a) && r.contains(*b)));
    }
}
