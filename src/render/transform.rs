//! Data-to-pixel mapping for one axes.

use crate::figure::Coords;
use crate::style::Scale;

use super::geom::{Px, PxRect};

/// Maps values on one axis to pixels. Inverted limits flip the direction.
#[derive(Clone, Copy, Debug)]
pub struct AxisMap {
    pub scale: Scale,
    pub lo: f64,
    pub hi: f64,
    t0: f64,
    t1: f64,
    p0: f64,
    p1: f64,
}

impl AxisMap {
    /// `p0` is the pixel of `limits.0`, `p1` the pixel of `limits.1`.
    pub fn new(scale: Scale, limits: (f64, f64), p0: f64, p1: f64) -> Self {
        let (mut t0, mut t1) = (scale.forward(limits.0), scale.forward(limits.1));
        if !t0.is_finite() || !t1.is_finite() || (t1 - t0).abs() < 1e-300 {
            // degenerate limits: fall back to a unit span around the finite end
            let base = if t0.is_finite() { t0 } else if t1.is_finite() { t1 } else { 0.0 };
            t0 = base - 0.5;
            t1 = base + 0.5;
        }
        AxisMap {
            scale,
            lo: limits.0,
            hi: limits.1,
            t0,
            t1,
            p0,
            p1,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        let t = self.scale.forward(v);
        self.p0 + (t - self.t0) / (self.t1 - self.t0) * (self.p1 - self.p0)
    }

    pub fn inverse(&self, px: f64) -> f64 {
        let t = self.t0 + (px - self.p0) / (self.p1 - self.p0) * (self.t1 - self.t0);
        self.scale.inverse(t)
    }

    /// Position of an axes fraction (0 at `p0`, 1 at `p1`).
    pub fn fraction(&self, f: f64) -> f64 {
        self.p0 + f * (self.p1 - self.p0)
    }

    /// Whether `v` lies within the limits (either orientation).
    pub fn contains(&self, v: f64) -> bool {
        let t = self.scale.forward(v);
        let (a, b) = (self.t0.min(self.t1), self.t0.max(self.t1));
        let eps = (b - a) * 1e-9;
        t.is_finite() && t >= a - eps && t <= b + eps
    }

    /// Pixels per unit of scale space, signed.
    pub fn slope(&self) -> f64 {
        (self.p1 - self.p0) / (self.t1 - self.t0)
    }
}

/// Data space of one Cartesian axes mapped onto its plot rectangle.
#[derive(Clone, Copy, Debug)]
pub struct DataTransform {
    pub x: AxisMap,
    pub y: AxisMap,
    pub rect: PxRect,
}

impl DataTransform {
    pub fn new(rect: PxRect, x: (Scale, (f64, f64)), y: (Scale, (f64, f64))) -> Self {
        DataTransform {
            x: AxisMap::new(x.0, x.1, rect.x0, rect.x1),
            y: AxisMap::new(y.0, y.1, rect.y1, rect.y0),
            rect,
        }
    }

    pub fn to_px(&self, p: (f64, f64)) -> Px {
        (self.x.map(p.0), self.y.map(p.1))
    }

    pub fn map_points(&self, points: &[(f64, f64)]) -> Vec<Px> {
        points.iter().map(|p| self.to_px(*p)).collect()
    }

    pub fn place(&self, pos: (f64, f64), coords: Coords) -> Px {
        match coords {
            Coords::Data => self.to_px(pos),
            Coords::Axes => (self.x.fraction(pos.0), self.y.fraction(pos.1)),
            Coords::XDataYAxes => (self.x.map(pos.0), self.y.fraction(pos.1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_axis_points_up() {
        let t = DataTransform::new(
            PxRect::new(0.0, 0.0, 100.0, 50.0),
            (Scale::Linear, (0.0, 10.0)),
            (Scale::Linear, (0.0, 1.0)),
        );
        assert_eq!(t.to_px((0.0, 0.0)), (0.0, 50.0));
        assert_eq!(t.to_px((10.0, 1.0)), (100.0, 0.0));
    }

    #[test]
    fn log_axis_spaces_decades_evenly() {
        let m = AxisMap::new(Scale::Log, (1.0, 100.0), 0.0, 200.0);
        assert!((m.map(10.0) - 100.0).abs() < 1e-9);
        assert!(m.map(-1.0).is_nan());
        assert!((m.inverse(100.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn inverted_limits_flip() {
        let m = AxisMap::new(Scale::Linear, (5.0, 0.0), 0.0, 100.0);
        assert_eq!(m.map(5.0), 0.0);
        assert!(m.contains(2.0));
        assert!(!m.contains(6.0));
    }
}
