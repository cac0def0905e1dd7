//! Draw primitives recorded on an [`Axes`](super::Axes).
//!
//! Artists live in data coordinates (or axes fractions for some text) and are
//! turned into pixels only at render time.

use crate::color::Color;
use crate::style::{FontFamily, FontSlant, FontWeight, Hatch, LineStyle, Marker};

/// Default draw order per artist kind; explicit z-orders override these.
pub mod z {
    pub const PATCH: f64 = 1.0;
    /// Grid lines sit between fills and lines.
    pub const GRID: f64 = 1.5;
    pub const LINE: f64 = 2.0;
    pub const MARKER: f64 = 3.0;
    pub const TEXT: f64 = 4.0;
}

/// Line appearance. Widths are in points.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub style: LineStyle,
    pub alpha: f64,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Stroke {
            color,
            width,
            style: LineStyle::Solid,
            alpha: 1.0,
        }
    }

    pub fn styled(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn is_visible(&self) -> bool {
        !self.style.is_none() && self.width > 0.0 && !self.color.is_none() && self.alpha > 0.0
    }
}

/// Fill + edge + hatch of a closed shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub face: Color,
    pub face_alpha: f64,
    pub edge: Option<Stroke>,
    pub hatch: Hatch,
    pub hatch_color: Color,
    pub hatch_width: f64,
}

impl Patch {
    pub fn filled(face: Color, alpha: f64) -> Self {
        Patch {
            face,
            face_alpha: alpha,
            edge: None,
            hatch: Hatch::none(),
            hatch_color: face,
            hatch_width: 1.0,
        }
    }

    pub fn edge(mut self, stroke: Stroke) -> Self {
        self.edge = Some(stroke);
        self
    }

    pub fn hatch(mut self, hatch: Hatch, color: Color) -> Self {
        self.hatch = hatch;
        self.hatch_color = color;
        self
    }
}

/// Font description; sizes in points.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub family: FontFamily,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub color: Color,
}

impl FontSpec {
    pub fn new(size: f64) -> Self {
        FontSpec {
            size,
            family: FontFamily::SansSerif,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            color: Color::BLACK,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Which coordinate system a text position is given in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coords {
    Data,
    /// `(0, 0)` is the lower-left corner of the axes, `(1, 1)` the upper-right.
    Axes,
    /// x in data units, y as an axes fraction.
    XDataYAxes,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextArtist {
    pub text: String,
    pub pos: (f64, f64),
    pub coords: Coords,
    pub font: FontSpec,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Semi-transparent white box behind the text.
    pub background: Option<Color>,
}

impl TextArtist {
    pub fn new(text: impl Into<String>, pos: (f64, f64), font: FontSpec) -> Self {
        TextArtist {
            text: text.into(),
            pos,
            coords: Coords::Data,
            font,
            h_align: HAlign::Center,
            v_align: VAlign::Center,
            background: None,
        }
    }

    pub fn coords(mut self, coords: Coords) -> Self {
        self.coords = coords;
        self
    }

    pub fn align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

/// Marker appearance; `size` is the marker's diameter in points.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub marker: Marker,
    pub size: f64,
    pub face: Color,
    pub edge: Color,
    pub edge_width: f64,
    pub alpha: f64,
}

/// One quadrilateral of a 3D surface with its face color.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad3 {
    pub corners: [(f64, f64, f64); 4],
    pub face: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Artist {
    Line {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Markers {
        points: Vec<(f64, f64)>,
        style: MarkerStyle,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        patch: Patch,
    },
    Text(TextArtist),
    /// A vertical (`vertical == true`, at x = value) or horizontal line across the whole axes.
    AxLine {
        value: f64,
        vertical: bool,
        stroke: Stroke,
    },
    Surface {
        quads: Vec<Quad3>,
        alpha: f64,
        edge: Option<Stroke>,
    },
    Line3 {
        points: Vec<(f64, f64, f64)>,
        stroke: Stroke,
    },
}

impl Artist {
    pub fn default_z(&self) -> f64 {
        match self {
            Artist::Polygon { .. } | Artist::Surface { .. } => z::PATCH,
            Artist::Line { .. } | Artist::AxLine { .. } | Artist::Line3 { .. } => z::LINE,
            Artist::Markers { .. } => z::MARKER,
            Artist::Text(_) => z::TEXT,
        }
    }

    /// Data-space extent as `(xmin, xmax, ymin, ymax)`, ignoring non-finite values.
    /// Axes-relative artists do not contribute.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let pts: Box<dyn Iterator<Item = (f64, f64)> + '_> = match self {
            Artist::Line { points, .. }
            | Artist::Markers { points, .. }
            | Artist::Polygon { points, .. } => Box::new(points.iter().copied()),
            Artist::Text(t) if t.coords == Coords::Data => Box::new(std::iter::once(t.pos)),
            Artist::Surface { quads, .. } => Box::new(
                quads
                    .iter()
                    .flat_map(|q| q.corners.iter().map(|(x, y, _)| (*x, *y))),
            ),
            Artist::Line3 { points, .. } => Box::new(points.iter().map(|(x, y, _)| (*x, *y))),
            _ => return None,
        };
        let mut ext: Option<(f64, f64, f64, f64)> = None;
        for (x, y) in pts.filter(|(x, y)| x.is_finite() && y.is_finite()) {
            ext = Some(match ext {
                None => (x, x, y, y),
                Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
            });
        }
        ext
    }

    /// z-range of 3D artists.
    pub fn z_extent(&self) -> Option<(f64, f64)> {
        let zs: Vec<f64> = match self {
            Artist::Surface { quads, .. } => quads
                .iter()
                .flat_map(|q| q.corners.iter().map(|c| c.2))
                .collect(),
            Artist::Line3 { points, .. } => points.iter().map(|p| p.2).collect(),
            _ => return None,
        };
        let finite = zs.into_iter().filter(|z| z.is_finite());
        finite.fold(None, |acc, z| match acc {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })
    }
}

/// An artist plus its draw order. Ties keep insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Layered {
    pub z: f64,
    pub artist: Artist,
}

/// How a legend entry is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum LegendHandle {
    Line {
        stroke: Option<Stroke>,
        marker: Option<MarkerStyle>,
    },
    Patch(Patch),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub handle: LegendHandle,
}
