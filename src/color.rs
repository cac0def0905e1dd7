//! Colors, the default color cycle and named color maps.

use plotters::style::RGBAColor;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{PlotError, Result};

/// RGBA color. Alpha is kept as a byte so that settings compare exactly after a
/// YAML round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const NONE: Color = Color::new(0, 0, 0, 0);

    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn is_none(&self) -> bool {
        self.a == 0
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// Convert for plotters, multiplying the stored alpha by `alpha`.
    pub fn to_rgba(&self, alpha: f64) -> RGBAColor {
        RGBAColor(self.r, self.g, self.b, (self.alpha() * alpha).clamp(0.0, 1.0))
    }

    /// Relative luminance (sRGB, gamma-expanded), used to pick readable text colors.
    pub fn luminance(&self) -> f64 {
        let lin = |c: u8| {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * lin(self.r) + 0.7152 * lin(self.g) + 0.0722 * lin(self.b)
    }

    /// Linear blend towards `other`; `t = 0` keeps `self`.
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else if self.a == 0 {
            "none".to_string()
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Microsoft Office (2013+) chart series palette, used as the default color cycle.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [Color; 10] = [
    Color::rgb(68, 114, 196),  // blue      (#4472C4)
    Color::rgb(237, 125, 49),  // orange    (#ED7D31)
    Color::rgb(165, 165, 165), // gray      (#A5A5A5)
    Color::rgb(255, 192, 0),   // gold      (#FFC000)
    Color::rgb(91, 155, 213),  // light blue(#5B9BD5)
    Color::rgb(112, 173, 71),  // green     (#70AD47)
    Color::rgb(38, 68, 120),   // dark blue (#264478)
    Color::rgb(158, 72, 14),   // dark org. (#9E480E)
    Color::rgb(99, 99, 99),    // dark gray (#636363)
    Color::rgb(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the default cycle.
#[inline]
pub fn cycle_color(idx: usize) -> Color {
    OFFICE10[idx % OFFICE10.len()]
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "black" | "k" => Color::rgb(0, 0, 0),
        "white" | "w" => Color::rgb(255, 255, 255),
        "red" | "r" => Color::rgb(255, 0, 0),
        "green" | "g" => Color::rgb(0, 128, 0),
        "blue" | "b" => Color::rgb(0, 0, 255),
        "cyan" | "c" => Color::rgb(0, 191, 191),
        "magenta" | "m" => Color::rgb(191, 0, 191),
        "yellow" | "y" => Color::rgb(191, 191, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "lightgray" | "lightgrey" => Color::rgb(211, 211, 211),
        "darkgray" | "darkgrey" => Color::rgb(169, 169, 169),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "brown" => Color::rgb(165, 42, 42),
        "pink" => Color::rgb(255, 192, 203),
        "navy" => Color::rgb(0, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "olive" => Color::rgb(128, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "maroon" => Color::rgb(128, 0, 0),
        "gold" => Color::rgb(255, 215, 0),
        "silver" => Color::rgb(192, 192, 192),
        "steelblue" => Color::rgb(70, 130, 180),
        "skyblue" => Color::rgb(135, 206, 235),
        "lightblue" => Color::rgb(173, 216, 230),
        "darkblue" => Color::rgb(0, 0, 139),
        "darkred" => Color::rgb(139, 0, 0),
        "darkgreen" => Color::rgb(0, 100, 0),
        "lightgreen" => Color::rgb(144, 238, 144),
        "coral" => Color::rgb(255, 127, 80),
        "salmon" => Color::rgb(250, 128, 114),
        "tomato" => Color::rgb(255, 99, 71),
        "crimson" => Color::rgb(220, 20, 60),
        "indigo" => Color::rgb(75, 0, 130),
        "violet" => Color::rgb(238, 130, 238),
        "tan" => Color::rgb(210, 180, 140),
        "beige" => Color::rgb(245, 245, 220),
        "ivory" => Color::rgb(255, 255, 240),
        "none" | "transparent" => Color::NONE,
        _ => return None,
    };
    Some(c)
}

fn hex_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("static regex")
    })
}

impl FromStr for Color {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        if let Some(caps) = hex_regex().captures(t) {
            let digits = &caps[1];
            let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
            let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
            let parsed = match digits.len() {
                3 => (nibble(0), nibble(1), nibble(2), Ok(255)),
                6 => (byte(0), byte(2), byte(4), Ok(255)),
                _ => (byte(0), byte(2), byte(4), byte(6)),
            };
            return match parsed {
                (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Color::new(r, g, b, a)),
                _ => Err(PlotError::InvalidColor(s.to_string())),
            };
        }
        let lower = t.to_ascii_lowercase();
        // Cycle references: C0..C9
        if let Some(rest) = lower.strip_prefix('c')
            && rest.len() == 1
            && let Some(d) = rest.chars().next().and_then(|c| c.to_digit(10))
        {
            return Ok(cycle_color(d as usize));
        }
        named(&lower).ok_or_else(|| PlotError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ------------------------ Color maps ------------------------

const VIRIDIS: &[[u8; 3]] = &[
    [0x44, 0x01, 0x54], [0x48, 0x28, 0x78], [0x3E, 0x4A, 0x89], [0x31, 0x68, 0x8E],
    [0x26, 0x82, 0x8E], [0x1F, 0x9E, 0x89], [0x35, 0xB7, 0x79], [0x6D, 0xCD, 0x59],
    [0xB4, 0xDE, 0x2C], [0xFD, 0xE7, 0x25],
];
const PLASMA: &[[u8; 3]] = &[
    [0x0D, 0x08, 0x87], [0x46, 0x03, 0x9F], [0x72, 0x01, 0xA8], [0x9C, 0x17, 0x9E],
    [0xBD, 0x37, 0x86], [0xD8, 0x57, 0x6B], [0xED, 0x79, 0x53], [0xFB, 0x9F, 0x3A],
    [0xFD, 0xCA, 0x26], [0xF0, 0xF9, 0x21],
];
const INFERNO: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04], [0x1B, 0x0C, 0x41], [0x4A, 0x0C, 0x6B], [0x78, 0x1C, 0x6D],
    [0xA5, 0x2C, 0x60], [0xCF, 0x44, 0x46], [0xED, 0x69, 0x25], [0xFB, 0x9B, 0x06],
    [0xF7, 0xD1, 0x3D], [0xFC, 0xFF, 0xA4],
];
const MAGMA: &[[u8; 3]] = &[
    [0x00, 0x00, 0x04], [0x18, 0x0F, 0x3D], [0x44, 0x0F, 0x76], [0x72, 0x1F, 0x81],
    [0x9E, 0x2F, 0x7F], [0xCD, 0x40, 0x71], [0xF1, 0x60, 0x5D], [0xFD, 0x96, 0x68],
    [0xFE, 0xCA, 0x8D], [0xFC, 0xFD, 0xBF],
];
const CIVIDIS: &[[u8; 3]] = &[
    [0x00, 0x22, 0x4E], [0x12, 0x35, 0x70], [0x3B, 0x49, 0x6C], [0x57, 0x5D, 0x6D],
    [0x70, 0x71, 0x73], [0x8A, 0x87, 0x79], [0xA6, 0x9D, 0x75], [0xC4, 0xB5, 0x6C],
    [0xE4, 0xCF, 0x5B], [0xFE, 0xE8, 0x38],
];
const COOLWARM: &[[u8; 3]] = &[
    [0x3B, 0x4C, 0xC0], [0x6F, 0x92, 0xF3], [0xAA, 0xC7, 0xFD], [0xDD, 0xDD, 0xDD],
    [0xF7, 0xB8, 0x9C], [0xE7, 0x74, 0x5B], [0xB4, 0x04, 0x26],
];
const RDBU: &[[u8; 3]] = &[
    [0x67, 0x00, 0x1F], [0xB2, 0x18, 0x2B], [0xD6, 0x60, 0x4D], [0xF4, 0xA5, 0x82],
    [0xFD, 0xDB, 0xC7], [0xF7, 0xF7, 0xF7], [0xD1, 0xE5, 0xF0], [0x92, 0xC5, 0xDE],
    [0x43, 0x93, 0xC3], [0x21, 0x66, 0xAC], [0x05, 0x30, 0x61],
];
const RDYLGN: &[[u8; 3]] = &[
    [0xA5, 0x00, 0x26], [0xD7, 0x30, 0x27], [0xF4, 0x6D, 0x43], [0xFD, 0xAE, 0x61],
    [0xFE, 0xE0, 0x8B], [0xFF, 0xFF, 0xBF], [0xD9, 0xEF, 0x8B], [0xA6, 0xD9, 0x6A],
    [0x66, 0xBD, 0x63], [0x1A, 0x98, 0x50], [0x00, 0x68, 0x37],
];
const BLUES: &[[u8; 3]] = &[
    [0xF7, 0xFB, 0xFF], [0xDE, 0xEB, 0xF7], [0xC6, 0xDB, 0xEF], [0x9E, 0xCA, 0xE1],
    [0x6B, 0xAE, 0xD6], [0x42, 0x92, 0xC6], [0x21, 0x71, 0xB5], [0x08, 0x51, 0x9C],
    [0x08, 0x30, 0x6B],
];
const GREENS: &[[u8; 3]] = &[
    [0xF7, 0xFC, 0xF5], [0xE5, 0xF5, 0xE0], [0xC7, 0xE9, 0xC0], [0xA1, 0xD9, 0x9B],
    [0x74, 0xC4, 0x76], [0x41, 0xAB, 0x5D], [0x23, 0x8B, 0x45], [0x00, 0x6D, 0x2C],
    [0x00, 0x44, 0x1B],
];
const REDS: &[[u8; 3]] = &[
    [0xFF, 0xF5, 0xF0], [0xFE, 0xE0, 0xD2], [0xFC, 0xBB, 0xA1], [0xFC, 0x92, 0x72],
    [0xFB, 0x6A, 0x4A], [0xEF, 0x3B, 0x2C], [0xCB, 0x18, 0x1D], [0xA5, 0x0F, 0x15],
    [0x67, 0x00, 0x0D],
];
const GREYS: &[[u8; 3]] = &[
    [0xFF, 0xFF, 0xFF], [0xF0, 0xF0, 0xF0], [0xD9, 0xD9, 0xD9], [0xBD, 0xBD, 0xBD],
    [0x96, 0x96, 0x96], [0x73, 0x73, 0x73], [0x52, 0x52, 0x52], [0x25, 0x25, 0x25],
    [0x00, 0x00, 0x00],
];
const GRAY: &[[u8; 3]] = &[[0, 0, 0], [255, 255, 255]];
const HOT: &[[u8; 3]] = &[[0x0B, 0x00, 0x00], [0xFF, 0x00, 0x00], [0xFF, 0xFF, 0x00], [0xFF, 0xFF, 0xFF]];
const JET: &[[u8; 3]] = &[
    [0x00, 0x00, 0x7F], [0x00, 0x00, 0xFF], [0x00, 0x7F, 0xFF], [0x00, 0xFF, 0xFF],
    [0x7F, 0xFF, 0x7F], [0xFF, 0xFF, 0x00], [0xFF, 0x7F, 0x00], [0xFF, 0x00, 0x00],
    [0x7F, 0x00, 0x00],
];

const COLORMAPS: &[(&str, &[[u8; 3]])] = &[
    ("viridis", VIRIDIS),
    ("plasma", PLASMA),
    ("inferno", INFERNO),
    ("magma", MAGMA),
    ("cividis", CIVIDIS),
    ("coolwarm", COOLWARM),
    ("RdBu", RDBU),
    ("RdYlGn", RDYLGN),
    ("Blues", BLUES),
    ("Greens", GREENS),
    ("Reds", REDS),
    ("Greys", GREYS),
    ("gray", GRAY),
    ("hot", HOT),
    ("jet", JET),
];

/// A piecewise-linear color map sampled on `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Colormap {
    name: String,
    stops: &'static [[u8; 3]],
    reversed: bool,
}

impl Colormap {
    /// Look up a map by name; a `_r` suffix reverses it.
    pub fn by_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(b) => (b, true),
            None => (name, false),
        };
        COLORMAPS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(base))
            .map(|(_, stops)| Colormap {
                name: name.to_string(),
                stops,
                reversed,
            })
            .ok_or_else(|| {
                PlotError::invalid_option("colormap", name, &Colormap::names())
            })
    }

    pub fn names() -> Vec<&'static str> {
        COLORMAPS.iter().map(|(n, _)| *n).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample at `t`; values outside `[0, 1]` are clamped, NaN maps to the low end.
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        let n = self.stops.len();
        let pos = t * (n - 1) as f64;
        let i = (pos.floor() as usize).min(n - 2);
        let frac = pos - i as f64;
        let [r0, g0, b0] = self.stops[i];
        let [r1, g1, b1] = self.stops[i + 1];
        Color::rgb(r0, g0, b0).lerp(&Color::rgb(r1, g1, b1), frac)
    }

    /// Sample a value against a `[vmin, vmax]` normalisation.
    pub fn map(&self, v: f64, vmin: f64, vmax: f64) -> Color {
        let span = vmax - vmin;
        if span.abs() < f64::EPSILON {
            return self.sample(0.5);
        }
        self.sample((v - vmin) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!("#0066CC".parse::<Color>().unwrap(), Color::rgb(0, 0x66, 0xCC));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("Black".parse::<Color>().unwrap(), Color::BLACK);
        assert!("none".parse::<Color>().unwrap().is_none());
        assert_eq!("C1".parse::<Color>().unwrap(), cycle_color(1));
        assert!("#12345".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn hex_round_trip_keeps_alpha() {
        let c = Color::new(1, 2, 3, 128);
        assert_eq!(c.to_hex().parse::<Color>().unwrap(), c);
    }

    #[test]
    fn colormap_endpoints_and_reverse() {
        let v = Colormap::by_name("viridis").unwrap();
        assert_eq!(v.sample(0.0), Color::rgb(0x44, 0x01, 0x54));
        assert_eq!(v.sample(1.0), Color::rgb(0xFD, 0xE7, 0x25));
        let r = Colormap::by_name("viridis_r").unwrap();
        assert_eq!(r.sample(0.0), v.sample(1.0));
        assert!(Colormap::by_name("nope").is_err());
    }
}
