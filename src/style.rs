//! Small string-backed style enums: line dashes, markers, hatches, fonts and
//! axis options.
//!
//! Every enum parses from the short strings used in configuration files
//! (`"--"`, `"upper right"`, `"bold"`, …), accepts a few long-form aliases and
//! serialises back to its canonical spelling.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PlotError;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $option:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $canon:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $canon ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = PlotError;

            fn from_str(s: &str) -> Result<Self, PlotError> {
                let t = s.trim();
                $(
                    // Single-character codes are case-sensitive ("d" vs "D").
                    if t == $canon
                        || ($canon.len() > 1 && t.eq_ignore_ascii_case($canon))
                        $(|| t.eq_ignore_ascii_case($alias))*
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(PlotError::invalid_option(
                    $option,
                    s,
                    &[$($canon),+],
                ))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// Line dash pattern. `None` suppresses the line entirely.
    LineStyle, "line_style" {
        None => "" | "none",
        Solid => "-" | "solid",
        Dashed => "--" | "dashed",
        DashDot => "-." | "dashdot",
        Dotted => ":" | "dotted",
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle::Solid
    }
}

impl LineStyle {
    pub fn is_none(&self) -> bool {
        matches!(self, LineStyle::None)
    }

    /// On/off lengths in units of the line width.
    pub fn dash_pattern(&self) -> Option<&'static [f64]> {
        match self {
            LineStyle::None | LineStyle::Solid => None,
            LineStyle::Dashed => Some(&[3.7, 1.6]),
            LineStyle::DashDot => Some(&[6.4, 1.6, 1.0, 1.6]),
            LineStyle::Dotted => Some(&[1.0, 1.65]),
        }
    }
}

string_enum! {
    /// Marker shape for data points.
    Marker, "marker" {
        None => "" | "none",
        Circle => "o" | "circle",
        Square => "s" | "square",
        TriangleUp => "^" | "triangle",
        TriangleDown => "v",
        TriangleLeft => "<",
        TriangleRight => ">",
        ThinDiamond => "d",
        Diamond => "D" | "diamond",
        Star => "*" | "star",
        X => "x",
        Plus => "+" | "plus",
        Point => "." | "point",
        Pentagon => "p" | "pentagon",
        Hexagon => "h" | "hexagon",
    }
}

impl Default for Marker {
    fn default() -> Self {
        Marker::None
    }
}

impl Marker {
    pub fn is_none(&self) -> bool {
        matches!(self, Marker::None)
    }

    /// Markers drawn as strokes only (no face).
    pub fn is_line_art(&self) -> bool {
        matches!(self, Marker::X | Marker::Plus)
    }
}

string_enum! {
    FontWeight, "font weight" {
        Normal => "normal",
        Bold => "bold" | "heavy" | "semibold",
    }
}

string_enum! {
    FontSlant, "font style" {
        Normal => "normal",
        Italic => "italic",
        Oblique => "oblique",
    }
}

string_enum! {
    Scale, "axis scale" {
        Linear => "linear",
        Log => "log",
        SymLog => "symlog",
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Linear
    }
}

impl Scale {
    /// Half-width of the linear region of the symmetric log scale.
    pub const SYMLOG_LINTHRESH: f64 = 1.0;

    /// Whether `v` can be placed on this scale.
    pub fn accepts(&self, v: f64) -> bool {
        match self {
            Scale::Log => v > 0.0,
            _ => true,
        }
    }

    /// Data value to the linear space ticks and pixels are computed in.
    pub fn forward(&self, v: f64) -> f64 {
        match self {
            Scale::Linear => v,
            Scale::Log => {
                if v > 0.0 {
                    v.log10()
                } else {
                    f64::NAN
                }
            }
            Scale::SymLog => v.signum() * (1.0 + v.abs() / Self::SYMLOG_LINTHRESH).log10(),
        }
    }

    pub fn inverse(&self, t: f64) -> f64 {
        match self {
            Scale::Linear => t,
            Scale::Log => 10f64.powf(t),
            Scale::SymLog => t.signum() * Self::SYMLOG_LINTHRESH * (10f64.powf(t.abs()) - 1.0),
        }
    }
}

string_enum! {
    GridWhich, "grid_which" {
        Major => "major",
        Minor => "minor",
        Both => "both",
    }
}

string_enum! {
    GridAxis, "grid_axis" {
        Both => "both",
        X => "x",
        Y => "y",
    }
}

string_enum! {
    LegendLocation, "legend_location" {
        Best => "best",
        UpperRight => "upper right",
        UpperLeft => "upper left",
        LowerLeft => "lower left",
        LowerRight => "lower right",
        Right => "right",
        CenterLeft => "center left",
        CenterRight => "center right",
        LowerCenter => "lower center",
        UpperCenter => "upper center",
        Center => "center",
    }
}

string_enum! {
    Orientation, "orientation" {
        Vertical => "vertical" | "v",
        Horizontal => "horizontal" | "h",
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::Vertical
    }
}

/// Font family name. The three generic families map to bundled fonts; any
/// other name is kept for serialisation and rendered with the sans-serif font.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontFamily {
    SansSerif,
    Serif,
    Monospace,
    Other(String),
}

impl FontFamily {
    pub fn as_str(&self) -> &str {
        match self {
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
            FontFamily::Other(s) => s,
        }
    }

    /// Name of the registered font to render with.
    pub fn render_name(&self) -> &'static str {
        match self {
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
            FontFamily::SansSerif | FontFamily::Other(_) => "sans-serif",
        }
    }
}

impl From<String> for FontFamily {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans-serif" | "sans" | "sansserif" | "dejavu sans" | "arial" | "helvetica" => {
                FontFamily::SansSerif
            }
            "serif" | "times" | "times new roman" | "dejavu serif" => FontFamily::Serif,
            "monospace" | "mono" | "courier" | "dejavu sans mono" => FontFamily::Monospace,
            _ => FontFamily::Other(s),
        }
    }
}

impl From<&str> for FontFamily {
    fn from(s: &str) -> Self {
        FontFamily::from(s.to_string())
    }
}

impl From<FontFamily> for String {
    fn from(f: FontFamily) -> String {
        f.as_str().to_string()
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        FontFamily::SansSerif
    }
}

/// A fill pattern such as `"//"` or `"x."`. Repeating a symbol raises its density.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hatch(String);

impl Hatch {
    const SYMBOLS: &'static str = "/\\|-+xXoO.*";

    pub fn new(pattern: &str) -> Result<Self, PlotError> {
        if let Some(bad) = pattern.chars().find(|c| !Self::SYMBOLS.contains(*c)) {
            return Err(PlotError::invalid_option(
                "hatch",
                &bad.to_string(),
                &["/", "\\", "|", "-", "+", "x", "o", "O", ".", "*"],
            ));
        }
        Ok(Hatch(pattern.to_string()))
    }

    pub fn none() -> Self {
        Hatch(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// How many times `symbol` occurs in the pattern.
    pub fn density(&self, symbol: char) -> usize {
        self.0.chars().filter(|c| *c == symbol).count()
    }
}

impl FromStr for Hatch {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, PlotError> {
        Hatch::new(s)
    }
}

impl TryFrom<String> for Hatch {
    type Error = PlotError;

    fn try_from(s: String) -> Result<Self, PlotError> {
        Hatch::new(&s)
    }
}

impl From<Hatch> for String {
    fn from(h: Hatch) -> String {
        h.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_aliases_and_print_canonical() {
        assert_eq!("dashed".parse::<LineStyle>().unwrap(), LineStyle::Dashed);
        assert_eq!(LineStyle::Dashed.to_string(), "--");
        assert_eq!("".parse::<LineStyle>().unwrap(), LineStyle::None);
        assert_eq!("Upper Right".parse::<LegendLocation>().unwrap(), LegendLocation::UpperRight);
        assert_eq!("D".parse::<Marker>().unwrap(), Marker::Diamond);
        assert_eq!("d".parse::<Marker>().unwrap(), Marker::ThinDiamond);
    }

    #[test]
    fn bad_orientation_lists_choices() {
        let err = "diagonal".parse::<Orientation>().unwrap_err().to_string();
        assert!(err.contains("vertical"), "{err}");
        assert!(err.contains("horizontal"), "{err}");
    }

    #[test]
    fn hatch_rejects_unknown_symbols() {
        assert!(Hatch::new("//").is_ok());
        assert!(Hatch::new("#").is_err());
        assert_eq!(Hatch::new("///").unwrap().density('/'), 3);
    }

    #[test]
    fn font_family_keeps_unknown_names() {
        let f = FontFamily::from("Comic Sans");
        assert_eq!(f.as_str(), "Comic Sans");
        assert_eq!(f.render_name(), "sans-serif");
        assert_eq!(FontFamily::from("serif"), FontFamily::Serif);
    }
}
