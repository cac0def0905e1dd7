//! Per-series styling bound to the data it styles.
//!
//! A [`SeriesStyle`] is built once through [`SeriesStyleBuilder`], which checks
//! the x/y lengths and derives the color-dependent fields from the primary
//! color. After that the data is read-only; styling fields stay public so a
//! clone can be tweaked (`let mut s2 = s.clone(); s2.color = …`).

use std::fmt;

use crate::color::Color;
use crate::error::{PlotError, Result};
use crate::style::{Hatch, LineStyle, Marker};

pub const DEFAULT_SERIES_COLOR: Color = Color::rgb(0x00, 0x66, 0xCC);

/// What a series draws, derived from its line style and marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotType {
    Line,
    Scatter,
    LineScatter,
    /// Neither a line nor a marker; rejected when drawn.
    None,
}

impl PlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotType::Line => "line",
            PlotType::Scatter => "scatter",
            PlotType::LineScatter => "line+scatter",
            PlotType::None => "none",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    y: Vec<f64>,
    x: Option<Vec<f64>>,
    pub label: String,
    pub color: Color,
    pub line_style: LineStyle,
    pub line_width: f64,
    pub line_alpha: f64,
    pub marker: Marker,
    pub marker_size: f64,
    pub marker_facecolor: Color,
    pub marker_edgecolor: Color,
    pub marker_edgewidth: f64,
    /// Hatch for bar/area/histogram patches.
    pub hatch: Hatch,
    pub fill_below: bool,
    pub fill_color: Color,
    pub fill_alpha: f64,
    pub fill_hatch: Hatch,
    pub hatch_color: Color,
    pub z_order: Option<i32>,
}

impl SeriesStyle {
    pub fn builder<I, T>(y: I) -> SeriesStyleBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        SeriesStyleBuilder::new(y)
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn x(&self) -> Option<&[f64]> {
        self.x.as_deref()
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Explicit x values, or `0, 1, 2, …` when none were given.
    pub fn x_or_index(&self) -> Vec<f64> {
        match &self.x {
            Some(x) => x.clone(),
            None => (0..self.y.len()).map(|i| i as f64).collect(),
        }
    }

    /// `(x, y)` pairs, using the index for missing x.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x_or_index().into_iter().zip(self.y.iter().copied()).collect()
    }

    pub fn has_line(&self) -> bool {
        !self.line_style.is_none()
    }

    pub fn has_marker(&self) -> bool {
        !self.marker.is_none()
    }

    pub fn plot_type(&self) -> PlotType {
        match (self.has_line(), self.has_marker()) {
            (true, true) => PlotType::LineScatter,
            (true, false) => PlotType::Line,
            (false, true) => PlotType::Scatter,
            (false, false) => PlotType::None,
        }
    }

    /// Fails for a series that would draw nothing.
    pub fn ensure_drawable(&self) -> Result<()> {
        if self.plot_type() == PlotType::None {
            return Err(PlotError::InvalidSeries {
                label: self.label.clone(),
            });
        }
        Ok(())
    }

    /// Same styling bound to different data. The new data is validated like a fresh build.
    pub fn with_data(&self, x: Option<Vec<f64>>, y: Vec<f64>) -> Result<Self> {
        check_lengths(x.as_deref(), &y)?;
        Ok(SeriesStyle {
            x,
            y,
            ..self.clone()
        })
    }
}

fn check_lengths(x: Option<&[f64]>, y: &[f64]) -> Result<()> {
    if let Some(x) = x
        && x.len() != y.len()
    {
        return Err(PlotError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    Ok(())
}

/// Raw series options; colors are kept as text until [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct SeriesStyleBuilder {
    y: Vec<f64>,
    x: Option<Vec<f64>>,
    label: String,
    color: Option<String>,
    line_style: LineStyle,
    line_width: f64,
    line_alpha: f64,
    marker: Marker,
    marker_size: f64,
    marker_facecolor: Option<String>,
    marker_edgecolor: Option<String>,
    marker_edgewidth: f64,
    hatch: Option<String>,
    fill_below: bool,
    fill_color: Option<String>,
    fill_alpha: f64,
    fill_hatch: Option<String>,
    hatch_color: Option<String>,
    z_order: Option<i32>,
}

impl SeriesStyleBuilder {
    pub fn new<I, T>(y: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        SeriesStyleBuilder {
            y: y.into_iter().map(Into::into).collect(),
            x: None,
            label: String::new(),
            color: None,
            line_style: LineStyle::Solid,
            line_width: 1.5,
            line_alpha: 1.0,
            marker: Marker::None,
            marker_size: 6.0,
            marker_facecolor: None,
            marker_edgecolor: None,
            marker_edgewidth: 0.5,
            hatch: None,
            fill_below: false,
            fill_color: None,
            fill_alpha: 0.3,
            fill_hatch: None,
            hatch_color: None,
            z_order: None,
        }
    }

    pub fn x<I, T>(mut self, x: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        self.x = Some(x.into_iter().map(Into::into).collect());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Primary color: `"#0066CC"`, `"red"`, `"C3"` or a [`Color`].
    pub fn color(mut self, color: impl ToString) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn line_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn line_alpha(mut self, alpha: f64) -> Self {
        self.line_alpha = alpha;
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn marker_size(mut self, size: f64) -> Self {
        self.marker_size = size;
        self
    }

    pub fn marker_facecolor(mut self, color: impl ToString) -> Self {
        self.marker_facecolor = Some(color.to_string());
        self
    }

    pub fn marker_edgecolor(mut self, color: impl ToString) -> Self {
        self.marker_edgecolor = Some(color.to_string());
        self
    }

    pub fn marker_edgewidth(mut self, width: f64) -> Self {
        self.marker_edgewidth = width;
        self
    }

    pub fn hatch(mut self, pattern: impl Into<String>) -> Self {
        self.hatch = Some(pattern.into());
        self
    }

    pub fn fill_below(mut self, fill: bool) -> Self {
        self.fill_below = fill;
        self
    }

    pub fn fill_color(mut self, color: impl ToString) -> Self {
        self.fill_color = Some(color.to_string());
        self
    }

    pub fn fill_alpha(mut self, alpha: f64) -> Self {
        self.fill_alpha = alpha;
        self
    }

    pub fn fill_hatch(mut self, pattern: impl Into<String>) -> Self {
        self.fill_hatch = Some(pattern.into());
        self
    }

    pub fn hatch_color(mut self, color: impl ToString) -> Self {
        self.hatch_color = Some(color.to_string());
        self
    }

    pub fn z_order(mut self, z: i32) -> Self {
        self.z_order = Some(z);
        self
    }

    pub fn build(self) -> Result<SeriesStyle> {
        check_lengths(self.x.as_deref(), &self.y)?;

        for (field, v) in [("line_alpha", self.line_alpha), ("fill_alpha", self.fill_alpha)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(PlotError::setting(field, format!("must be within [0, 1], got {v}")));
            }
        }
        for (field, v) in [
            ("line_width", self.line_width),
            ("marker_size", self.marker_size),
            ("marker_edgewidth", self.marker_edgewidth),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PlotError::setting(field, format!("must be non-negative, got {v}")));
            }
        }

        let parse = |s: Option<String>| -> Result<Option<Color>> {
            s.map(|s| s.parse::<Color>()).transpose()
        };
        let color = parse(self.color)?.unwrap_or(DEFAULT_SERIES_COLOR);
        let fill_color = parse(self.fill_color)?.unwrap_or(color);
        let parse_hatch = |h: Option<String>| -> Result<Hatch> {
            h.map(|h| Hatch::new(&h)).transpose().map(Option::unwrap_or_default)
        };

        Ok(SeriesStyle {
            y: self.y,
            x: self.x,
            label: self.label,
            color,
            line_style: self.line_style,
            line_width: self.line_width,
            line_alpha: self.line_alpha,
            marker: self.marker,
            marker_size: self.marker_size,
            marker_facecolor: parse(self.marker_facecolor)?.unwrap_or(color),
            marker_edgecolor: parse(self.marker_edgecolor)?.unwrap_or(color),
            marker_edgewidth: self.marker_edgewidth,
            hatch: parse_hatch(self.hatch)?,
            fill_below: self.fill_below,
            fill_color,
            fill_alpha: self.fill_alpha,
            fill_hatch: parse_hatch(self.fill_hatch)?,
            hatch_color: parse(self.hatch_color)?.unwrap_or(fill_color),
            z_order: self.z_order,
        })
    }
}

/// Line-only series.
pub fn line_series(x: Vec<f64>, y: Vec<f64>, label: &str, color: &str) -> Result<SeriesStyle> {
    SeriesStyle::builder(y).x(x).label(label).color(color).build()
}

/// Marker-only series (`o` markers, no line).
pub fn scatter_series(x: Vec<f64>, y: Vec<f64>, label: &str, color: &str) -> Result<SeriesStyle> {
    SeriesStyle::builder(y)
        .x(x)
        .label(label)
        .color(color)
        .line_style(LineStyle::None)
        .marker(Marker::Circle)
        .build()
}

/// Solid line with `o` markers.
pub fn line_scatter_series(
    x: Vec<f64>,
    y: Vec<f64>,
    label: &str,
    color: &str,
) -> Result<SeriesStyle> {
    SeriesStyle::builder(y)
        .x(x)
        .label(label)
        .color(color)
        .marker(Marker::Circle)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_both_lengths() {
        let err = SeriesStyle::builder([1.0, 2.0, 3.0])
            .x([0.0, 1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, PlotError::LengthMismatch { x_len: 2, y_len: 3 }));
        assert_eq!(
            err.to_string(),
            "x and y data must have same length. Got x: 2, y: 3"
        );
    }

    #[test]
    fn colors_derive_from_primary() {
        let s = SeriesStyle::builder([1, 2]).color("#AA0000").build().unwrap();
        let red = Color::rgb(0xAA, 0, 0);
        assert_eq!(s.marker_facecolor, red);
        assert_eq!(s.marker_edgecolor, red);
        assert_eq!(s.fill_color, red);
        assert_eq!(s.hatch_color, red);
    }

    #[test]
    fn hatch_color_follows_fill_color() {
        let s = SeriesStyle::builder([1.0])
            .color("blue")
            .fill_color("#00FF00")
            .build()
            .unwrap();
        assert_eq!(s.hatch_color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn plot_type_classes() {
        let base = SeriesStyle::builder([1.0]).build().unwrap();
        assert_eq!(base.plot_type(), PlotType::Line);
        let mut s = base.clone();
        s.marker = Marker::Circle;
        assert_eq!(s.plot_type(), PlotType::LineScatter);
        s.line_style = LineStyle::None;
        assert_eq!(s.plot_type(), PlotType::Scatter);
        s.marker = Marker::None;
        assert_eq!(s.plot_type(), PlotType::None);
        assert!(s.ensure_drawable().is_err());
        // the source is untouched by edits on the clone
        assert_eq!(base.plot_type(), PlotType::Line);
    }

    #[test]
    fn index_used_when_x_missing() {
        let s = SeriesStyle::builder([5.0, 6.0, 7.0]).build().unwrap();
        assert_eq!(s.x_or_index(), vec![0.0, 1.0, 2.0]);
        assert!(s.x().is_none());
    }

    #[test]
    fn bad_color_is_reported() {
        assert!(matches!(
            SeriesStyle::builder([1.0]).color("notacolor").build(),
            Err(PlotError::InvalidColor(_))
        ));
    }
}
