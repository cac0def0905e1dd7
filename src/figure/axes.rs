//! A drawable area: its formatting settings, recorded artists and legend.

use crate::color::{Color, Colormap};
use crate::error::Result;
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;
use crate::style::{Hatch, LineStyle, Scale};

use super::artist::{
    Artist, Coords, FontSpec, HAlign, Layered, LegendEntry, LegendHandle, MarkerStyle, Patch,
    Stroke, TextArtist, VAlign, z,
};

/// Camera for 3D axes, in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct View3D {
    pub elev: f64,
    pub azim: f64,
    pub z_label: String,
    pub z_limits: Option<(f64, f64)>,
}

impl Default for View3D {
    fn default() -> Self {
        View3D {
            elev: 30.0,
            azim: -60.0,
            z_label: String::new(),
            z_limits: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AxesKind {
    Cartesian,
    /// Equal-aspect frame without ticks, spines or grid.
    Pie,
    ThreeD(View3D),
}

/// Color bar drawn to the right of an axes.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorBar {
    pub cmap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    pub label: String,
    /// Discrete level boundaries (filled contours); continuous when `None`.
    pub boundaries: Option<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axes {
    pub settings: GlobalPlotSettings,
    pub kind: AxesKind,
    artists: Vec<Layered>,
    legend: Vec<LegendEntry>,
    pub colorbar: Option<ColorBar>,
    /// Fixed tick positions with labels (categories, dates); replaces automatic ticks.
    pub x_tick_override: Option<Vec<(f64, String)>>,
    pub y_tick_override: Option<Vec<(f64, String)>>,
    pub equal_aspect: bool,
    /// Draw y increasing downwards (matrix/heatmap row order).
    pub invert_y: bool,
    /// Fractional padding added around the data when limits are automatic.
    pub margins: (f64, f64),
    /// Values the automatic limits never pad beyond (bar baselines, image edges).
    pub sticky_x: Vec<f64>,
    pub sticky_y: Vec<f64>,
    pub show_x_ticklabels: bool,
    pub show_y_ticklabels: bool,
    /// Hide the x axis label (inner panels of a shared grid).
    pub show_x_label: bool,
    pub show_y_label: bool,
}

impl Axes {
    pub fn new(settings: &GlobalPlotSettings) -> Self {
        Axes {
            settings: settings.clone(),
            kind: AxesKind::Cartesian,
            artists: Vec::new(),
            legend: Vec::new(),
            colorbar: None,
            x_tick_override: None,
            y_tick_override: None,
            equal_aspect: false,
            invert_y: false,
            margins: (0.05, 0.05),
            sticky_x: Vec::new(),
            sticky_y: Vec::new(),
            show_x_ticklabels: true,
            show_y_ticklabels: true,
            show_x_label: true,
            show_y_label: true,
        }
    }

    // ------------------------ Recording ------------------------

    /// Record an artist; `z` overrides the default order for its kind.
    pub fn add_artist(&mut self, artist: Artist, z: Option<f64>) {
        let z = z.unwrap_or_else(|| artist.default_z());
        self.artists.push(Layered { z, artist });
    }

    pub fn add_legend_entry(&mut self, label: impl Into<String>, handle: LegendHandle) {
        let label = label.into();
        // labels starting with '_' stay out of the legend
        if label.is_empty() || label.starts_with('_') {
            return;
        }
        self.legend.push(LegendEntry { label, handle });
    }

    /// Draw one styled series: optional fill below, then the line, then markers.
    pub fn plot(&mut self, series: &SeriesStyle) -> Result<()> {
        series.ensure_drawable()?;
        let points = series.points();
        let zo = series.z_order.map(f64::from);

        if series.fill_below && points.len() >= 2 {
            let mut poly = Vec::with_capacity(points.len() + 2);
            poly.push((points[0].0, 0.0));
            poly.extend(points.iter().copied());
            poly.push((points[points.len() - 1].0, 0.0));
            let patch = Patch::filled(series.fill_color, series.fill_alpha)
                .hatch(series.fill_hatch.clone(), series.hatch_color);
            self.add_artist(
                Artist::Polygon {
                    points: poly,
                    patch,
                },
                zo.map(|z| z - 0.5),
            );
            self.sticky_y.push(0.0);
        }

        let stroke = series.has_line().then(|| {
            Stroke::solid(series.color, series.line_width)
                .styled(series.line_style)
                .alpha(series.line_alpha)
        });
        if let Some(stroke) = &stroke {
            self.add_artist(
                Artist::Line {
                    points: points.clone(),
                    stroke: stroke.clone(),
                },
                zo,
            );
        }

        let marker = series.has_marker().then(|| MarkerStyle {
            marker: series.marker,
            size: series.marker_size,
            face: series.marker_facecolor,
            edge: series.marker_edgecolor,
            edge_width: series.marker_edgewidth,
            alpha: series.line_alpha,
        });
        if let Some(style) = &marker {
            self.add_artist(
                Artist::Markers {
                    points,
                    style: style.clone(),
                },
                zo.map(|z| z + 0.1),
            );
        }

        self.add_legend_entry(series.label.clone(), LegendHandle::Line { stroke, marker });
        Ok(())
    }

    /// Fill the region between two curves sharing `x`.
    pub fn fill_between(
        &mut self,
        x: &[f64],
        y_low: &[f64],
        y_high: &[f64],
        patch: Patch,
        label: &str,
        z: Option<f64>,
    ) {
        let n = x.len().min(y_low.len()).min(y_high.len());
        if n == 0 {
            return;
        }
        let mut poly: Vec<(f64, f64)> = (0..n).map(|i| (x[i], y_high[i])).collect();
        poly.extend((0..n).rev().map(|i| (x[i], y_low[i])));
        self.add_legend_entry(label, LegendHandle::Patch(patch.clone()));
        self.add_artist(Artist::Polygon { points: poly, patch }, z);
    }

    pub fn axvline(&mut self, x: f64, stroke: Stroke) {
        self.add_artist(
            Artist::AxLine {
                value: x,
                vertical: true,
                stroke,
            },
            None,
        );
    }

    pub fn axhline(&mut self, y: f64, stroke: Stroke) {
        self.add_artist(
            Artist::AxLine {
                value: y,
                vertical: false,
                stroke,
            },
            None,
        );
    }

    /// Text at a data position, centered.
    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, font: FontSpec) {
        self.add_artist(Artist::Text(TextArtist::new(text, (x, y), font)), None);
    }

    /// Text at an axes-fraction position.
    pub fn text_axes(&mut self, x: f64, y: f64, text: impl Into<String>, font: FontSpec, h: HAlign, v: VAlign) {
        self.add_artist(
            Artist::Text(
                TextArtist::new(text, (x, y), font)
                    .coords(Coords::Axes)
                    .align(h, v),
            ),
            Some(z::TEXT + 2.0),
        );
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.settings.title = title.into();
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) {
        self.settings.x_label = label.into();
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) {
        self.settings.y_label = label.into();
    }

    pub fn set_xlim(&mut self, lo: f64, hi: f64) {
        self.settings.x_limits = Some((lo, hi));
    }

    pub fn set_ylim(&mut self, lo: f64, hi: f64) {
        self.settings.y_limits = Some((lo, hi));
    }

    pub fn set_x_ticks(&mut self, ticks: Vec<(f64, String)>) {
        self.x_tick_override = Some(ticks);
    }

    pub fn set_y_ticks(&mut self, ticks: Vec<(f64, String)>) {
        self.y_tick_override = Some(ticks);
    }

    /// Replace the legend entries, e.g. to reorder them.
    pub fn set_legend_entries(&mut self, entries: Vec<LegendEntry>) {
        self.legend = entries;
    }

    // ------------------------ Queries ------------------------

    /// Artists in draw order (stable by insertion for equal z).
    pub fn artists(&self) -> Vec<&Layered> {
        let mut v: Vec<&Layered> = self.artists.iter().collect();
        v.sort_by(|a, b| a.z.total_cmp(&b.z));
        v
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn legend_entries(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn is_3d(&self) -> bool {
        matches!(self.kind, AxesKind::ThreeD(_))
    }

    /// Union of artist extents, restricted to values valid on each axis' scale.
    pub fn data_bounds(&self) -> (Option<(f64, f64)>, Option<(f64, f64)>) {
        let (xs, ys) = (self.settings.x_scale, self.settings.y_scale);
        let mut bx: Option<(f64, f64)> = None;
        let mut by: Option<(f64, f64)> = None;
        let grow = |b: &mut Option<(f64, f64)>, v: f64| {
            *b = Some(match *b {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        };
        for l in &self.artists {
            let pts: Vec<(f64, f64)> = match &l.artist {
                Artist::Line { points, .. }
                | Artist::Markers { points, .. }
                | Artist::Polygon { points, .. } => points.clone(),
                other => match other.extent() {
                    Some((x0, x1, y0, y1)) => vec![(x0, y0), (x1, y1)],
                    None => continue,
                },
            };
            for (x, y) in pts {
                if x.is_finite() && xs.accepts(x) {
                    grow(&mut bx, x);
                }
                if y.is_finite() && ys.accepts(y) {
                    grow(&mut by, y);
                }
            }
        }
        (bx, by)
    }

    /// Final view limits: explicit limits win, otherwise padded data bounds.
    pub fn view_limits(&self) -> ((f64, f64), (f64, f64)) {
        let (bx, by) = self.data_bounds();
        let x = match self.settings.x_limits {
            Some(l) => l,
            None => auto_limits(bx, self.settings.x_scale, self.margins.0, &self.sticky_x),
        };
        let y = match self.settings.y_limits {
            Some(l) => l,
            None => {
                let (lo, hi) =
                    auto_limits(by, self.settings.y_scale, self.margins.1, &self.sticky_y);
                if self.invert_y { (hi, lo) } else { (lo, hi) }
            }
        };
        (x, y)
    }

    /// z-range of 3D artists, padded like the other axes.
    pub fn z_limits(&self) -> (f64, f64) {
        if let AxesKind::ThreeD(view) = &self.kind
            && let Some(l) = view.z_limits
        {
            return l;
        }
        let b = self
            .artists
            .iter()
            .filter_map(|l| l.artist.z_extent())
            .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
                None => Some((lo, hi)),
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
            });
        auto_limits(b, Scale::Linear, 0.0, &[])
    }
}

/// Pad `bounds` by `margin` of their span in scale space, honoring sticky values.
pub fn auto_limits(bounds: Option<(f64, f64)>, scale: Scale, margin: f64, sticky: &[f64]) -> (f64, f64) {
    let Some((lo, hi)) = bounds else {
        return match scale {
            Scale::Log => (1.0, 10.0),
            _ => (0.0, 1.0),
        };
    };
    let (mut t0, mut t1) = (scale.forward(lo), scale.forward(hi));
    if (t1 - t0).abs() < 1e-12 {
        let half = if t0.abs() > 1e-12 && scale == Scale::Linear {
            t0.abs() * 0.05
        } else {
            0.5
        };
        return (scale.inverse(t0 - half), scale.inverse(t1 + half));
    }
    let pad = (t1 - t0) * margin;
    let is_sticky = |v: f64| sticky.iter().any(|s| (s - v).abs() <= 1e-12 * (1.0 + v.abs()));
    if !is_sticky(lo) {
        t0 -= pad;
    }
    if !is_sticky(hi) {
        t1 += pad;
    }
    (scale.inverse(t0), scale.inverse(t1))
}

/// Patch used for bars, wedges and histogram bins from a series' styling.
pub(crate) fn patch_for(series: &SeriesStyle, face: Color, alpha: f64, edge: Option<Stroke>) -> Patch {
    let hatch = if series.hatch.is_empty() {
        series.fill_hatch.clone()
    } else {
        series.hatch.clone()
    };
    let mut p = Patch::filled(face, alpha).hatch(hatch, series.hatch_color);
    p.edge = edge;
    p
}

/// Hatch-free patch with an optional thin edge.
pub(crate) fn plain_patch(face: Color, alpha: f64, edge: Option<(Color, f64)>) -> Patch {
    Patch {
        face,
        face_alpha: alpha,
        edge: edge.map(|(c, w)| Stroke::solid(c, w).styled(LineStyle::Solid)),
        hatch: Hatch::none(),
        hatch_color: face,
        hatch_width: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Marker;

    #[test]
    fn plot_records_line_markers_and_legend() {
        let mut ax = Axes::new(&GlobalPlotSettings::default());
        let s = SeriesStyle::builder([1.0, 2.0, 3.0])
            .label("a")
            .marker(Marker::Circle)
            .fill_below(true)
            .build()
            .unwrap();
        ax.plot(&s).unwrap();
        assert_eq!(ax.artist_count(), 3);
        assert_eq!(ax.legend_entries().len(), 1);
        // fill below comes first in draw order
        assert!(matches!(ax.artists()[0].artist, Artist::Polygon { .. }));
    }

    #[test]
    fn limits_pad_except_sticky_edges() {
        let mut ax = Axes::new(&GlobalPlotSettings::default());
        ax.add_artist(
            Artist::Line {
                points: vec![(0.0, 0.0), (10.0, 5.0)],
                stroke: Stroke::solid(Color::BLACK, 1.0),
            },
            None,
        );
        ax.sticky_y.push(0.0);
        let ((x0, x1), (y0, y1)) = ax.view_limits();
        assert!((x0 + 0.5).abs() < 1e-9 && (x1 - 10.5).abs() < 1e-9);
        assert_eq!(y0, 0.0);
        assert!((y1 - 5.25).abs() < 1e-9);
    }

    #[test]
    fn explicit_limits_win() {
        let mut ax = Axes::new(&GlobalPlotSettings::default());
        ax.set_xlim(-1.0, 1.0);
        assert_eq!(ax.view_limits().0, (-1.0, 1.0));
    }
}
