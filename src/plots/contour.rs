//! Filled and line contours over a rectilinear grid.
//!
//! Each grid cell is split into two triangles. Inside a triangle the field is
//! linear, so bands are convex clips of the triangle and iso-lines are single
//! segments; neighbouring triangles agree on shared edges.

use std::collections::HashMap;

use crate::color::{Color, Colormap};
use crate::error::{PlotError, Result};
use crate::figure::axes::plain_patch;
use crate::figure::{Artist, AxesId, ColorBar, Figure, FontSpec, Stroke, TextArtist};
use crate::render::ticks::nice_step;
use crate::settings::GlobalPlotSettings;
use crate::style::LineStyle;

use super::heatmap::Grid2;
use super::pie::format_pct;

#[derive(Clone, Debug, PartialEq)]
pub enum Levels {
    /// About this many bands, on round numbers spanning the data.
    Count(usize),
    /// Explicit, increasing level values.
    Values(Vec<f64>),
}

impl Default for Levels {
    fn default() -> Self {
        Levels::Count(10)
    }
}

impl From<usize> for Levels {
    fn from(n: usize) -> Self {
        Levels::Count(n)
    }
}

impl From<Vec<f64>> for Levels {
    fn from(v: Vec<f64>) -> Self {
        Levels::Values(v)
    }
}

impl Levels {
    /// Concrete level values for data spanning `lo..=hi`.
    pub fn resolve(&self, lo: f64, hi: f64) -> Result<Vec<f64>> {
        match self {
            Levels::Values(v) => {
                if v.len() < 2 {
                    return Err(PlotError::setting("levels", "need at least two level values"));
                }
                if v.windows(2).any(|w| !(w[1] > w[0])) {
                    return Err(PlotError::setting("levels", "level values must be strictly increasing"));
                }
                Ok(v.clone())
            }
            Levels::Count(0) => Err(PlotError::setting("levels", "level count must be positive")),
            Levels::Count(n) => {
                if (hi - lo).abs() < f64::EPSILON {
                    return Ok(vec![lo - 0.5, lo + 0.5]);
                }
                let step = nice_step(hi - lo, *n);
                let start = (lo / step).floor() * step;
                let steps = ((hi - start) / step).ceil().max(1.0) as usize;
                Ok((0..=steps).map(|i| start + i as f64 * step).collect())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContourOptions {
    pub levels: Levels,
    pub filled: bool,
    /// Iso-lines on top of (or instead of) the bands.
    pub lines: bool,
    pub cmap: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub alpha: f64,
    pub line_color: Color,
    pub line_width: f64,
    pub line_style: LineStyle,
    /// Print the level value along each iso-line.
    pub labels: bool,
    pub label_size: f64,
    /// printf-style, e.g. `%1.1f`.
    pub label_format: String,
    pub colorbar: bool,
    pub colorbar_label: String,
}

impl Default for ContourOptions {
    fn default() -> Self {
        ContourOptions {
            levels: Levels::default(),
            filled: true,
            lines: false,
            cmap: "viridis".into(),
            vmin: None,
            vmax: None,
            alpha: 1.0,
            line_color: Color::BLACK,
            line_width: 1.0,
            line_style: LineStyle::Solid,
            labels: false,
            label_size: 9.0,
            label_format: "%1.1f".into(),
            colorbar: true,
            colorbar_label: String::new(),
        }
    }
}

pub(crate) type Vertex = (f64, f64, f64);

fn lerp_at(a: Vertex, b: Vertex, level: f64) -> Vertex {
    let t = (level - a.2) / (b.2 - a.2);
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, level)
}

/// Keep the part of a convex polygon where `z >= level` (or `<=` when `below`).
fn clip_level(poly: &[Vertex], level: f64, below: bool) -> Vec<Vertex> {
    let inside = |v: &Vertex| if below { v.2 <= level } else { v.2 >= level };
    let mut out = Vec::with_capacity(poly.len() + 2);
    for (i, cur) in poly.iter().enumerate() {
        let prev = poly[(i + poly.len() - 1) % poly.len()];
        match (inside(&prev), inside(cur)) {
            (true, true) => out.push(*cur),
            (true, false) => out.push(lerp_at(prev, *cur, level)),
            (false, true) => {
                out.push(lerp_at(prev, *cur, level));
                out.push(*cur);
            }
            (false, false) => {}
        }
    }
    out
}

/// Each cell as two triangles, skipping any with a non-finite corner.
pub(crate) fn triangles(x: &[f64], y: &[f64], z: &Grid2) -> Vec<[Vertex; 3]> {
    let (rows, cols) = z.shape();
    let mut out = Vec::with_capacity(2 * rows.saturating_sub(1) * cols.saturating_sub(1));
    let v = |r: usize, c: usize| (x[c], y[r], z.get(r, c));
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let (a, b, cc, d) = (v(r, c), v(r, c + 1), v(r + 1, c + 1), v(r + 1, c));
            for tri in [[a, b, cc], [a, cc, d]] {
                if tri.iter().all(|p| p.2.is_finite()) {
                    out.push(tri);
                }
            }
        }
    }
    out
}

/// Polygons of the band `lo..=hi`, one per intersected triangle.
pub(crate) fn band_polygons(tris: &[[Vertex; 3]], lo: f64, hi: f64) -> Vec<Vec<(f64, f64)>> {
    tris.iter()
        .filter_map(|t| {
            let zmin = t.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
            let zmax = t.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
            if zmax < lo || zmin > hi {
                return None;
            }
            let clipped: Vec<(f64, f64)> = clip_level(&clip_level(t, lo, false), hi, true)
                .iter()
                .map(|p| (p.0, p.1))
                .collect();
            let whole: Vec<(f64, f64)> = t.iter().map(|p| (p.0, p.1)).collect();
            // slivers where a band only touches an edge
            (clipped.len() >= 3 && polygon_area(&clipped) > polygon_area(&whole) * 1e-9).then_some(clipped)
        })
        .collect()
}

pub(crate) fn polygon_area(p: &[(f64, f64)]) -> f64 {
    let twice: f64 = (0..p.len())
        .map(|i| {
            let (a, b) = (p[i], p[(i + 1) % p.len()]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum();
    twice.abs() / 2.0
}

/// Iso-line segments at `level`, chained into polylines.
pub(crate) fn iso_lines(tris: &[[Vertex; 3]], level: f64) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    for t in tris {
        let mut hits = Vec::with_capacity(2);
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let (a, b) = (t[i], t[j]);
            if (a.2 >= level) != (b.2 >= level) {
                // interpolate in a fixed vertex order so shared edges produce identical points
                let (p, q) = if (a.0, a.1) < (b.0, b.1) { (a, b) } else { (b, a) };
                let v = lerp_at(p, q, level);
                hits.push((v.0, v.1));
            }
        }
        if let [a, b] = hits[..] {
            segments.push((a, b));
        }
    }
    chain(segments)
}

fn key(p: (f64, f64)) -> (i64, i64) {
    ((p.0 * 1e9).round() as i64, (p.1 * 1e9).round() as i64)
}

/// Join segments sharing endpoints into maximal polylines.
fn chain(segments: Vec<((f64, f64), (f64, f64))>) -> Vec<Vec<(f64, f64)>> {
    let mut by_end: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        by_end.entry(key(*a)).or_default().push(i);
        by_end.entry(key(*b)).or_default().push(i);
    }
    let mut used = vec![false; segments.len()];
    let next_from = |p: (f64, f64), used: &mut Vec<bool>| -> Option<(f64, f64)> {
        let idx = by_end.get(&key(p))?.iter().copied().find(|i| !used[*i])?;
        used[idx] = true;
        let (a, b) = segments[idx];
        Some(if key(a) == key(p) { b } else { a })
    };
    let mut lines = Vec::new();
    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];
        let mut line = vec![a, b];
        while let Some(p) = next_from(*line.last().unwrap_or(&b), &mut used) {
            line.push(p);
        }
        let mut head = Vec::new();
        let mut cur = a;
        while let Some(p) = next_from(cur, &mut used) {
            head.push(p);
            cur = p;
        }
        head.reverse();
        head.extend(line);
        lines.push(head);
    }
    lines
}

pub(crate) fn check_shape(x: &[f64], y: &[f64], z: &Grid2) -> Result<()> {
    let (rows, cols) = z.shape();
    if x.len() != cols || y.len() != rows {
        return Err(PlotError::Shape(format!(
            "z is {rows}x{cols} but x has {} values and y has {}",
            x.len(),
            y.len()
        )));
    }
    if rows < 2 || cols < 2 {
        return Err(PlotError::Shape(format!("contours need at least a 2x2 grid, got {rows}x{cols}")));
    }
    Ok(())
}

/// Contour `z` sampled at `x` (columns) and `y` (rows).
pub fn contour_plot(
    x: &[f64],
    y: &[f64],
    z: &Grid2,
    settings: &GlobalPlotSettings,
    opts: &ContourOptions,
) -> Result<(Figure, AxesId)> {
    check_shape(x, y, z)?;
    if !opts.filled && !opts.lines {
        return Err(PlotError::setting("filled", "enable filled bands, lines, or both"));
    }
    super::check_alpha("alpha", opts.alpha)?;
    let cmap = Colormap::by_name(&opts.cmap)?;
    let (lo, hi) = z
        .min_max()
        .ok_or_else(|| PlotError::Empty("contour grid has no finite values".into()))?;
    let levels = opts.levels.resolve(lo, hi)?;
    if opts.labels {
        format_pct(&opts.label_format, 0.0)?;
    }
    let first = levels[0];
    let last = levels[levels.len() - 1];
    let (vmin, vmax) = (opts.vmin.unwrap_or(first), opts.vmax.unwrap_or(last));
    let tris = triangles(x, y, z);

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    if opts.filled {
        for w in levels.windows(2) {
            let color = cmap.map((w[0] + w[1]) / 2.0, vmin, vmax);
            // an opaque edge in the band color closes hairline seams between triangles
            let edge = (opts.alpha >= 1.0).then_some((color, 0.3));
            for points in band_polygons(&tris, w[0], w[1]) {
                ax.add_artist(
                    Artist::Polygon {
                        points,
                        patch: plain_patch(color, opts.alpha, edge),
                    },
                    None,
                );
            }
        }
    }
    if opts.lines {
        let stroke = Stroke::solid(opts.line_color, opts.line_width).styled(opts.line_style);
        let font = FontSpec::new(opts.label_size).color(opts.line_color);
        for level in &levels {
            for line in iso_lines(&tris, *level) {
                if opts.labels && line.len() >= 4 {
                    let at = line[line.len() / 2];
                    let text = format_pct(&opts.label_format, *level)?;
                    ax.add_artist(
                        Artist::Text(TextArtist::new(text, at, font.clone()).background(ax.settings.axes_facecolor)),
                        None,
                    );
                }
                ax.add_artist(
                    Artist::Line {
                        points: line,
                        stroke: stroke.clone(),
                    },
                    None,
                );
            }
        }
    }
    ax.margins = (0.0, 0.0);
    if opts.filled && opts.colorbar {
        ax.colorbar = Some(ColorBar {
            cmap,
            vmin,
            vmax,
            label: opts.colorbar_label.clone(),
            boundaries: Some(levels.clone()),
        });
    }
    log::debug!("contour: {} levels over a {:?} grid", levels.len(), z.shape());
    Ok((fig, id))
}

/// Evenly spaced samples over `range`, both ends included.
pub(crate) fn linspace(range: (f64, f64), n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![range.0];
    }
    (0..n)
        .map(|i| range.0 + (range.1 - range.0) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Sample `f(x, y)` on a `resolution` x `resolution` grid and contour it.
pub fn contour_from_fn(
    f: impl Fn(f64, f64) -> f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
    settings: &GlobalPlotSettings,
    opts: &ContourOptions,
) -> Result<(Figure, AxesId)> {
    let x = linspace(x_range, resolution);
    let y = linspace(y_range, resolution);
    let z = Grid2::from_fn(y.len(), x.len(), |r, c| f(x[c], y[r]));
    contour_plot(&x, &y, &z, settings, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> (Vec<f64>, Vec<f64>, Grid2) {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 1.0];
        let z = Grid2::from_fn(2, 3, |_, c| c as f64);
        (x, y, z)
    }

    #[test]
    fn auto_levels_cover_the_data_on_round_numbers() {
        let l = Levels::Count(5).resolve(0.3, 9.7).unwrap();
        assert!(l[0] <= 0.3 && *l.last().unwrap() >= 9.7);
        assert_relative_eq!(l[1] - l[0], 2.0);
    }

    #[test]
    fn decreasing_levels_are_rejected() {
        assert!(Levels::Values(vec![1.0, 0.5]).resolve(0.0, 1.0).is_err());
    }

    #[test]
    fn bands_tile_the_grid() {
        let (x, y, z) = ramp();
        let tris = triangles(&x, &y, &z);
        let area = |band: Vec<Vec<(f64, f64)>>| band.iter().map(|p| polygon_area(p)).sum::<f64>();
        let low = area(band_polygons(&tris, 0.0, 1.0));
        let high = area(band_polygons(&tris, 1.0, 2.0));
        assert_relative_eq!(low, 1.0, epsilon = 1e-12);
        assert_relative_eq!(high, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn iso_line_is_one_vertical_polyline() {
        let (x, y, z) = ramp();
        let lines = iso_lines(&triangles(&x, &y, &z), 1.5);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].iter().all(|p| (p.0 - 1.5).abs() < 1e-12));
        assert_eq!(lines[0].len(), 3);
    }

    #[test]
    fn mismatched_axes_are_a_shape_error() {
        let (_, y, z) = ramp();
        let err = contour_plot(&[0.0, 1.0], &y, &z, &GlobalPlotSettings::default(), &ContourOptions::default())
            .unwrap_err();
        assert!(matches!(err, PlotError::Shape(_)));
    }

    #[test]
    fn colorbar_only_for_filled_contours() {
        let settings = GlobalPlotSettings::default();
        let f = |x: f64, y: f64| x * x + y * y;
        let (fig, id) = contour_from_fn(f, (-1.0, 1.0), (-1.0, 1.0), 20, &settings, &ContourOptions::default()).unwrap();
        let cb = fig[id].colorbar.as_ref().unwrap();
        assert!(cb.boundaries.as_ref().is_some_and(|b| b.len() >= 3));

        let lines_only = ContourOptions {
            filled: false,
            lines: true,
            labels: true,
            ..Default::default()
        };
        let (fig, id) = contour_from_fn(f, (-1.0, 1.0), (-1.0, 1.0), 20, &settings, &lines_only).unwrap();
        assert!(fig[id].colorbar.is_none());
        assert!(fig[id].artists().iter().any(|l| matches!(l.artist, Artist::Text(_))));
    }
}
