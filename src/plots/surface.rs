//! 3D surfaces and wireframes over a rectilinear grid.

use crate::color::{Color, Colormap, cycle_color};
use crate::error::{PlotError, Result};
use crate::figure::{Artist, AxesId, AxesKind, ColorBar, Figure, Quad3, Stroke, View3D};
use crate::settings::GlobalPlotSettings;
use crate::style::LineStyle;

use super::contour::{Levels, check_shape, iso_lines, linspace, triangles};
use super::heatmap::Grid2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SurfaceKind {
    #[default]
    Surface,
    Wireframe,
    /// Shaded surface with a faint wireframe on top.
    Both,
}

impl std::str::FromStr for SurfaceKind {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "surface" => Ok(SurfaceKind::Surface),
            "wireframe" => Ok(SurfaceKind::Wireframe),
            "both" => Ok(SurfaceKind::Both),
            _ => Err(PlotError::invalid_option("plot type", s, &["surface", "wireframe", "both"])),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceOptions {
    pub kind: SurfaceKind,
    pub cmap: String,
    pub alpha: f64,
    /// Outline of each surface quad; `None` leaves faces borderless.
    pub edge_color: Option<Color>,
    pub line_width: f64,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub elev: f64,
    pub azim: f64,
    /// Row and column step between drawn grid lines.
    pub rstride: usize,
    pub cstride: usize,
    /// Project contour lines of the surface onto a horizontal plane.
    pub contour_projection: bool,
    /// Height of that plane; defaults to the lowest z value.
    pub contour_offset: Option<f64>,
    pub colorbar: bool,
    pub colorbar_label: String,
    pub z_label: String,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        SurfaceOptions {
            kind: SurfaceKind::Surface,
            cmap: "viridis".into(),
            alpha: 0.9,
            edge_color: None,
            line_width: 0.0,
            vmin: None,
            vmax: None,
            elev: 30.0,
            azim: -60.0,
            rstride: 1,
            cstride: 1,
            contour_projection: false,
            contour_offset: None,
            colorbar: true,
            colorbar_label: String::new(),
            z_label: "Z".into(),
        }
    }
}

/// Grid indices `0, step, 2·step, …` always ending on the last index.
fn strided(n: usize, step: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).step_by(step.max(1)).collect();
    if idx.last() != Some(&(n - 1)) {
        idx.push(n - 1);
    }
    idx
}

/// Shaded quads between consecutive strided rows and columns.
fn surface_quads(x: &[f64], y: &[f64], z: &Grid2, rows: &[usize], cols: &[usize], color: impl Fn(f64) -> Color) -> Vec<Quad3> {
    let p = |r: usize, c: usize| (x[c], y[r], z.get(r, c));
    let mut quads = Vec::with_capacity(rows.len() * cols.len());
    for rw in rows.windows(2) {
        for cw in cols.windows(2) {
            let corners = [p(rw[0], cw[0]), p(rw[0], cw[1]), p(rw[1], cw[1]), p(rw[1], cw[0])];
            let mean = corners.iter().map(|c| c.2).sum::<f64>() / 4.0;
            quads.push(Quad3 { corners, face: color(mean) });
        }
    }
    quads
}

/// Polylines along every strided row and column.
fn wire_lines(x: &[f64], y: &[f64], z: &Grid2, rows: &[usize], cols: &[usize]) -> Vec<Vec<(f64, f64, f64)>> {
    let (nr, nc) = z.shape();
    let mut lines = Vec::with_capacity(rows.len() + cols.len());
    for &r in rows {
        lines.push((0..nc).map(|c| (x[c], y[r], z.get(r, c))).collect());
    }
    for &c in cols {
        lines.push((0..nr).map(|r| (x[c], y[r], z.get(r, c))).collect());
    }
    lines
}

/// Draw `z` sampled at `x` (columns) and `y` (rows) as a 3D surface.
pub fn surface_plot(
    x: &[f64],
    y: &[f64],
    z: &Grid2,
    settings: &GlobalPlotSettings,
    opts: &SurfaceOptions,
) -> Result<(Figure, AxesId)> {
    check_shape(x, y, z)?;
    super::check_alpha("alpha", opts.alpha)?;
    if opts.rstride == 0 || opts.cstride == 0 {
        return Err(PlotError::setting("stride", "row and column strides must be at least 1"));
    }
    let cmap = Colormap::by_name(&opts.cmap)?;
    let (lo, hi) = z
        .min_max()
        .ok_or_else(|| PlotError::Empty("surface grid has no finite values".into()))?;
    let (vmin, vmax) = (opts.vmin.unwrap_or(lo), opts.vmax.unwrap_or(hi));
    let (nr, nc) = z.shape();

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    ax.kind = AxesKind::ThreeD(View3D {
        elev: opts.elev,
        azim: opts.azim,
        z_label: opts.z_label.clone(),
        z_limits: None,
    });
    ax.margins = (0.0, 0.0);

    let shaded = matches!(opts.kind, SurfaceKind::Surface | SurfaceKind::Both);
    if shaded {
        let rows = strided(nr, opts.rstride);
        let cols = strided(nc, opts.cstride);
        let edge = opts
            .edge_color
            .filter(|_| opts.line_width > 0.0)
            .map(|c| Stroke::solid(c, opts.line_width));
        ax.add_artist(
            Artist::Surface {
                quads: surface_quads(x, y, z, &rows, &cols, |v| cmap.map(v, vmin, vmax)),
                alpha: opts.alpha,
                edge,
            },
            None,
        );
    }
    if matches!(opts.kind, SurfaceKind::Wireframe | SurfaceKind::Both) {
        // over a shaded surface the wireframe is sparser and faint
        let (step, stroke) = if shaded {
            (2, Stroke::solid(Color::BLACK, 0.5).alpha(0.3))
        } else {
            (1, Stroke::solid(cycle_color(0), 0.5))
        };
        let rows = strided(nr, opts.rstride * step);
        let cols = strided(nc, opts.cstride * step);
        for points in wire_lines(x, y, z, &rows, &cols) {
            ax.add_artist(
                Artist::Line3 {
                    points,
                    stroke: stroke.clone(),
                },
                None,
            );
        }
    }
    if opts.contour_projection {
        let offset = opts.contour_offset.unwrap_or(lo);
        let tris = triangles(x, y, z);
        for level in Levels::default().resolve(lo, hi)? {
            let stroke = Stroke::solid(cmap.map(level, vmin, vmax), 1.0)
                .styled(LineStyle::Solid)
                .alpha(0.6);
            for line in iso_lines(&tris, level) {
                ax.add_artist(
                    Artist::Line3 {
                        points: line.into_iter().map(|(px, py)| (px, py, offset)).collect(),
                        stroke: stroke.clone(),
                    },
                    None,
                );
            }
        }
    }
    if shaded && opts.colorbar {
        ax.colorbar = Some(ColorBar {
            cmap,
            vmin,
            vmax,
            label: opts.colorbar_label.clone(),
            boundaries: None,
        });
    }
    Ok((fig, id))
}

/// Sample `f(x, y)` on a `resolution` x `resolution` grid and draw it as a surface.
pub fn surface_from_fn(
    f: impl Fn(f64, f64) -> f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
    settings: &GlobalPlotSettings,
    opts: &SurfaceOptions,
) -> Result<(Figure, AxesId)> {
    let x = linspace(x_range, resolution);
    let y = linspace(y_range, resolution);
    let z = Grid2::from_fn(y.len(), x.len(), |r, c| f(x[c], y[r]));
    surface_plot(&x, &y, &z, settings, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quads(fig: &Figure, id: AxesId) -> usize {
        fig[id]
            .artists()
            .iter()
            .map(|l| match &l.artist {
                Artist::Surface { quads, .. } => quads.len(),
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn stride_keeps_the_last_row() {
        assert_eq!(strided(5, 2), vec![0, 2, 4]);
        assert_eq!(strided(6, 2), vec![0, 2, 4, 5]);
    }

    #[test]
    fn surface_has_one_quad_per_cell() {
        let settings = GlobalPlotSettings::default();
        let (fig, id) = surface_from_fn(|x, y| x * y, (0.0, 1.0), (0.0, 1.0), 5, &settings, &SurfaceOptions::default()).unwrap();
        assert_eq!(quads(&fig, id), 16);
        assert!(fig[id].is_3d());
        assert!(fig[id].colorbar.is_some());
    }

    #[test]
    fn wireframe_alone_has_no_colorbar() {
        let opts = SurfaceOptions {
            kind: "wireframe".parse().unwrap(),
            ..Default::default()
        };
        let (fig, id) = surface_from_fn(|x, _| x, (0.0, 1.0), (0.0, 1.0), 4, &GlobalPlotSettings::default(), &opts).unwrap();
        assert_eq!(quads(&fig, id), 0);
        assert!(fig[id].colorbar.is_none());
        // four rows and four columns
        assert_eq!(fig[id].artist_count(), 8);
    }

    #[test]
    fn projected_contours_sit_on_the_floor() {
        let opts = SurfaceOptions {
            contour_projection: true,
            contour_offset: Some(-1.0),
            ..Default::default()
        };
        let (fig, id) =
            surface_from_fn(|x, y| x * x + y * y, (-1.0, 1.0), (-1.0, 1.0), 12, &GlobalPlotSettings::default(), &opts).unwrap();
        let floor: Vec<f64> = fig[id]
            .artists()
            .iter()
            .filter_map(|l| match &l.artist {
                Artist::Line3 { points, .. } => Some(points[0].2),
                _ => None,
            })
            .collect();
        assert!(!floor.is_empty());
        assert!(floor.iter().all(|z| *z == -1.0));
    }

    #[test]
    fn unknown_plot_type_lists_choices() {
        let err = "mesh".parse::<SurfaceKind>().unwrap_err();
        assert!(err.to_string().contains("wireframe"));
    }
}
