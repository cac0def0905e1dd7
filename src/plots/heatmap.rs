//! Heatmaps of 2D grids and correlation matrices.

use std::sync::LazyLock;

use regex::Regex;

use crate::color::{Color, Colormap};
use crate::error::{PlotError, Result};
use crate::figure::axes::plain_patch;
use crate::figure::{Artist, AxesId, ColorBar, Figure, FontSpec, Stroke};
use crate::settings::GlobalPlotSettings;
use crate::stats::correlation_matrix;

/// Row-major 2D grid of values; row 0 is the first row of the matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2 {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid2 {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(PlotError::Shape(format!(
                "{rows}x{cols} grid needs {} values, got {}",
                rows * cols,
                data.len()
            )));
        }
        Ok(Grid2 { rows, cols, data })
    }

    /// Build from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(PlotError::Shape(format!(
                "row {i} has {} values, row 0 has {cols}",
                r.len()
            )));
        }
        let n = rows.len();
        Ok(Grid2 {
            rows: n,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Sample `f(row, col)` on a `rows × cols` grid.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Grid2 { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Finite minimum and maximum.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapOptions {
    pub cmap: String,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// Center of a diverging map; unset limits become symmetric around it.
    pub center: Option<f64>,
    pub annotate: bool,
    /// Number format for annotations, e.g. `.2f`, `d`, `.1%`, `.2e`.
    pub fmt: String,
    pub annot_size: f64,
    /// Cells above this value get white text, others black. Defaults to the middle of the color range.
    pub annot_color_threshold: Option<f64>,
    pub colorbar: bool,
    pub colorbar_label: String,
    pub square: bool,
    /// Width of separator lines between cells; zero disables them.
    pub line_width: f64,
    pub line_color: Color,
    pub row_labels: Option<Vec<String>>,
    pub col_labels: Option<Vec<String>>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        HeatmapOptions {
            cmap: "viridis".into(),
            vmin: None,
            vmax: None,
            center: None,
            annotate: false,
            fmt: ".2f".into(),
            annot_size: 10.0,
            annot_color_threshold: None,
            colorbar: true,
            colorbar_label: String::new(),
            square: false,
            line_width: 0.0,
            line_color: Color::WHITE,
            row_labels: None,
            col_labels: None,
        }
    }
}

static FORMAT_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)(?:\.(\d+))?([fFeEdg%]?)$").expect("constant pattern"));

/// Format `v` with a format string (`.2f`, `d`, `.1%`, `.3e`, `g`).
pub fn format_value(fmt: &str, v: f64) -> Result<String> {
    let caps = FORMAT_SPEC
        .captures(fmt.trim_start_matches(':'))
        .ok_or_else(|| PlotError::invalid_option("fmt", fmt, &[".2f", "d", ".1%", ".2e", "g"]))?;
    let width: usize = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let prec: Option<usize> = caps.get(2).and_then(|m| m.as_str().parse().ok());
    let body = match caps.get(3).map_or("", |m| m.as_str()) {
        "f" | "F" => format!("{:.*}", prec.unwrap_or(6), v),
        "e" | "E" => format!("{:.*e}", prec.unwrap_or(6), v),
        "d" => format!("{}", v.round() as i64),
        "%" => format!("{:.*}%", prec.unwrap_or(6), v * 100.0),
        _ => match prec {
            Some(p) => {
                // general format: p significant digits, trailing zeros removed
                let digits = if v == 0.0 { 1 } else { v.abs().log10().floor() as i32 + 1 };
                let decimals = (p as i32 - digits).max(0) as usize;
                let s = format!("{v:.decimals$}");
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            }
            None => format!("{v}"),
        },
    };
    Ok(format!("{body:>width$}"))
}

/// Color limits after applying `center`.
fn color_limits(z: &Grid2, opts: &HeatmapOptions) -> Result<(f64, f64)> {
    let (lo, hi) = z
        .min_max()
        .ok_or_else(|| PlotError::Empty("heatmap has no finite values".into()))?;
    let (mut vmin, mut vmax) = (opts.vmin, opts.vmax);
    if let Some(c) = opts.center {
        let range = (hi - c).abs().max((lo - c).abs());
        vmin = vmin.or(Some(c - range));
        vmax = vmax.or(Some(c + range));
    }
    let (vmin, vmax) = (vmin.unwrap_or(lo), vmax.unwrap_or(hi));
    if vmin > vmax {
        return Err(PlotError::setting("vmin", format!("{vmin} is above vmax {vmax}")));
    }
    Ok((vmin, vmax))
}

fn labels_or_index(labels: &Option<Vec<String>>, n: usize, what: &str) -> Result<Vec<(f64, String)>> {
    match labels {
        Some(l) if l.len() != n => Err(PlotError::count_mismatch(what, n, l.len())),
        Some(l) => Ok(l.iter().enumerate().map(|(i, s)| (i as f64, s.clone())).collect()),
        None => Ok((0..n).map(|i| (i as f64, i.to_string())).collect()),
    }
}

/// Draw `z` as colored cells, row 0 at the top.
pub fn heatmap(z: &Grid2, settings: &GlobalPlotSettings, opts: &HeatmapOptions) -> Result<(Figure, AxesId)> {
    let (rows, cols) = z.shape();
    if rows == 0 || cols == 0 {
        return Err(PlotError::Empty("heatmap grid is empty".into()));
    }
    let cmap = Colormap::by_name(&opts.cmap)?;
    let (vmin, vmax) = color_limits(z, opts)?;
    let x_ticks = labels_or_index(&opts.col_labels, cols, "column labels")?;
    let y_ticks = labels_or_index(&opts.row_labels, rows, "row labels")?;
    if opts.annotate {
        format_value(&opts.fmt, 0.0)?;
    }

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    ax.settings.show_grid = false;
    for r in 0..rows {
        for c in 0..cols {
            let v = z.get(r, c);
            if !v.is_finite() {
                continue;
            }
            let (x, y) = (c as f64, r as f64);
            ax.add_artist(
                Artist::Polygon {
                    points: vec![(x - 0.5, y - 0.5), (x + 0.5, y - 0.5), (x + 0.5, y + 0.5), (x - 0.5, y + 0.5)],
                    patch: plain_patch(cmap.map(v, vmin, vmax), 1.0, None),
                },
                None,
            );
        }
    }
    if opts.line_width > 0.0 {
        let sep = Stroke::solid(opts.line_color, opts.line_width);
        for r in 0..=rows {
            ax.axhline(r as f64 - 0.5, sep.clone());
        }
        for c in 0..=cols {
            ax.axvline(c as f64 - 0.5, sep.clone());
        }
    }
    if opts.annotate {
        let threshold = opts.annot_color_threshold.unwrap_or((vmin + vmax) / 2.0);
        for r in 0..rows {
            for c in 0..cols {
                let v = z.get(r, c);
                if !v.is_finite() {
                    continue;
                }
                let color = if v > threshold { Color::WHITE } else { Color::BLACK };
                ax.text(c as f64, r as f64, format_value(&opts.fmt, v)?, FontSpec::new(opts.annot_size).color(color));
            }
        }
    }
    if ax.settings.x_limits.is_none() {
        ax.set_xlim(-0.5, cols as f64 - 0.5);
    }
    if ax.settings.y_limits.is_none() {
        // first row on top
        ax.set_ylim(rows as f64 - 0.5, -0.5);
    }
    ax.set_x_ticks(x_ticks);
    ax.set_y_ticks(y_ticks);
    ax.equal_aspect = opts.square;
    if opts.colorbar {
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

/// Pearson correlation between `columns`, drawn with a diverging map from -1 to 1.
pub fn correlation_heatmap(
    columns: &[Vec<f64>],
    labels: Option<Vec<String>>,
    settings: &GlobalPlotSettings,
    opts: Option<HeatmapOptions>,
) -> Result<(Figure, AxesId)> {
    let m = correlation_matrix(columns)?;
    let z = Grid2::from_rows(m)?;
    let mut opts = opts.unwrap_or_else(|| HeatmapOptions {
        cmap: "RdBu_r".into(),
        center: Some(0.0),
        vmin: Some(-1.0),
        vmax: Some(1.0),
        annotate: true,
        square: true,
        colorbar_label: "Correlation".into(),
        ..Default::default()
    });
    opts.row_labels = labels.clone();
    opts.col_labels = labels;
    heatmap(&z, settings, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_strings_cover_common_kinds() {
        assert_eq!(format_value(".2f", 0.12345).unwrap(), "0.12");
        assert_eq!(format_value("d", 3.7).unwrap(), "4");
        assert_eq!(format_value(".1%", 0.256).unwrap(), "25.6%");
        assert_eq!(format_value(".3g", 0.0012345).unwrap(), "0.00123");
        assert_eq!(format_value(".3g", 12.0).unwrap(), "12");
        assert!(format_value("bogus", 1.0).is_err());
    }

    #[test]
    fn ragged_rows_are_a_shape_error() {
        let err = Grid2::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, PlotError::Shape(_)));
    }

    #[test]
    fn center_makes_limits_symmetric() {
        let z = Grid2::from_rows(vec![vec![-1.0, 3.0]]).unwrap();
        let opts = HeatmapOptions {
            center: Some(0.0),
            ..Default::default()
        };
        assert_eq!(color_limits(&z, &opts).unwrap(), (-3.0, 3.0));
    }

    #[test]
    fn heatmap_puts_first_row_on_top() {
        let z = Grid2::from_fn(2, 3, |r, c| (r * 3 + c) as f64);
        let opts = HeatmapOptions {
            annotate: true,
            col_labels: Some(vec!["a".into(), "b".into(), "c".into()]),
            ..Default::default()
        };
        let (fig, id) = heatmap(&z, &GlobalPlotSettings::default(), &opts).unwrap();
        let ax = &fig[id];
        assert_eq!(ax.view_limits().1, (1.5, -0.5));
        assert!(ax.colorbar.is_some());
        // six cells plus six annotations
        assert_eq!(ax.artist_count(), 12);
    }

    #[test]
    fn label_count_is_checked() {
        let z = Grid2::from_fn(2, 2, |_, _| 1.0);
        let opts = HeatmapOptions {
            row_labels: Some(vec!["only one".into()]),
            ..Default::default()
        };
        assert!(matches!(
            heatmap(&z, &GlobalPlotSettings::default(), &opts).unwrap_err(),
            PlotError::CountMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn correlation_defaults_are_diverging() {
        let cols = vec![vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 7.0]];
        let (fig, id) = correlation_heatmap(&cols, None, &GlobalPlotSettings::default(), None).unwrap();
        let cb = fig[id].colorbar.as_ref().unwrap();
        assert_eq!((cb.vmin, cb.vmax), (-1.0, 1.0));
        assert_eq!(cb.label, "Correlation");
    }
}
