//! Pie and donut charts.

use std::f64::consts::PI;
use std::sync::LazyLock;

use regex::Regex;

use crate::color::{Color, cycle_color};
use crate::error::{PlotError, Result};
use crate::figure::{Artist, AxesId, AxesKind, Figure, FontSpec, HAlign, Patch, Stroke, TextArtist, VAlign};
use crate::settings::GlobalPlotSettings;
use crate::style::{FontSlant, FontWeight, Hatch};

const ARC_STEP_DEG: f64 = 1.0;
const PCT_DISTANCE: f64 = 0.6;

#[derive(Clone, Debug, PartialEq)]
pub struct PieOptions {
    pub colors: Option<Vec<Color>>,
    /// Radial offset of each slice, as a fraction of the radius.
    pub explode: Option<Vec<f64>>,
    pub hatches: Option<Vec<Hatch>>,
    /// One color for every edge, or one per slice.
    pub edge_colors: Option<Vec<Color>>,
    pub edge_width: f64,
    /// Where the first slice starts, in degrees counter-clockwise from the positive x axis.
    pub start_angle: f64,
    pub donut: bool,
    /// Ring width of a donut as a fraction of the radius.
    pub donut_width: f64,
    pub show_percentages: bool,
    pub show_labels: bool,
    pub label_distance: f64,
    /// printf-style format for the percentage labels, e.g. `%1.1f%%`.
    pub autopct: String,
    pub shadow: bool,
}

impl Default for PieOptions {
    fn default() -> Self {
        PieOptions {
            colors: None,
            explode: None,
            hatches: None,
            edge_colors: None,
            edge_width: 1.0,
            start_angle: 90.0,
            donut: false,
            donut_width: 0.3,
            show_percentages: true,
            show_labels: true,
            label_distance: 1.1,
            autopct: "%1.1f%%".to_string(),
            shadow: false,
        }
    }
}

/// flags, width, precision, conversion
static PCT_SPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([-+ 0]*)(\d*)(?:\.(\d+))?([fdi%])").expect("constant pattern"));

/// Render `value` through a printf-style template such as `%1.1f%%` or `%d%%`.
pub fn format_pct(template: &str, value: f64) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 4);
    let mut last = 0;
    for caps in PCT_SPEC.captures_iter(template) {
        let (Some(m), Some(conv)) = (caps.get(0), caps.get(4)) else {
            continue;
        };
        out.push_str(&template[last..m.start()]);
        last = m.end();
        let width: usize = caps.get(2).and_then(|w| w.as_str().parse().ok()).unwrap_or(0);
        let zero_pad = caps.get(1).is_some_and(|f| f.as_str().contains('0'));
        let body = match conv.as_str() {
            "%" => {
                out.push('%');
                continue;
            }
            "f" => {
                let prec: usize = caps.get(3).and_then(|p| p.as_str().parse().ok()).unwrap_or(6);
                format!("{value:.prec$}")
            }
            _ => format!("{}", value.round() as i64),
        };
        if zero_pad {
            out.push_str(&format!("{body:0>width$}"));
        } else {
            out.push_str(&format!("{body:>width$}"));
        }
    }
    out.push_str(&template[last..]);
    if last == 0 && !template.contains('%') {
        return Err(PlotError::invalid_option("autopct", template, &["%1.1f%%", "%d%%", "%.0f%%"]));
    }
    Ok(out)
}

fn check_len<T>(what: &str, list: &Option<Vec<T>>, n: usize) -> Result<()> {
    match list {
        Some(v) if v.len() != n => Err(PlotError::count_mismatch(what, n, v.len())),
        _ => Ok(()),
    }
}

/// Points along an arc from `a0` to `a1` (radians), both ends included.
fn arc(center: (f64, f64), r: f64, a0: f64, a1: f64) -> Vec<(f64, f64)> {
    let steps = (((a1 - a0).abs().to_degrees() / ARC_STEP_DEG).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let a = a0 + (a1 - a0) * i as f64 / steps as f64;
            (center.0 + r * a.cos(), center.1 + r * a.sin())
        })
        .collect()
}

/// Slice outline: a wedge, or a ring segment when `inner > 0`.
fn wedge(center: (f64, f64), inner: f64, a0: f64, a1: f64) -> Vec<(f64, f64)> {
    let mut pts = arc(center, 1.0, a0, a1);
    if inner > 0.0 {
        let mut back = arc(center, inner, a0, a1);
        back.reverse();
        pts.extend(back);
    } else {
        pts.insert(0, center);
    }
    pts
}

/// Draw a pie (or donut) of `values` with one label per slice.
pub fn pie_chart<S: AsRef<str>>(
    labels: &[S],
    values: &[f64],
    settings: &GlobalPlotSettings,
    opts: &PieOptions,
) -> Result<(Figure, AxesId)> {
    let n = values.len();
    if labels.len() != n {
        return Err(PlotError::count_mismatch("pie labels", n, labels.len()));
    }
    if n == 0 {
        return Err(PlotError::Empty("pie chart needs at least one value".into()));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(PlotError::setting("values", format!("pie values must be finite and non-negative, got {bad}")));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(PlotError::setting("values", "pie values sum to zero"));
    }
    check_len("pie colors", &opts.colors, n)?;
    check_len("explode", &opts.explode, n)?;
    check_len("hatches", &opts.hatches, n)?;
    if let Some(e) = &opts.edge_colors
        && e.len() != 1
        && e.len() != n
    {
        return Err(PlotError::count_mismatch("edge colors", n, e.len()));
    }
    if opts.donut && !(opts.donut_width > 0.0 && opts.donut_width <= 1.0) {
        return Err(PlotError::setting("donut_width", "must be in (0, 1]"));
    }
    if opts.show_percentages {
        format_pct(&opts.autopct, 0.0)?;
    }

    let (mut fig, id) = Figure::new(settings);
    let ax = &mut fig[id];
    ax.kind = AxesKind::Pie;
    ax.equal_aspect = true;
    if ax.settings.title_pad.is_none() {
        ax.settings.title_pad = Some(20.0);
    }

    let s = &ax.settings;
    let text_font = FontSpec {
        size: s.tick_label_size,
        family: s.tick_label_family.clone(),
        weight: s.tick_label_weight,
        slant: FontSlant::Normal,
        color: s.tick_label_color,
    };
    let pct_font = text_font.clone().color(Color::WHITE).weight(FontWeight::Bold);
    let inner = if opts.donut { 1.0 - opts.donut_width } else { 0.0 };
    let pct_radius = if opts.donut { 1.0 - opts.donut_width / 2.0 } else { PCT_DISTANCE };

    let mut artists = Vec::new();
    let mut shadows = Vec::new();
    let mut angle = opts.start_angle.to_radians();
    let mut reach: f64 = 1.0;
    for i in 0..n {
        let frac = values[i] / total;
        let sweep = frac * 2.0 * PI;
        let (a0, a1) = (angle, angle + sweep);
        angle = a1;
        let mid = (a0 + a1) / 2.0;
        let ex = opts.explode.as_ref().map_or(0.0, |e| e[i]);
        let center = (ex * mid.cos(), ex * mid.sin());
        reach = reach.max(1.0 + ex);

        let face = opts.colors.as_ref().map_or_else(|| cycle_color(i), |c| c[i]);
        let edge = match &opts.edge_colors {
            Some(e) if e.len() == 1 => e[0],
            Some(e) => e[i],
            None => Color::WHITE,
        };
        let mut patch = Patch::filled(face, 1.0).edge(Stroke::solid(edge, opts.edge_width));
        if let Some(h) = &opts.hatches {
            patch = patch.hatch(h[i].clone(), Color::BLACK);
        }
        if frac > 0.0 {
            let outline = wedge(center, inner, a0, a1);
            if opts.shadow {
                let dark = Color::BLACK.lerp(&face, 0.3);
                shadows.push(Artist::Polygon {
                    points: outline.iter().map(|(x, y)| (x + 0.02, y - 0.02)).collect(),
                    patch: Patch::filled(dark, 0.5),
                });
            }
            artists.push(Artist::Polygon { points: outline, patch });
        }

        if opts.show_labels {
            let d = opts.label_distance;
            let h = if mid.cos() >= 0.0 { HAlign::Left } else { HAlign::Right };
            let pos = (center.0 + d * mid.cos(), center.1 + d * mid.sin());
            artists.push(Artist::Text(
                TextArtist::new(labels[i].as_ref(), pos, text_font.clone()).align(h, VAlign::Center),
            ));
            reach = reach.max(d + ex + 0.15);
        }
        if opts.show_percentages && frac > 0.0 {
            let pos = (center.0 + pct_radius * mid.cos(), center.1 + pct_radius * mid.sin());
            let text = format_pct(&opts.autopct, frac * 100.0)?;
            artists.push(Artist::Text(TextArtist::new(text, pos, pct_font.clone())));
        }
    }
    for a in shadows {
        ax.add_artist(a, Some(0.5));
    }
    for a in artists {
        ax.add_artist(a, None);
    }
    let lim = reach.max(1.25);
    ax.set_xlim(-lim, lim);
    ax.set_ylim(-lim, lim);
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_templates() {
        assert_eq!(format_pct("%1.1f%%", 12.345).unwrap(), "12.3%");
        assert_eq!(format_pct("%d%%", 49.6).unwrap(), "50%");
        assert_eq!(format_pct("share: %.2f", 3.0).unwrap(), "share: 3.00");
        assert_eq!(format_pct("%05.1f", 3.0).unwrap(), "003.0");
        assert!(format_pct("plain", 1.0).is_err());
    }

    #[test]
    fn explode_length_is_checked() {
        let opts = PieOptions {
            explode: Some(vec![0.1]),
            ..Default::default()
        };
        let err = pie_chart(&["a", "b"], &[1.0, 2.0], &GlobalPlotSettings::default(), &opts).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn labels_must_match_values() {
        let err = pie_chart(&["a"], &[1.0, 2.0], &GlobalPlotSettings::default(), &PieOptions::default()).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { .. }));
    }

    #[test]
    fn slices_cover_the_full_circle() {
        let (fig, id) = pie_chart(&["a", "b", "c"], &[1.0, 1.0, 2.0], &GlobalPlotSettings::default(), &PieOptions::default()).unwrap();
        let ax = &fig[id];
        assert!(matches!(ax.kind, AxesKind::Pie));
        let wedges = ax
            .artists()
            .iter()
            .filter(|l| matches!(l.artist, Artist::Polygon { .. }))
            .count();
        assert_eq!(wedges, 3);
        assert_eq!(ax.view_limits().0, (-1.25, 1.25));
    }

    #[test]
    fn donut_slices_are_rings() {
        let w = wedge((0.0, 0.0), 0.7, 0.0, PI / 2.0);
        // no vertex at the center
        assert!(w.iter().all(|(x, y)| (x * x + y * y).sqrt() > 0.69));
    }
}
