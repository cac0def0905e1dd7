//! The formatting every Cartesian axes receives from its settings: background,
//! grid, spines, ticks, tick labels, axis labels and title.

use plotters::prelude::DrawingBackend;

use crate::error::Result;
use crate::figure::{Axes, AxesKind, FontSpec, HAlign, Stroke, VAlign};
use crate::settings::GlobalPlotSettings;
use crate::style::{FontSlant, GridAxis, GridWhich, LineStyle};

use super::canvas::Canvas;
use super::geom::PxRect;
use super::ticks::{self, AxisTicks};
use super::transform::{AxisMap, DataTransform};

/// Lengths in points.
pub const TICK_MAJOR_LEN: f64 = 3.5;
pub const TICK_MINOR_LEN: f64 = 2.0;
pub const TICK_PAD: f64 = 3.5;
pub const LABEL_PAD: f64 = 4.0;
pub const TITLE_PAD: f64 = 6.0;
pub const SPINE_WIDTH: f64 = 0.8;
const MINOR_TICK_WIDTH: f64 = 0.6;

/// Space around a plot rectangle taken by its decorations, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

pub fn tick_font(s: &GlobalPlotSettings, x_axis: bool) -> FontSpec {
    FontSpec {
        size: if x_axis { s.x_tick_label_size } else { s.y_tick_label_size },
        family: s.tick_label_family.clone(),
        weight: s.tick_label_weight,
        slant: FontSlant::Normal,
        color: s.tick_label_color,
    }
}

pub fn label_font(s: &GlobalPlotSettings, x_axis: bool) -> FontSpec {
    FontSpec {
        size: if x_axis { s.x_axis_label_size } else { s.y_axis_label_size },
        family: s.axis_label_family.clone(),
        weight: s.axis_label_weight,
        slant: s.axis_label_style,
        color: s.axis_label_color,
    }
}

pub fn title_font(s: &GlobalPlotSettings) -> FontSpec {
    FontSpec {
        size: s.title_size,
        family: s.title_family.clone(),
        weight: s.title_weight,
        slant: s.title_style,
        color: s.title_color,
    }
}

pub fn legend_font(s: &GlobalPlotSettings) -> FontSpec {
    FontSpec::new(s.legend_font_size)
        .family(s.legend_font_family.clone())
        .weight(s.legend_font_weight)
}

/// How many major intervals fit an axis of `len_px` (x labels need more room).
pub fn tick_target(len_px: f64, font_px: f64, x_axis: bool) -> usize {
    let per = font_px.max(1.0) * if x_axis { 3.0 } else { 2.0 };
    ((len_px / per).floor() as usize).clamp(2, 9)
}

/// Ticks for one axis: explicit settings win, then per-axes overrides, then automatic.
pub fn axis_ticks(ax: &Axes, x_axis: bool, map: &AxisMap, len_px: f64, px_per_pt: f64) -> AxisTicks {
    let s = &ax.settings;
    let locale = s.number_locale.as_deref();
    let (ticks, labels, overrides) = if x_axis {
        (&s.x_ticks, &s.x_tick_labels, &ax.x_tick_override)
    } else {
        (&s.y_ticks, &s.y_tick_labels, &ax.y_tick_override)
    };
    let mut out = if let Some(values) = ticks {
        ticks::fixed(values, labels.as_deref(), locale)
    } else if let Some(fixed) = overrides {
        let values: Vec<f64> = fixed.iter().map(|(v, _)| *v).collect();
        let names: Vec<String> = fixed.iter().map(|(_, l)| l.clone()).collect();
        ticks::fixed(&values, Some(&names), locale)
    } else {
        let want_minor = s.show_minor_ticks
            || (s.show_grid && matches!(s.grid_which, GridWhich::Minor | GridWhich::Both));
        let font_px = tick_font(s, x_axis).size * px_per_pt;
        let target = tick_target(len_px, font_px, x_axis);
        let t = ticks::locate(map.scale, (map.lo, map.hi), target, want_minor, locale);
        log::debug!(
            "{} axis: {} major ticks for limits {:?}",
            if x_axis { "x" } else { "y" },
            t.major.len(),
            (map.lo, map.hi)
        );
        t
    };
    out.major.retain(|t| map.contains(t.value));
    out.minor.retain(|v| map.contains(*v));
    out
}

fn shows_frame(ax: &Axes) -> bool {
    matches!(ax.kind, AxesKind::Cartesian)
}

/// Decoration space around the plot rectangle of `ax`.
pub fn insets<DB: DrawingBackend>(canvas: &Canvas<'_, DB>, ax: &Axes, tf: &DataTransform) -> Insets {
    let s = &ax.settings;
    let mut ins = Insets::default();
    if !s.title.is_empty() {
        let (_, h) = canvas.measure(&s.title, &title_font(s));
        ins.top = h + canvas.pt(s.title_pad.unwrap_or(TITLE_PAD));
    }
    if !shows_frame(ax) {
        return ins;
    }
    let tick_space = canvas.pt(TICK_MAJOR_LEN + TICK_PAD);
    let xf = tick_font(s, true);
    let yf = tick_font(s, false);
    let xt = axis_ticks(ax, true, &tf.x, tf.rect.width(), canvas.px_per_pt);
    let yt = axis_ticks(ax, false, &tf.y, tf.rect.height(), canvas.px_per_pt);

    if ax.show_x_ticklabels && !xt.major.is_empty() {
        let h = xt
            .major
            .iter()
            .map(|t| canvas.measure(&t.label, &xf).1)
            .fold(0.0, f64::max);
        ins.bottom += tick_space + h;
        // the outermost labels hang over the plot edges
        let half = |t: Option<&ticks::Tick>| t.map(|t| canvas.measure(&t.label, &xf).0 / 2.0).unwrap_or(0.0);
        ins.right = ins.right.max(half(xt.major.last()));
        ins.left = ins.left.max(half(xt.major.first()));
    } else {
        ins.bottom += canvas.pt(TICK_MAJOR_LEN);
    }
    if ax.show_y_ticklabels && !yt.major.is_empty() {
        let w = yt
            .major
            .iter()
            .map(|t| canvas.measure(&t.label, &yf).0)
            .fold(0.0, f64::max);
        ins.left = ins.left.max(tick_space + w);
        let h = canvas.measure("0", &yf).1 / 2.0;
        ins.top = ins.top.max(h);
    } else {
        ins.left = ins.left.max(canvas.pt(TICK_MAJOR_LEN));
    }
    if ax.show_x_label && !s.x_label.is_empty() {
        ins.bottom += canvas.pt(LABEL_PAD) + canvas.measure(&s.x_label, &label_font(s, true)).1;
    }
    if ax.show_y_label && !s.y_label.is_empty() {
        ins.left += canvas.pt(LABEL_PAD) + canvas.measure(&s.y_label, &label_font(s, false)).1;
    }
    ins
}

/// Axes background.
pub fn draw_background<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, ax: &Axes, rect: &PxRect) -> Result<()> {
    if matches!(ax.kind, AxesKind::Pie) {
        return Ok(());
    }
    canvas.fill_rect(*rect, ax.settings.axes_facecolor, 1.0)
}

pub fn draw_grid<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    ax: &Axes,
    tf: &DataTransform,
    xt: &AxisTicks,
    yt: &AxisTicks,
) -> Result<()> {
    let s = &ax.settings;
    if !s.show_grid || !shows_frame(ax) {
        return Ok(());
    }
    let major = Stroke::solid(s.grid_color, s.grid_linewidth)
        .styled(s.grid_style)
        .alpha(s.grid_alpha);
    let minor = Stroke {
        width: s.grid_linewidth * 0.6,
        ..major.clone()
    };
    let want_major = matches!(s.grid_which, GridWhich::Major | GridWhich::Both);
    let want_minor = matches!(s.grid_which, GridWhich::Minor | GridWhich::Both);
    let r = tf.rect;
    let mut lines: Vec<(bool, f64, &Stroke)> = Vec::new();
    if matches!(s.grid_axis, GridAxis::Both | GridAxis::X) {
        if want_major {
            lines.extend(xt.major.iter().map(|t| (true, t.value, &major)));
        }
        if want_minor {
            lines.extend(xt.minor.iter().map(|v| (true, *v, &minor)));
        }
    }
    if matches!(s.grid_axis, GridAxis::Both | GridAxis::Y) {
        if want_major {
            lines.extend(yt.major.iter().map(|t| (false, t.value, &major)));
        }
        if want_minor {
            lines.extend(yt.minor.iter().map(|v| (false, *v, &minor)));
        }
    }
    for (vertical, v, stroke) in lines {
        let pts = if vertical {
            let x = tf.x.map(v);
            vec![(x, r.y1), (x, r.y0)]
        } else {
            let y = tf.y.map(v);
            vec![(r.x0, y), (r.x1, y)]
        };
        canvas.stroke_polyline(&pts, stroke, Some(&r))?;
    }
    Ok(())
}

/// Spines, ticks, tick labels and axis labels.
pub fn draw_frame<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    ax: &Axes,
    tf: &DataTransform,
    xt: &AxisTicks,
    yt: &AxisTicks,
) -> Result<()> {
    if !shows_frame(ax) {
        return Ok(());
    }
    let s = &ax.settings;
    let r = tf.rect;
    let spine = Stroke::solid(crate::color::Color::BLACK, SPINE_WIDTH).styled(LineStyle::Solid);
    let sides = [
        (s.show_top_spine, [(r.x0, r.y0), (r.x1, r.y0)]),
        (s.show_right_spine, [(r.x1, r.y0), (r.x1, r.y1)]),
        (s.show_bottom_spine, [(r.x0, r.y1), (r.x1, r.y1)]),
        (s.show_left_spine, [(r.x0, r.y0), (r.x0, r.y1)]),
    ];
    for (shown, seg) in sides {
        if shown {
            canvas.stroke_polyline(&seg, &spine, None)?;
        }
    }

    let major_len = canvas.pt(TICK_MAJOR_LEN);
    let minor_len = canvas.pt(TICK_MINOR_LEN);
    let minor_stroke = Stroke::solid(crate::color::Color::BLACK, MINOR_TICK_WIDTH);
    let show_minor = s.show_minor_ticks;
    for t in &xt.major {
        let x = tf.x.map(t.value);
        canvas.stroke_polyline(&[(x, r.y1), (x, r.y1 + major_len)], &spine, None)?;
    }
    if show_minor {
        for v in &xt.minor {
            let x = tf.x.map(*v);
            canvas.stroke_polyline(&[(x, r.y1), (x, r.y1 + minor_len)], &minor_stroke, None)?;
        }
    }
    for t in &yt.major {
        let y = tf.y.map(t.value);
        canvas.stroke_polyline(&[(r.x0 - major_len, y), (r.x0, y)], &spine, None)?;
    }
    if show_minor {
        for v in &yt.minor {
            let y = tf.y.map(*v);
            canvas.stroke_polyline(&[(r.x0 - minor_len, y), (r.x0, y)], &minor_stroke, None)?;
        }
    }

    let pad = canvas.pt(TICK_MAJOR_LEN + TICK_PAD);
    let mut label_bottom = r.y1 + major_len;
    if ax.show_x_ticklabels {
        let f = tick_font(s, true);
        for t in &xt.major {
            let x = tf.x.map(t.value);
            let b = canvas.draw_text(&t.label, (x, r.y1 + pad), &f, HAlign::Center, VAlign::Top, false)?;
            label_bottom = label_bottom.max(b.y1);
        }
    }
    let mut label_left = r.x0 - major_len;
    if ax.show_y_ticklabels {
        let f = tick_font(s, false);
        for t in &yt.major {
            let y = tf.y.map(t.value);
            let b = canvas.draw_text(&t.label, (r.x0 - pad, y), &f, HAlign::Right, VAlign::Center, false)?;
            label_left = label_left.min(b.x0);
        }
    }
    if ax.show_x_label && !s.x_label.is_empty() {
        let anchor = (r.center().0, label_bottom + canvas.pt(LABEL_PAD));
        canvas.draw_text(&s.x_label, anchor, &label_font(s, true), HAlign::Center, VAlign::Top, false)?;
    }
    if ax.show_y_label && !s.y_label.is_empty() {
        let anchor = (label_left - canvas.pt(LABEL_PAD), r.center().1);
        canvas.draw_text(&s.y_label, anchor, &label_font(s, false), HAlign::Right, VAlign::Center, true)?;
    }
    Ok(())
}

/// Axes title, centered above the plot rectangle.
pub fn draw_title<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, ax: &Axes, rect: &PxRect, top_extra: f64) -> Result<()> {
    let s = &ax.settings;
    if s.title.is_empty() {
        return Ok(());
    }
    let y = rect.y0 - canvas.pt(s.title_pad.unwrap_or(TITLE_PAD)) - top_extra;
    canvas.draw_text(&s.title, (rect.center().0, y), &title_font(s), HAlign::Center, VAlign::Bottom, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Scale;

    #[test]
    fn tick_targets_are_bounded() {
        assert_eq!(tick_target(10.0, 10.0, true), 2);
        assert_eq!(tick_target(10_000.0, 10.0, true), 9);
        assert!(tick_target(120.0, 10.0, false) > tick_target(120.0, 10.0, true));
    }

    #[test]
    fn explicit_ticks_beat_overrides() {
        let mut ax = Axes::new(&GlobalPlotSettings::default());
        ax.set_x_ticks(vec![(0.0, "zero".into())]);
        ax.settings.x_ticks = Some(vec![0.0, 0.5]);
        let map = AxisMap::new(Scale::Linear, (0.0, 1.0), 0.0, 100.0);
        let t = axis_ticks(&ax, true, &map, 100.0, 1.0);
        assert_eq!(t.major.len(), 2);
        assert_eq!(t.major[1].label, "0.5");
    }

    #[test]
    fn ticks_outside_limits_are_dropped() {
        let mut ax = Axes::new(&GlobalPlotSettings::default());
        ax.set_y_ticks(vec![(-1.0, "a".into()), (0.5, "b".into()), (3.0, "c".into())]);
        let map = AxisMap::new(Scale::Linear, (0.0, 1.0), 100.0, 0.0);
        let t = axis_ticks(&ax, false, &map, 100.0, 1.0);
        assert_eq!(t.major.len(), 1);
        assert_eq!(t.major[0].label, "b");
    }
}
