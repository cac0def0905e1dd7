//! Turns a [`Figure`] into plotters draw calls.
//!
//! Rendering is backend-agnostic: the exporter hands in a bitmap or SVG
//! drawing area and gets back the bounding box of all inked pixels.

pub mod canvas;
pub mod colorbar;
pub mod decor;
pub mod geom;
pub mod layout;
pub mod legend;
pub mod text;
pub mod three_d;
pub mod ticks;
pub mod transform;

use std::sync::Once;

use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};
use plotters::style::FontStyle;

use crate::error::Result;
use crate::figure::{Artist, AxesId, AxesKind, Figure, HAlign, VAlign, artist::z};

use canvas::Canvas;
use geom::{Px, PxRect};
use layout::Placement;
use transform::DataTransform;

/// One-time registration of the bundled fonts for the `ab_glyph` text path,
/// which does not discover system fonts.
static INIT_FONTS: Once = Once::new();

pub fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let faces: [(&str, [&'static [u8]; 3]); 3] = [
            (
                "sans-serif",
                [
                    include_bytes!("../../assets/DejaVuSans.ttf"),
                    include_bytes!("../../assets/DejaVuSans-Bold.ttf"),
                    include_bytes!("../../assets/DejaVuSans-Oblique.ttf"),
                ],
            ),
            (
                "serif",
                [
                    include_bytes!("../../assets/DejaVuSerif.ttf"),
                    include_bytes!("../../assets/DejaVuSerif-Bold.ttf"),
                    include_bytes!("../../assets/DejaVuSerif-Italic.ttf"),
                ],
            ),
            (
                "monospace",
                [
                    include_bytes!("../../assets/DejaVuSansMono.ttf"),
                    include_bytes!("../../assets/DejaVuSansMono-Bold.ttf"),
                    include_bytes!("../../assets/DejaVuSansMono-Oblique.ttf"),
                ],
            ),
        ];
        for (name, [regular, bold, slanted]) in faces {
            for (style, bytes) in [
                (FontStyle::Normal, regular),
                (FontStyle::Bold, bold),
                (FontStyle::Italic, slanted),
                (FontStyle::Oblique, slanted),
            ] {
                if plotters::style::register_font(name, style, bytes).is_err() {
                    log::warn!("could not register bundled font {name} ({})", style.as_str());
                }
            }
        }
    });
}

/// Draw `fig` onto `area` at `dpi`. Returns the inked bounding box, if anything was drawn.
pub fn draw_figure<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    fig: &Figure,
    dpi: f64,
    transparent: bool,
) -> Result<Option<PxRect>> {
    ensure_fonts_registered();
    let mut canvas = Canvas::new(area, dpi);
    if !transparent {
        canvas.fill_background(fig.facecolor)?;
    }
    let plan = layout::plan(&canvas, fig);
    for (id, place) in fig.axes_ids().zip(&plan.axes) {
        let ax = &fig[id];
        match &ax.kind {
            AxesKind::ThreeD(view) => {
                three_d::draw_3d(&mut canvas, ax, view, &place.plot)?;
                decor::draw_title(&mut canvas, ax, &place.plot, 0.0)?;
            }
            AxesKind::Cartesian | AxesKind::Pie => {
                draw_cartesian(&mut canvas, fig, id, place, transparent)?;
            }
        }
        if let (Some(cb), Some(rect)) = (&ax.colorbar, &place.colorbar) {
            colorbar::draw_colorbar(&mut canvas, cb, rect, &ax.settings)?;
        }
    }
    if let (Some(title), Some(anchor)) = (&fig.suptitle, plan.suptitle) {
        canvas.draw_text(&title.text, anchor, &title.font, HAlign::Center, VAlign::Top, false)?;
    }
    Ok(canvas.ink())
}

fn draw_cartesian<DB: DrawingBackend>(
    canvas: &mut Canvas<'_, DB>,
    fig: &Figure,
    id: AxesId,
    place: &Placement,
    transparent: bool,
) -> Result<()> {
    let ax = &fig[id];
    let s = &ax.settings;
    let (xl, yl) = fig.resolved_limits(id);
    let tf = DataTransform::new(place.plot, (s.x_scale, xl), (s.y_scale, yl));
    let rect = tf.rect;
    if !transparent {
        decor::draw_background(canvas, ax, &rect)?;
    }
    let xt = decor::axis_ticks(ax, true, &tf.x, rect.width(), canvas.px_per_pt);
    let yt = decor::axis_ticks(ax, false, &tf.y, rect.height(), canvas.px_per_pt);

    let artists = ax.artists();
    let split = artists.partition_point(|l| l.z < z::GRID);
    for l in &artists[..split] {
        draw_artist(canvas, &tf, &l.artist)?;
    }
    decor::draw_grid(canvas, ax, &tf, &xt, &yt)?;
    for l in &artists[split..] {
        draw_artist(canvas, &tf, &l.artist)?;
    }
    decor::draw_frame(canvas, ax, &tf, &xt, &yt)?;

    let data: Vec<Px> = artists
        .iter()
        .flat_map(|l| match &l.artist {
            Artist::Line { points, .. } | Artist::Markers { points, .. } | Artist::Polygon { points, .. } => {
                tf.map_points(points)
            }
            _ => Vec::new(),
        })
        .collect();
    legend::draw_legend(canvas, ax, &rect, &data)?;
    decor::draw_title(canvas, ax, &rect, 0.0)
}

/// Draw one artist of a Cartesian axes, clipped to its plot rectangle.
pub fn draw_artist<DB: DrawingBackend>(canvas: &mut Canvas<'_, DB>, tf: &DataTransform, artist: &Artist) -> Result<()> {
    let rect = tf.rect;
    match artist {
        Artist::Line { points, stroke } => canvas.stroke_polyline(&tf.map_points(points), stroke, Some(&rect)),
        Artist::Markers { points, style } => {
            let bounds = rect.inset(-0.5, -0.5, -0.5, -0.5);
            for p in tf.map_points(points) {
                if bounds.contains(p) {
                    canvas.draw_marker(p, style)?;
                }
            }
            Ok(())
        }
        Artist::Polygon { points, patch } => canvas.draw_patch(&tf.map_points(points), patch, Some(&rect)),
        Artist::Text(t) => {
            let at = tf.place(t.pos, t.coords);
            if !(at.0.is_finite() && at.1.is_finite()) {
                return Ok(());
            }
            if let Some(bg) = t.background {
                let b = canvas.text_box(&t.text, at, &t.font, t.h_align, t.v_align, false);
                let m = canvas.pt(t.font.size * 0.3);
                canvas.fill_rect(b.inset(-m, -m, -m, -m), bg, 1.0)?;
            }
            canvas.draw_text(&t.text, at, &t.font, t.h_align, t.v_align, false)?;
            Ok(())
        }
        Artist::AxLine { value, vertical, stroke } => {
            let pts = if *vertical {
                if !tf.x.contains(*value) {
                    return Ok(());
                }
                let x = tf.x.map(*value);
                [(x, rect.y1), (x, rect.y0)]
            } else {
                if !tf.y.contains(*value) {
                    return Ok(());
                }
                let y = tf.y.map(*value);
                [(rect.x0, y), (rect.x1, y)]
            };
            canvas.stroke_polyline(&pts, stroke, Some(&rect))
        }
        // 3D artists only render through a projection
        Artist::Surface { .. } | Artist::Line3 { .. } => Ok(()),
    }
}
