//! Writing figures to PNG and SVG.
//!
//! Figures are rendered into memory first so the output can be cropped to the
//! inked area before it reaches the disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use regex::Regex;

use crate::error::{PlotError, Result};
use crate::figure::Figure;
use crate::render::draw_figure;
use crate::render::geom::PxRect;

const INCH_PER_METER: f64 = 1.0 / 0.0254;
/// Largest canvas side, in pixels.
const MAX_SIDE_PX: f64 = 65_535.0;
/// Largest canvas area, in pixels.
const MAX_AREA_PX: f64 = 1.0e8;

/// Output format, chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(PlotError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                ext
            })),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaveOptions {
    pub dpi: u32,
    /// Leave figure and axes backgrounds unpainted.
    pub transparent: bool,
    /// Crop to the drawn content plus `pad_inches`.
    pub tight: bool,
    pub pad_inches: f64,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            dpi: 300,
            transparent: false,
            tight: true,
            pad_inches: 0.02,
        }
    }
}

impl SaveOptions {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn transparent(mut self, on: bool) -> Self {
        self.transparent = on;
        self
    }

    pub fn tight(mut self, on: bool) -> Self {
        self.tight = on;
        self
    }
}

/// Pixel window `(x, y, w, h)` to keep from a `w × h` canvas.
fn crop_window(ink: Option<PxRect>, pad: f64, w: u32, h: u32) -> (u32, u32, u32, u32) {
    let Some(ink) = ink else {
        return (0, 0, w, h);
    };
    let clamp = |v: f64, max: u32| v.clamp(0.0, max as f64) as u32;
    let x0 = clamp((ink.x0 - pad).floor(), w);
    let y0 = clamp((ink.y0 - pad).floor(), h);
    let x1 = clamp((ink.x1 + pad).ceil(), w).max(x0 + 1).min(w);
    let y1 = clamp((ink.y1 + pad).ceil(), h).max(y0 + 1).min(h);
    if x1 <= x0 || y1 <= y0 {
        return (0, 0, w, h);
    }
    (x0, y0, x1 - x0, y1 - y0)
}

/// Pixel size of `fig` at `dpi`, refusing canvases too large to allocate.
fn canvas_size(fig: &Figure, dpi: u32) -> Result<(u32, u32)> {
    if dpi == 0 {
        return Err(PlotError::setting("dpi", "must be positive"));
    }
    let w = (fig.width * f64::from(dpi)).round();
    let h = (fig.height * f64::from(dpi)).round();
    if !w.is_finite() || !h.is_finite() || w > MAX_SIDE_PX || h > MAX_SIDE_PX || w * h > MAX_AREA_PX {
        return Err(PlotError::setting(
            "dpi",
            format!(
                "a {}x{} in figure at {dpi} dpi is {w}x{h} px, above the {MAX_SIDE_PX} px side or {MAX_AREA_PX} px area limit",
                fig.width, fig.height
            ),
        ));
    }
    Ok(fig.pixel_size(dpi))
}

fn render_rgb(fig: &Figure, size: (u32, u32), dpi: f64, fill: u8, transparent: bool) -> Result<(Vec<u8>, Option<PxRect>)> {
    let mut buf = vec![fill; size.0 as usize * size.1 as usize * 3];
    let ink = {
        let root = BitMapBackend::with_buffer(&mut buf, size).into_drawing_area();
        let ink = draw_figure(&root, fig, dpi, transparent)?;
        root.present().map_err(PlotError::render)?;
        ink
    };
    Ok((buf, ink))
}

/// Recover straight RGBA from the same picture drawn over white and over black.
fn unmatte(white: &[u8], black: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(white.len() / 3 * 4);
    for (w, b) in white.chunks_exact(3).zip(black.chunks_exact(3)) {
        let diff: u32 = w.iter().zip(b).map(|(w, b)| u32::from(w.saturating_sub(*b))).sum();
        let alpha = 255u32.saturating_sub(diff / 3);
        for c in b {
            let v = if alpha == 0 { 0 } else { (u32::from(*c) * 255 / alpha).min(255) };
            out.push(v as u8);
        }
        out.push(alpha as u8);
    }
    out
}

fn crop_rgba(rgba: &[u8], width: u32, (x, y, w, h): (u32, u32, u32, u32)) -> Vec<u8> {
    let stride = width as usize * 4;
    let mut out = Vec::with_capacity(w as usize * h as usize * 4);
    for row in y as usize..(y + h) as usize {
        let start = row * stride + x as usize * 4;
        out.extend_from_slice(&rgba[start..start + w as usize * 4]);
    }
    out
}

/// Encode `fig` as PNG bytes.
pub fn encode_png(fig: &Figure, opts: &SaveOptions) -> Result<Vec<u8>> {
    let (w, h) = canvas_size(fig, opts.dpi)?;
    let dpi = f64::from(opts.dpi);
    let (rgba, ink) = if opts.transparent {
        let (white, ink) = render_rgb(fig, (w, h), dpi, 255, true)?;
        let (black, _) = render_rgb(fig, (w, h), dpi, 0, true)?;
        (unmatte(&white, &black), ink)
    } else {
        let (rgb, ink) = render_rgb(fig, (w, h), dpi, 255, false)?;
        let rgba = rgb.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect();
        (rgba, ink)
    };
    let window = if opts.tight {
        crop_window(ink, opts.pad_inches * dpi, w, h)
    } else {
        (0, 0, w, h)
    };
    let pixels = crop_rgba(&rgba, w, window);

    let mut out = Vec::new();
    {
        let mut enc = png::Encoder::new(&mut out, window.2, window.3);
        enc.set_color(png::ColorType::Rgba);
        enc.set_depth(png::BitDepth::Eight);
        let ppm = (dpi * INCH_PER_METER).round() as u32;
        enc.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = enc.write_header()?;
        writer.write_image_data(&pixels)?;
    }
    Ok(out)
}

static SVG_SIZE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s(width|height|viewBox)="[^"]*""#).expect("constant pattern"));

/// Point the root `<svg>` element at the window `(x, y, w, h)`.
fn set_svg_window(svg: &str, (x, y, w, h): (u32, u32, u32, u32)) -> String {
    let Some(start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(len) = svg[start..].find('>') else {
        return svg.to_string();
    };
    let tag = &svg[start..start + len];
    let stripped = SVG_SIZE_ATTR.replace_all(tag, "");
    let new_tag = format!(
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"{x} {y} {w} {h}\"{}",
        &stripped["<svg".len()..]
    );
    format!("{}{}{}", &svg[..start], new_tag, &svg[start + len..])
}

fn render_svg(fig: &Figure, dpi: u32, transparent: bool) -> Result<(String, Option<PxRect>, (u32, u32))> {
    let size = canvas_size(fig, dpi)?;
    let mut svg = String::new();
    let ink = {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        let ink = draw_figure(&root, fig, f64::from(dpi), transparent)?;
        root.present().map_err(PlotError::render)?;
        ink
    };
    Ok((svg, ink, size))
}

/// SVG markup for `fig` at `dpi`, uncropped, for embedding.
pub fn render_svg_string(fig: &Figure, dpi: u32) -> Result<String> {
    Ok(render_svg(fig, dpi, false)?.0)
}

pub fn encode_svg(fig: &Figure, opts: &SaveOptions) -> Result<String> {
    let (svg, ink, (w, h)) = render_svg(fig, opts.dpi, opts.transparent)?;
    if !opts.tight {
        return Ok(svg);
    }
    let window = crop_window(ink, opts.pad_inches * f64::from(opts.dpi), w, h);
    Ok(set_svg_window(&svg, window))
}

/// Write `fig` to `path` as PNG or SVG, creating parent directories.
pub fn save_plot(fig: &Figure, path: impl AsRef<Path>, opts: &SaveOptions) -> Result<PathBuf> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    match format {
        ImageFormat::Png => fs::write(path, encode_png(fig, opts)?)?,
        ImageFormat::Svg => fs::write(path, encode_svg(fig, opts)?)?,
    }
    log::info!("saved {}", path.display());
    Ok(path.to_path_buf())
}

impl Figure {
    /// Shorthand for [`save_plot`].
    pub fn save(&self, path: impl AsRef<Path>, opts: &SaveOptions) -> Result<PathBuf> {
        save_plot(self, path, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_picks_the_format() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path(Path::new("plot.svg")).unwrap(), ImageFormat::Svg);
        assert!(matches!(
            ImageFormat::from_path(Path::new("plot.pdf")),
            Err(PlotError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
        assert!(ImageFormat::from_path(Path::new("plot")).is_err());
    }

    #[test]
    fn crop_pads_and_clamps() {
        let ink = PxRect::new(10.0, 20.0, 50.0, 60.0);
        assert_eq!(crop_window(Some(ink), 5.0, 100, 100), (5, 15, 50, 50));
        assert_eq!(crop_window(Some(ink), 30.0, 70, 70), (0, 0, 70, 70));
        assert_eq!(crop_window(None, 5.0, 30, 40), (0, 0, 30, 40));
    }

    #[test]
    fn unmatte_recovers_alpha() {
        // opaque red, fully transparent, half-covered black
        let white = [255, 0, 0, 255, 255, 255, 127, 127, 127];
        let black = [255, 0, 0, 0, 0, 0, 0, 0, 0];
        let rgba = unmatte(&white, &black);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        assert_eq!(rgba[7], 0);
        assert_eq!(&rgba[8..12], &[0, 0, 0, 128]);
    }

    #[test]
    fn svg_window_rewrites_only_the_root_tag() {
        let svg = r#"<svg width="100" height="80" viewBox="0 0 100 80" xmlns="http://www.w3.org/2000/svg"><rect width="5" height="5"/></svg>"#;
        let out = set_svg_window(svg, (10, 5, 40, 30));
        assert!(out.starts_with(r#"<svg width="40" height="30" viewBox="10 5 40 30" xmlns="http://www.w3.org/2000/svg">"#));
        assert!(out.contains(r#"<rect width="5" height="5"/>"#));
    }
}
