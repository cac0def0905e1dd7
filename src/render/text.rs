//! Text styles and measurement.
//!
//! Sizes in [`FontSpec`] are points; everything returned here is pixels.

use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};

use crate::figure::FontSpec;
use crate::style::{FontSlant, FontWeight};

/// Spacing between lines of multi-line text, as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.2;

/// Heuristic: estimate pixel width of text when the font cannot be measured.
pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    (text.chars().count() as f64 * font_px * 0.60).ceil()
}

/// Bold wins when both weight and slant are set; the bundled fonts have no bold italic.
pub fn font_style(weight: FontWeight, slant: FontSlant) -> FontStyle {
    match (weight, slant) {
        (FontWeight::Bold, _) => FontStyle::Bold,
        (FontWeight::Normal, FontSlant::Italic) => FontStyle::Italic,
        (FontWeight::Normal, FontSlant::Oblique) => FontStyle::Oblique,
        (FontWeight::Normal, FontSlant::Normal) => FontStyle::Normal,
    }
}

pub fn font_px(font: &FontSpec, px_per_pt: f64) -> f64 {
    (font.size * px_per_pt).max(1.0)
}

pub fn font_desc(font: &FontSpec, px_per_pt: f64, rotated: bool) -> FontDesc<'static> {
    let desc = FontDesc::new(
        FontFamily::Name(font.family.render_name()),
        font_px(font, px_per_pt),
        font_style(font.weight, font.slant),
    );
    if rotated {
        desc.transform(FontTransform::Rotate270)
    } else {
        desc
    }
}

/// Width of one line of text in pixels.
pub fn line_width_px(line: &str, font: &FontSpec, px_per_pt: f64) -> f64 {
    if line.is_empty() {
        return 0.0;
    }
    match font_desc(font, px_per_pt, false).box_size(line) {
        Ok((w, _)) => w as f64,
        Err(_) => estimate_text_width_px(line, font_px(font, px_per_pt)),
    }
}

/// Unrotated `(width, height)` of a possibly multi-line block.
pub fn measure(text: &str, font: &FontSpec, px_per_pt: f64) -> (f64, f64) {
    if text.is_empty() {
        return (0.0, 0.0);
    }
    let px = font_px(font, px_per_pt);
    let lines: Vec<&str> = text.lines().collect();
    let w = lines
        .iter()
        .map(|l| line_width_px(l, font, px_per_pt))
        .fold(0.0, f64::max);
    let h = px * (1.0 + LINE_SPACING * (lines.len().max(1) - 1) as f64);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_wins_over_italic() {
        assert!(matches!(
            font_style(FontWeight::Bold, FontSlant::Italic),
            FontStyle::Bold
        ));
        assert!(matches!(
            font_style(FontWeight::Normal, FontSlant::Oblique),
            FontStyle::Oblique
        ));
    }

    #[test]
    fn multi_line_blocks_grow_by_line_spacing() {
        let f = FontSpec::new(10.0);
        let (_, one) = measure("a", &f, 1.0);
        let (_, two) = measure("a\nb", &f, 1.0);
        assert!((one - 10.0).abs() < 1e-9);
        assert!((two - 22.0).abs() < 1e-9);
    }

    #[test]
    fn estimate_scales_with_length() {
        assert_eq!(estimate_text_width_px("abcd", 10.0), 24.0);
        assert_eq!(measure("", &FontSpec::new(12.0), 2.0), (0.0, 0.0));
    }
}
