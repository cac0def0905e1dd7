//! Figure-wide formatting settings.
//!
//! [`GlobalPlotSettings`] is always fully populated: per-axis sizes are filled
//! from their shared fallback and the aspect ratio is applied exactly once, in
//! [`PlotSettingsBuilder::build`]. Renderers never re-check fallbacks.
//!
//! ```
//! use figspec::GlobalPlotSettings;
//!
//! let s = GlobalPlotSettings::builder()
//!     .figure_width(6.0)
//!     .aspect_ratio(1.5)
//!     .tick_label_size(11.0)
//!     .build()?;
//! assert_eq!(s.figure_height, 4.0);
//! assert_eq!(s.x_tick_label_size, 11.0);
//! # Ok::<(), figspec::PlotError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::Color;
use crate::error::{PlotError, Result};
use crate::style::{
    FontFamily, FontSlant, FontWeight, GridAxis, GridWhich, LegendLocation, LineStyle, Scale,
};

pub const SETTINGS_VERSION: &str = "2.0";

/// Manual subplot spacing, as fractions of the figure.
/// Unset entries keep the layout engine's value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubplotAdjust {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hspace: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wspace: Option<f64>,
}

/// Global configuration for a figure: everything that is not tied to one data series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalPlotSettings {
    // metadata
    pub version: String,
    pub description: String,
    pub created: String,

    // figure
    pub figure_width: f64,
    pub figure_height: f64,
    pub dpi: u32,
    pub aspect_ratio: Option<f64>,
    pub figure_facecolor: Color,
    pub axes_facecolor: Color,

    // tick labels
    pub tick_label_size: f64,
    pub x_tick_label_size: f64,
    pub y_tick_label_size: f64,
    pub tick_label_family: FontFamily,
    pub tick_label_weight: FontWeight,
    pub tick_label_color: Color,

    // axis labels
    pub axis_label_size: f64,
    pub x_axis_label_size: f64,
    pub y_axis_label_size: f64,
    pub axis_label_family: FontFamily,
    pub axis_label_weight: FontWeight,
    pub axis_label_color: Color,
    pub axis_label_style: FontSlant,

    // title
    pub title_size: f64,
    pub title_family: FontFamily,
    pub title_weight: FontWeight,
    pub title_style: FontSlant,
    pub title_color: Color,
    pub title_pad: Option<f64>,

    // legend text
    pub legend_font_size: f64,
    pub legend_font_family: FontFamily,
    pub legend_font_weight: FontWeight,
    pub legend_title_weight: FontWeight,

    pub title: String,
    pub x_label: String,
    pub y_label: String,

    // axes
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub x_ticks: Option<Vec<f64>>,
    pub y_ticks: Option<Vec<f64>>,
    pub x_tick_labels: Option<Vec<String>>,
    pub y_tick_labels: Option<Vec<String>>,
    pub show_minor_ticks: bool,

    // spines
    pub show_top_spine: bool,
    pub show_right_spine: bool,
    pub show_bottom_spine: bool,
    pub show_left_spine: bool,

    // legend
    pub show_legend: bool,
    pub legend_location: LegendLocation,
    pub legend_frameon: bool,
    pub legend_framealpha: f64,
    pub legend_shadow: bool,

    // grid
    pub show_grid: bool,
    pub grid_which: GridWhich,
    pub grid_axis: GridAxis,
    pub grid_alpha: f64,
    pub grid_style: LineStyle,
    pub grid_linewidth: f64,
    pub grid_color: Color,

    // layout
    pub tight_layout: bool,
    pub subplot_adjust: Option<SubplotAdjust>,

    /// Thousands separator convention for tick labels (`en`, `de`, `fr`, …).
    pub number_locale: Option<String>,
}

macro_rules! builder_setters {
    ($( $field:ident : $ty:ty ),+ $(,)?) => {
        impl PlotSettingsBuilder {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )+
        }
    };
}

/// Raw, all-optional settings as read from a file or assembled by a caller.
///
/// Unknown keys are ignored on deserialisation and missing keys fall back to
/// defaults in [`build`](Self::build).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettingsBuilder {
    pub version: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    pub figure_width: Option<f64>,
    pub figure_height: Option<f64>,
    pub dpi: Option<u32>,
    pub aspect_ratio: Option<f64>,
    pub figure_facecolor: Option<Color>,
    pub axes_facecolor: Option<Color>,
    pub tick_label_size: Option<f64>,
    pub x_tick_label_size: Option<f64>,
    pub y_tick_label_size: Option<f64>,
    pub tick_label_family: Option<FontFamily>,
    pub tick_label_weight: Option<FontWeight>,
    pub tick_label_color: Option<Color>,
    pub axis_label_size: Option<f64>,
    pub x_axis_label_size: Option<f64>,
    pub y_axis_label_size: Option<f64>,
    pub axis_label_family: Option<FontFamily>,
    pub axis_label_weight: Option<FontWeight>,
    pub axis_label_color: Option<Color>,
    pub axis_label_style: Option<FontSlant>,
    pub title_size: Option<f64>,
    pub title_family: Option<FontFamily>,
    pub title_weight: Option<FontWeight>,
    pub title_style: Option<FontSlant>,
    pub title_color: Option<Color>,
    pub title_pad: Option<f64>,
    pub legend_font_size: Option<f64>,
    pub legend_font_family: Option<FontFamily>,
    pub legend_font_weight: Option<FontWeight>,
    pub legend_title_weight: Option<FontWeight>,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_scale: Option<Scale>,
    pub y_scale: Option<Scale>,
    pub x_limits: Option<(f64, f64)>,
    pub y_limits: Option<(f64, f64)>,
    pub x_ticks: Option<Vec<f64>>,
    pub y_ticks: Option<Vec<f64>>,
    pub x_tick_labels: Option<Vec<String>>,
    pub y_tick_labels: Option<Vec<String>>,
    pub show_minor_ticks: Option<bool>,
    pub show_top_spine: Option<bool>,
    pub show_right_spine: Option<bool>,
    pub show_bottom_spine: Option<bool>,
    pub show_left_spine: Option<bool>,
    pub show_legend: Option<bool>,
    pub legend_location: Option<LegendLocation>,
    pub legend_frameon: Option<bool>,
    pub legend_framealpha: Option<f64>,
    pub legend_shadow: Option<bool>,
    pub show_grid: Option<bool>,
    pub grid_which: Option<GridWhich>,
    pub grid_axis: Option<GridAxis>,
    pub grid_alpha: Option<f64>,
    pub grid_style: Option<LineStyle>,
    pub grid_linewidth: Option<f64>,
    pub grid_color: Option<Color>,
    pub tight_layout: Option<bool>,
    pub subplot_adjust: Option<SubplotAdjust>,
    pub number_locale: Option<String>,
}

builder_setters! {
    version: String,
    description: String,
    created: String,
    figure_width: f64,
    figure_height: f64,
    dpi: u32,
    aspect_ratio: f64,
    figure_facecolor: Color,
    axes_facecolor: Color,
    tick_label_size: f64,
    x_tick_label_size: f64,
    y_tick_label_size: f64,
    tick_label_family: FontFamily,
    tick_label_weight: FontWeight,
    tick_label_color: Color,
    axis_label_size: f64,
    x_axis_label_size: f64,
    y_axis_label_size: f64,
    axis_label_family: FontFamily,
    axis_label_weight: FontWeight,
    axis_label_color: Color,
    axis_label_style: FontSlant,
    title_size: f64,
    title_family: FontFamily,
    title_weight: FontWeight,
    title_style: FontSlant,
    title_color: Color,
    title_pad: f64,
    legend_font_size: f64,
    legend_font_family: FontFamily,
    legend_font_weight: FontWeight,
    legend_title_weight: FontWeight,
    title: String,
    x_label: String,
    y_label: String,
    x_scale: Scale,
    y_scale: Scale,
    x_limits: (f64, f64),
    y_limits: (f64, f64),
    x_ticks: Vec<f64>,
    y_ticks: Vec<f64>,
    x_tick_labels: Vec<String>,
    y_tick_labels: Vec<String>,
    show_minor_ticks: bool,
    show_top_spine: bool,
    show_right_spine: bool,
    show_bottom_spine: bool,
    show_left_spine: bool,
    show_legend: bool,
    legend_location: LegendLocation,
    legend_frameon: bool,
    legend_framealpha: f64,
    legend_shadow: bool,
    show_grid: bool,
    grid_which: GridWhich,
    grid_axis: GridAxis,
    grid_alpha: f64,
    grid_style: LineStyle,
    grid_linewidth: f64,
    grid_color: Color,
    tight_layout: bool,
    subplot_adjust: SubplotAdjust,
    number_locale: String,
}

impl PlotSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide the top and right spines (a common journal style).
    pub fn despine(self) -> Self {
        self.show_top_spine(false).show_right_spine(false)
    }

    /// Parse a color option from text, e.g. `"#333333"` or `"C2"`.
    pub fn color_str(self, field: &str, value: &str) -> Result<Self> {
        let c: Color = value.parse()?;
        let mut b = self;
        match field {
            "figure_facecolor" => b.figure_facecolor = Some(c),
            "axes_facecolor" => b.axes_facecolor = Some(c),
            "tick_label_color" => b.tick_label_color = Some(c),
            "axis_label_color" => b.axis_label_color = Some(c),
            "title_color" => b.title_color = Some(c),
            "grid_color" => b.grid_color = Some(c),
            other => {
                return Err(PlotError::invalid_option(
                    "color field",
                    other,
                    &[
                        "figure_facecolor",
                        "axes_facecolor",
                        "tick_label_color",
                        "axis_label_color",
                        "title_color",
                        "grid_color",
                    ],
                ));
            }
        }
        Ok(b)
    }

    /// Run the single defaulting pass and validate the result.
    pub fn build(self) -> Result<GlobalPlotSettings> {
        let figure_width = self.figure_width.unwrap_or(8.0);
        let figure_height = match self.aspect_ratio {
            Some(ratio) if ratio > 0.0 => figure_width / ratio,
            Some(ratio) => {
                return Err(PlotError::setting(
                    "aspect_ratio",
                    format!("must be positive, got {ratio}"),
                ));
            }
            None => self.figure_height.unwrap_or(6.0),
        };
        let tick_label_size = self.tick_label_size.unwrap_or(10.0);
        let axis_label_size = self.axis_label_size.unwrap_or(12.0);
        let created = self
            .created
            .unwrap_or_else(|| chrono::Local::now().to_rfc3339());

        let s = GlobalPlotSettings {
            version: self.version.unwrap_or_else(|| SETTINGS_VERSION.to_string()),
            description: self.description.unwrap_or_default(),
            created,
            figure_width,
            figure_height,
            dpi: self.dpi.unwrap_or(100),
            aspect_ratio: self.aspect_ratio,
            figure_facecolor: self.figure_facecolor.unwrap_or(Color::WHITE),
            axes_facecolor: self.axes_facecolor.unwrap_or(Color::WHITE),
            tick_label_size,
            x_tick_label_size: self.x_tick_label_size.unwrap_or(tick_label_size),
            y_tick_label_size: self.y_tick_label_size.unwrap_or(tick_label_size),
            tick_label_family: self.tick_label_family.unwrap_or_default(),
            tick_label_weight: self.tick_label_weight.unwrap_or(FontWeight::Normal),
            tick_label_color: self.tick_label_color.unwrap_or(Color::BLACK),
            axis_label_size,
            x_axis_label_size: self.x_axis_label_size.unwrap_or(axis_label_size),
            y_axis_label_size: self.y_axis_label_size.unwrap_or(axis_label_size),
            axis_label_family: self.axis_label_family.unwrap_or_default(),
            axis_label_weight: self.axis_label_weight.unwrap_or(FontWeight::Normal),
            axis_label_color: self.axis_label_color.unwrap_or(Color::BLACK),
            axis_label_style: self.axis_label_style.unwrap_or(FontSlant::Normal),
            title_size: self.title_size.unwrap_or(14.0),
            title_family: self.title_family.unwrap_or_default(),
            title_weight: self.title_weight.unwrap_or(FontWeight::Normal),
            title_style: self.title_style.unwrap_or(FontSlant::Normal),
            title_color: self.title_color.unwrap_or(Color::BLACK),
            title_pad: self.title_pad,
            legend_font_size: self.legend_font_size.unwrap_or(10.0),
            legend_font_family: self.legend_font_family.unwrap_or_default(),
            legend_font_weight: self.legend_font_weight.unwrap_or(FontWeight::Normal),
            legend_title_weight: self.legend_title_weight.unwrap_or(FontWeight::Bold),
            title: self.title.unwrap_or_default(),
            x_label: self.x_label.unwrap_or_default(),
            y_label: self.y_label.unwrap_or_default(),
            x_scale: self.x_scale.unwrap_or(Scale::Linear),
            y_scale: self.y_scale.unwrap_or(Scale::Linear),
            x_limits: self.x_limits,
            y_limits: self.y_limits,
            x_ticks: self.x_ticks,
            y_ticks: self.y_ticks,
            x_tick_labels: self.x_tick_labels,
            y_tick_labels: self.y_tick_labels,
            show_minor_ticks: self.show_minor_ticks.unwrap_or(false),
            show_top_spine: self.show_top_spine.unwrap_or(true),
            show_right_spine: self.show_right_spine.unwrap_or(true),
            show_bottom_spine: self.show_bottom_spine.unwrap_or(true),
            show_left_spine: self.show_left_spine.unwrap_or(true),
            show_legend: self.show_legend.unwrap_or(true),
            legend_location: self.legend_location.unwrap_or(LegendLocation::Best),
            legend_frameon: self.legend_frameon.unwrap_or(true),
            legend_framealpha: self.legend_framealpha.unwrap_or(0.8),
            legend_shadow: self.legend_shadow.unwrap_or(false),
            show_grid: self.show_grid.unwrap_or(true),
            grid_which: self.grid_which.unwrap_or(GridWhich::Major),
            grid_axis: self.grid_axis.unwrap_or(GridAxis::Both),
            grid_alpha: self.grid_alpha.unwrap_or(0.3),
            grid_style: self.grid_style.unwrap_or(LineStyle::Dashed),
            grid_linewidth: self.grid_linewidth.unwrap_or(0.5),
            grid_color: self.grid_color.unwrap_or(Color::rgb(0x88, 0x88, 0x88)),
            tight_layout: self.tight_layout.unwrap_or(true),
            subplot_adjust: self.subplot_adjust,
            number_locale: self.number_locale,
        };
        s.validate()?;
        Ok(s)
    }
}

fn positive(field: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(PlotError::setting(field, format!("must be a positive number, got {v}")))
    }
}

fn unit_interval(field: &str, v: f64) -> Result<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(PlotError::setting(field, format!("must be within [0, 1], got {v}")))
    }
}

fn check_limits(field: &str, limits: Option<(f64, f64)>, scale: Scale) -> Result<()> {
    let Some((lo, hi)) = limits else {
        return Ok(());
    };
    if !lo.is_finite() || !hi.is_finite() || lo == hi {
        return Err(PlotError::setting(
            field,
            format!("limits must be finite and distinct, got ({lo}, {hi})"),
        ));
    }
    if scale == Scale::Log && (lo <= 0.0 || hi <= 0.0) {
        return Err(PlotError::setting(
            field,
            format!("log-scaled limits must be positive, got ({lo}, {hi})"),
        ));
    }
    Ok(())
}

fn check_tick_labels(field: &str, ticks: &Option<Vec<f64>>, labels: &Option<Vec<String>>) -> Result<()> {
    match (ticks, labels) {
        (Some(t), Some(l)) if t.len() != l.len() => Err(PlotError::count_mismatch(field, t.len(), l.len())),
        (None, Some(_)) => Err(PlotError::setting(
            field,
            "custom tick labels need explicit tick positions",
        )),
        _ => Ok(()),
    }
}

impl Default for GlobalPlotSettings {
    fn default() -> Self {
        GlobalPlotSettings {
            version: SETTINGS_VERSION.to_string(),
            description: String::new(),
            created: chrono::Local::now().to_rfc3339(),
            figure_width: 8.0,
            figure_height: 6.0,
            dpi: 100,
            aspect_ratio: None,
            figure_facecolor: Color::WHITE,
            axes_facecolor: Color::WHITE,
            tick_label_size: 10.0,
            x_tick_label_size: 10.0,
            y_tick_label_size: 10.0,
            tick_label_family: FontFamily::SansSerif,
            tick_label_weight: FontWeight::Normal,
            tick_label_color: Color::BLACK,
            axis_label_size: 12.0,
            x_axis_label_size: 12.0,
            y_axis_label_size: 12.0,
            axis_label_family: FontFamily::SansSerif,
            axis_label_weight: FontWeight::Normal,
            axis_label_color: Color::BLACK,
            axis_label_style: FontSlant::Normal,
            title_size: 14.0,
            title_family: FontFamily::SansSerif,
            title_weight: FontWeight::Normal,
            title_style: FontSlant::Normal,
            title_color: Color::BLACK,
            title_pad: None,
            legend_font_size: 10.0,
            legend_font_family: FontFamily::SansSerif,
            legend_font_weight: FontWeight::Normal,
            legend_title_weight: FontWeight::Bold,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            x_scale: Scale::Linear,
            y_scale: Scale::Linear,
            x_limits: None,
            y_limits: None,
            x_ticks: None,
            y_ticks: None,
            x_tick_labels: None,
            y_tick_labels: None,
            show_minor_ticks: false,
            show_top_spine: true,
            show_right_spine: true,
            show_bottom_spine: true,
            show_left_spine: true,
            show_legend: true,
            legend_location: LegendLocation::Best,
            legend_frameon: true,
            legend_framealpha: 0.8,
            legend_shadow: false,
            show_grid: true,
            grid_which: GridWhich::Major,
            grid_axis: GridAxis::Both,
            grid_alpha: 0.3,
            grid_style: LineStyle::Dashed,
            grid_linewidth: 0.5,
            grid_color: Color::rgb(0x88, 0x88, 0x88),
            tight_layout: true,
            subplot_adjust: None,
            number_locale: None,
        }
    }
}

impl GlobalPlotSettings {
    pub fn builder() -> PlotSettingsBuilder {
        PlotSettingsBuilder::new()
    }

    /// Back to the raw form; every field is set, so `to_builder().build()`
    /// reproduces `self` and individual fields can be overridden in between.
    pub fn to_builder(&self) -> PlotSettingsBuilder {
        let s = self.clone();
        PlotSettingsBuilder {
            version: Some(s.version),
            description: Some(s.description),
            created: Some(s.created),
            figure_width: Some(s.figure_width),
            // Height is derived again from the ratio when one is set.
            figure_height: Some(s.figure_height),
            dpi: Some(s.dpi),
            aspect_ratio: s.aspect_ratio,
            figure_facecolor: Some(s.figure_facecolor),
            axes_facecolor: Some(s.axes_facecolor),
            tick_label_size: Some(s.tick_label_size),
            x_tick_label_size: Some(s.x_tick_label_size),
            y_tick_label_size: Some(s.y_tick_label_size),
            tick_label_family: Some(s.tick_label_family),
            tick_label_weight: Some(s.tick_label_weight),
            tick_label_color: Some(s.tick_label_color),
            axis_label_size: Some(s.axis_label_size),
            x_axis_label_size: Some(s.x_axis_label_size),
            y_axis_label_size: Some(s.y_axis_label_size),
            axis_label_family: Some(s.axis_label_family),
            axis_label_weight: Some(s.axis_label_weight),
            axis_label_color: Some(s.axis_label_color),
            axis_label_style: Some(s.axis_label_style),
            title_size: Some(s.title_size),
            title_family: Some(s.title_family),
            title_weight: Some(s.title_weight),
            title_style: Some(s.title_style),
            title_color: Some(s.title_color),
            title_pad: s.title_pad,
            legend_font_size: Some(s.legend_font_size),
            legend_font_family: Some(s.legend_font_family),
            legend_font_weight: Some(s.legend_font_weight),
            legend_title_weight: Some(s.legend_title_weight),
            title: Some(s.title),
            x_label: Some(s.x_label),
            y_label: Some(s.y_label),
            x_scale: Some(s.x_scale),
            y_scale: Some(s.y_scale),
            x_limits: s.x_limits,
            y_limits: s.y_limits,
            x_ticks: s.x_ticks,
            y_ticks: s.y_ticks,
            x_tick_labels: s.x_tick_labels,
            y_tick_labels: s.y_tick_labels,
            show_minor_ticks: Some(s.show_minor_ticks),
            show_top_spine: Some(s.show_top_spine),
            show_right_spine: Some(s.show_right_spine),
            show_bottom_spine: Some(s.show_bottom_spine),
            show_left_spine: Some(s.show_left_spine),
            show_legend: Some(s.show_legend),
            legend_location: Some(s.legend_location),
            legend_frameon: Some(s.legend_frameon),
            legend_framealpha: Some(s.legend_framealpha),
            legend_shadow: Some(s.legend_shadow),
            show_grid: Some(s.show_grid),
            grid_which: Some(s.grid_which),
            grid_axis: Some(s.grid_axis),
            grid_alpha: Some(s.grid_alpha),
            grid_style: Some(s.grid_style),
            grid_linewidth: Some(s.grid_linewidth),
            grid_color: Some(s.grid_color),
            tight_layout: Some(s.tight_layout),
            subplot_adjust: s.subplot_adjust,
            number_locale: s.number_locale,
        }
    }

    /// Copy-then-override: `settings.with(|b| b.title("Run 2"))`.
    pub fn with(&self, f: impl FnOnce(PlotSettingsBuilder) -> PlotSettingsBuilder) -> Result<Self> {
        f(self.to_builder()).build()
    }

    pub fn validate(&self) -> Result<()> {
        positive("figure_width", self.figure_width)?;
        positive("figure_height", self.figure_height)?;
        if self.dpi == 0 {
            return Err(PlotError::setting("dpi", "must be positive"));
        }
        for (field, v) in [
            ("tick_label_size", self.tick_label_size),
            ("x_tick_label_size", self.x_tick_label_size),
            ("y_tick_label_size", self.y_tick_label_size),
            ("axis_label_size", self.axis_label_size),
            ("x_axis_label_size", self.x_axis_label_size),
            ("y_axis_label_size", self.y_axis_label_size),
            ("title_size", self.title_size),
            ("legend_font_size", self.legend_font_size),
        ] {
            positive(field, v)?;
        }
        if self.grid_linewidth < 0.0 || !self.grid_linewidth.is_finite() {
            return Err(PlotError::setting("grid_linewidth", "must be non-negative"));
        }
        unit_interval("grid_alpha", self.grid_alpha)?;
        unit_interval("legend_framealpha", self.legend_framealpha)?;
        check_limits("x_limits", self.x_limits, self.x_scale)?;
        check_limits("y_limits", self.y_limits, self.y_scale)?;
        check_tick_labels("x_tick_labels", &self.x_ticks, &self.x_tick_labels)?;
        check_tick_labels("y_tick_labels", &self.y_ticks, &self.y_tick_labels)?;
        if let Some(adj) = &self.subplot_adjust {
            for (field, v) in [
                ("subplot_adjust.left", adj.left),
                ("subplot_adjust.right", adj.right),
                ("subplot_adjust.top", adj.top),
                ("subplot_adjust.bottom", adj.bottom),
            ] {
                if let Some(v) = v {
                    unit_interval(field, v)?;
                }
            }
            if let (Some(l), Some(r)) = (adj.left, adj.right)
                && l >= r
            {
                return Err(PlotError::setting("subplot_adjust", "left must be < right"));
            }
            if let (Some(b), Some(t)) = (adj.bottom, adj.top)
                && b >= t
            {
                return Err(PlotError::setting("subplot_adjust", "bottom must be < top"));
            }
        }
        Ok(())
    }

    /// Figure size in pixels at the settings' own dpi.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.figure_width * self.dpi as f64).round() as u32,
            (self.figure_height * self.dpi as f64).round() as u32,
        )
    }

    // ------------------------ Serialisation ------------------------

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Parse YAML; unknown keys are ignored and missing keys take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return PlotSettingsBuilder::new().build();
        }
        let raw: PlotSettingsBuilder = serde_yaml_ng::from_str(text)?;
        raw.build()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: PlotSettingsBuilder = serde_json::from_str(text)?;
        raw.build()
    }

    pub fn save_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_creating_dirs(path.as_ref(), &self.to_yaml_string()?)
    }

    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_creating_dirs(path.as_ref(), &self.to_json_string()?)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

fn write_creating_dirs(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_axis_sizes_fall_back_to_shared() {
        let s = PlotSettingsBuilder::new()
            .tick_label_size(9.0)
            .y_tick_label_size(13.0)
            .axis_label_size(15.0)
            .build()
            .unwrap();
        assert_eq!(s.x_tick_label_size, 9.0);
        assert_eq!(s.y_tick_label_size, 13.0);
        assert_eq!(s.x_axis_label_size, 15.0);
        assert_eq!(s.y_axis_label_size, 15.0);
    }

    #[test]
    fn aspect_ratio_overrides_height() {
        let s = PlotSettingsBuilder::new()
            .figure_width(10.0)
            .figure_height(99.0)
            .aspect_ratio(2.0)
            .build()
            .unwrap();
        assert_eq!(s.figure_height, 5.0);
    }

    #[test]
    fn defaults_match_builder_defaults() {
        let built = PlotSettingsBuilder::new().created("t").build().unwrap();
        let mut dflt = GlobalPlotSettings::default();
        dflt.created = "t".into();
        assert_eq!(built, dflt);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(PlotSettingsBuilder::new().figure_width(0.0).build().is_err());
        assert!(PlotSettingsBuilder::new().grid_alpha(1.5).build().is_err());
        assert!(PlotSettingsBuilder::new().x_limits((1.0, 1.0)).build().is_err());
        assert!(
            PlotSettingsBuilder::new()
                .y_scale(Scale::Log)
                .y_limits((0.0, 10.0))
                .build()
                .is_err()
        );
        assert!(
            PlotSettingsBuilder::new()
                .x_ticks(vec![1.0, 2.0])
                .x_tick_labels(vec!["a".to_string()])
                .build()
                .is_err()
        );
    }

    #[test]
    fn inverted_limits_are_kept() {
        let s = PlotSettingsBuilder::new().x_limits((10.0, 0.0)).build().unwrap();
        assert_eq!(s.x_limits, Some((10.0, 0.0)));
        assert!(PlotSettingsBuilder::new().x_limits((3.0, 3.0)).build().is_err());
    }

    #[test]
    fn json_keeps_limits_bit_exact() {
        let s = PlotSettingsBuilder::new()
            .y_limits((0.0, 52.56057307092544))
            .x_limits((-1.0e-7, 0.30000000000000004))
            .build()
            .unwrap();
        let back = GlobalPlotSettings::from_json_str(&s.to_json_string().unwrap()).unwrap();
        assert_eq!(back.y_limits, Some((0.0, 52.56057307092544)));
        assert_eq!(back, s);
    }

    #[test]
    fn yaml_ignores_unknown_and_fills_missing() {
        let s = GlobalPlotSettings::from_yaml_str(
            "title: Hello\nfuture_option: 3\ngrid_style: ':'\nlegend_location: lower left\n",
        )
        .unwrap();
        assert_eq!(s.title, "Hello");
        assert_eq!(s.grid_style, LineStyle::Dotted);
        assert_eq!(s.legend_location, LegendLocation::LowerLeft);
        assert_eq!(s.dpi, 100);
        assert_eq!(s.x_tick_label_size, 10.0);
    }

    #[test]
    fn with_overrides_on_a_copy() {
        let base = GlobalPlotSettings::default();
        let changed = base.with(|b| b.title("Run 2").show_grid(false)).unwrap();
        assert_eq!(changed.title, "Run 2");
        assert!(base.show_grid);
        assert_eq!(changed.created, base.created);
    }
}
