//! figspec
//!
//! Configuration-driven scientific plotting. Pairs with the `figspec` CLI.
//!
//! ### Features
//! - Figure formatting in one value, [`GlobalPlotSettings`], saved and loaded as YAML or JSON
//! - Per-dataset styling bound to the data, [`SeriesStyle`]
//! - Named presets (`publication`, `presentation`, `nature_style`, …)
//! - Line, bar, histogram, area, box, pie, heatmap, contour, 3D surface,
//!   subplot and CSV time-series charts
//! - SVG/PNG export with tight cropping and transparent backgrounds
//!
//! ### Example
//! ```no_run
//! use figspec::{GlobalPlotSettings, LineLayout, SaveOptions, SeriesStyle, line_plot, save_plot};
//!
//! let settings = GlobalPlotSettings::builder()
//!     .title("Demand")
//!     .x_label("hour")
//!     .y_label("MW")
//!     .build()?;
//! let load = SeriesStyle::builder([410.0, 395.0, 430.0, 520.0])
//!     .label("Auckland")
//!     .color("#0066CC")
//!     .build()?;
//! let (fig, _axes) = line_plot(load, &settings, &LineLayout::default())?;
//! save_plot(&fig, "out/demand.png", &SaveOptions::default())?;
//! # Ok::<(), figspec::PlotError>(())
//! ```

pub mod color;
pub mod error;
pub mod export;
pub mod figure;
pub mod plots;
pub mod presets;
pub mod render;
pub mod series;
pub mod settings;
pub mod stats;
pub mod style;

pub use color::{Color, Colormap};
pub use error::{PlotError, Result};
pub use export::{ImageFormat, SaveOptions, render_svg_string, save_plot};
pub use figure::{Axes, AxesGrid, AxesId, Figure};
pub use plots::*;
pub use presets::{preset, preset_names};
pub use series::{PlotType, SeriesStyle, SeriesStyleBuilder, line_scatter_series, line_series, scatter_series};
pub use settings::{GlobalPlotSettings, PlotSettingsBuilder, SubplotAdjust};
pub use style::{
    FontFamily, FontSlant, FontWeight, GridAxis, GridWhich, Hatch, LegendLocation, LineStyle, Marker, Orientation,
    Scale,
};
