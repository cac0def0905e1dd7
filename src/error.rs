//! Error type shared by every module of the library.

use thiserror::Error;

/// Everything that can go wrong while building settings, styling series,
/// laying out a figure or writing it to disk.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("x and y data must have same length. Got x: {x_len}, y: {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("series '{label}' has neither a line nor a marker; set line_style or marker")]
    InvalidSeries { label: String },

    #[error("{0}")]
    Empty(String),

    /// A per-item list (explode, hatches, labels, colors, …) disagrees with the item count.
    #[error("{what} has {got} entries but {expected} were expected")]
    CountMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid value '{value}' for {option}; expected one of: {expected}")]
    InvalidOption {
        option: String,
        value: String,
        expected: String,
    },

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("unknown preset: {name}. Available: {available:?}")]
    UnknownPreset {
        name: String,
        available: Vec<String>,
    },

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: String, reason: String },

    #[error("unsupported export format '{0}' (use .png or .svg)")]
    UnsupportedFormat(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Png(#[from] png::EncodingError),
}

impl PlotError {
    pub(crate) fn invalid_option(option: &str, value: &str, expected: &[&str]) -> Self {
        PlotError::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }

    pub(crate) fn count_mismatch(what: &str, expected: usize, got: usize) -> Self {
        PlotError::CountMismatch {
            what: what.to_string(),
            expected,
            got,
        }
    }

    pub(crate) fn setting(field: &str, reason: impl Into<String>) -> Self {
        PlotError::InvalidSetting {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Adapter for plotters' drawing errors, which only implement `Debug` usefully.
    pub(crate) fn render<E: std::fmt::Debug>(e: E) -> Self {
        PlotError::Render(format!("{e:?}"))
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
