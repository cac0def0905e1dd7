//! Line and scatter plots on a grid of axes.
//!
//! A plain plot is a 1×1 grid; series are grouped per subplot.

use crate::error::{PlotError, Result};
use crate::figure::{AxesGrid, Figure};
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;

use super::subplots::share_axes;

/// Series to draw, grouped by subplot.
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesGroups {
    /// One series on one axes.
    Single(SeriesStyle),
    /// Several series sharing one axes.
    Flat(Vec<SeriesStyle>),
    /// One group per subplot, in row-major order.
    Nested(Vec<Vec<SeriesStyle>>),
}

impl SeriesGroups {
    fn into_groups(self) -> Result<Vec<Vec<SeriesStyle>>> {
        let groups = match self {
            SeriesGroups::Single(s) => vec![vec![s]],
            SeriesGroups::Flat(v) => vec![v],
            SeriesGroups::Nested(v) => v,
        };
        if groups.is_empty() || groups.iter().all(Vec::is_empty) {
            return Err(PlotError::Empty("series list cannot be empty".into()));
        }
        Ok(groups)
    }
}

impl From<SeriesStyle> for SeriesGroups {
    fn from(s: SeriesStyle) -> Self {
        SeriesGroups::Single(s)
    }
}

impl From<Vec<SeriesStyle>> for SeriesGroups {
    fn from(v: Vec<SeriesStyle>) -> Self {
        SeriesGroups::Flat(v)
    }
}

impl From<Vec<Vec<SeriesStyle>>> for SeriesGroups {
    fn from(v: Vec<Vec<SeriesStyle>>) -> Self {
        SeriesGroups::Nested(v)
    }
}

/// Grid shape and sharing for [`line_plot`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    pub rows: usize,
    pub cols: usize,
    pub sharex: bool,
    pub sharey: bool,
    /// Per-subplot titles; missing entries keep the settings' title.
    pub subplot_titles: Vec<String>,
}

impl Default for LineLayout {
    fn default() -> Self {
        LineLayout {
            rows: 1,
            cols: 1,
            sharex: false,
            sharey: false,
            subplot_titles: Vec::new(),
        }
    }
}

impl LineLayout {
    pub fn grid(rows: usize, cols: usize) -> Self {
        LineLayout {
            rows,
            cols,
            ..Default::default()
        }
    }

    pub fn shared(mut self, sharex: bool, sharey: bool) -> Self {
        self.sharex = sharex;
        self.sharey = sharey;
        self
    }

    pub fn titles<S: Into<String>>(mut self, titles: impl IntoIterator<Item = S>) -> Self {
        self.subplot_titles = titles.into_iter().map(Into::into).collect();
        self
    }
}

/// Draw each group of series on its own subplot.
///
/// Fails when the number of groups differs from `rows × cols`, or when any
/// series would draw neither a line nor markers.
pub fn line_plot(
    groups: impl Into<SeriesGroups>,
    settings: &GlobalPlotSettings,
    layout: &LineLayout,
) -> Result<(Figure, AxesGrid)> {
    let groups = groups.into().into_groups()?;
    if layout.rows == 0 || layout.cols == 0 {
        return Err(PlotError::setting("subplot_layout", "rows and cols must be at least 1"));
    }
    let n_subplots = layout.rows * layout.cols;
    if groups.len() != n_subplots {
        return Err(PlotError::count_mismatch(
            &format!("series groups for a {}x{} layout", layout.rows, layout.cols),
            n_subplots,
            groups.len(),
        ));
    }
    for s in groups.iter().flatten() {
        s.ensure_drawable()?;
    }

    let (mut fig, grid) = Figure::grid(settings, layout.rows, layout.cols);
    share_axes(&mut fig, &grid, layout.sharex, layout.sharey);
    for (idx, (id, group)) in grid.iter().zip(&groups).enumerate() {
        let ax = &mut fig[id];
        for s in group {
            ax.plot(s)?;
        }
        if let Some(title) = layout.subplot_titles.get(idx) {
            ax.set_title(title.clone());
        }
    }
    log::debug!(
        "line plot: {} series on {}x{} axes",
        groups.iter().map(Vec::len).sum::<usize>(),
        layout.rows,
        layout.cols
    );
    Ok((fig, grid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{LineStyle, Marker};

    fn series(label: &str) -> SeriesStyle {
        SeriesStyle::builder([1.0, 4.0, 9.0]).label(label).build().unwrap()
    }

    #[test]
    fn flat_list_shares_one_axes() {
        let (fig, grid) = line_plot(vec![series("a"), series("b")], &GlobalPlotSettings::default(), &LineLayout::default()).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(fig[grid.first()].legend_entries().len(), 2);
    }

    #[test]
    fn group_count_must_match_layout() {
        let groups = vec![vec![series("a")], vec![series("b")], vec![series("c")]];
        let err = line_plot(groups, &GlobalPlotSettings::default(), &LineLayout::grid(2, 2)).unwrap_err();
        assert!(matches!(err, PlotError::CountMismatch { expected: 4, got: 3, .. }));
    }

    #[test]
    fn invisible_series_is_rejected() {
        let s = SeriesStyle::builder([1.0, 2.0])
            .label("ghost")
            .line_style(LineStyle::None)
            .marker(Marker::None)
            .build()
            .unwrap();
        let err = line_plot(s, &GlobalPlotSettings::default(), &LineLayout::default()).unwrap_err();
        assert!(matches!(err, PlotError::InvalidSeries { ref label } if label == "ghost"));
    }

    #[test]
    fn subplot_titles_override_per_panel() {
        let groups = vec![vec![series("a")], vec![series("b")]];
        let layout = LineLayout::grid(1, 2).titles(["left", "right"]).shared(false, true);
        let (fig, grid) = line_plot(groups, &GlobalPlotSettings::default(), &layout).unwrap();
        assert_eq!(fig[grid.get(0, 1).unwrap()].settings.title, "right");
        assert!(fig.sharey);
        assert!(!fig[grid.get(0, 1).unwrap()].show_y_ticklabels);
    }

    #[test]
    fn empty_input_fails() {
        let err = line_plot(Vec::<SeriesStyle>::new(), &GlobalPlotSettings::default(), &LineLayout::default()).unwrap_err();
        assert!(matches!(err, PlotError::Empty(_)));
    }
}
