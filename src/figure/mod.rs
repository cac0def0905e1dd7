//! The canvas model returned by every rendering function.
//!
//! A [`Figure`] owns a grid of [`Axes`]; callers address them through
//! [`AxesId`] handles and may keep drawing on them before exporting.

pub mod artist;
pub mod axes;

use std::ops::{Index, IndexMut};

use crate::color::Color;
use crate::settings::{GlobalPlotSettings, SubplotAdjust};

pub use artist::{
    Artist, Coords, FontSpec, HAlign, LegendEntry, LegendHandle, MarkerStyle, Patch, Quad3,
    Stroke, TextArtist, VAlign,
};
pub use axes::{Axes, AxesKind, ColorBar, View3D};

/// Handle to one axes of a figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesId(pub(crate) usize);

impl AxesId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The axes of a grid layout in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxesGrid {
    pub rows: usize,
    pub cols: usize,
    ids: Vec<AxesId>,
}

impl AxesGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<AxesId> {
        if row < self.rows && col < self.cols {
            self.ids.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    pub fn first(&self) -> AxesId {
        self.ids[0]
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AxesId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[AxesId] {
        &self.ids
    }
}

/// Figure-level text such as a suptitle.
#[derive(Clone, Debug, PartialEq)]
pub struct FigureText {
    pub text: String,
    pub font: FontSpec,
}

/// Grid geometry: relative row/column sizes and spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub width_ratios: Vec<f64>,
    pub height_ratios: Vec<f64>,
    /// Gaps between panels as fractions of the average panel size.
    pub hspace: Option<f64>,
    pub wspace: Option<f64>,
}

impl GridLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        GridLayout {
            rows,
            cols,
            width_ratios: vec![1.0; cols],
            height_ratios: vec![1.0; rows],
            hspace: None,
            wspace: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
    pub dpi: u32,
    pub facecolor: Color,
    pub suptitle: Option<FigureText>,
    pub layout: GridLayout,
    pub sharex: bool,
    pub sharey: bool,
    pub tight_layout: bool,
    pub subplot_adjust: Option<SubplotAdjust>,
    axes: Vec<Axes>,
}

impl Figure {
    /// One axes filling the figure.
    pub fn new(settings: &GlobalPlotSettings) -> (Figure, AxesId) {
        let (fig, grid) = Figure::grid(settings, 1, 1);
        (fig, grid.first())
    }

    /// `rows × cols` axes, each with its own copy of `settings`.
    pub fn grid(settings: &GlobalPlotSettings, rows: usize, cols: usize) -> (Figure, AxesGrid) {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let axes: Vec<Axes> = (0..rows * cols).map(|_| Axes::new(settings)).collect();
        let ids = (0..axes.len()).map(AxesId).collect();
        let mut layout = GridLayout::new(rows, cols);
        if let Some(adj) = &settings.subplot_adjust {
            layout.hspace = adj.hspace;
            layout.wspace = adj.wspace;
        }
        let fig = Figure {
            width: settings.figure_width,
            height: settings.figure_height,
            dpi: settings.dpi,
            facecolor: settings.figure_facecolor,
            suptitle: None,
            layout,
            sharex: false,
            sharey: false,
            tight_layout: settings.tight_layout,
            subplot_adjust: settings.subplot_adjust.clone(),
            axes,
        };
        (fig, AxesGrid { rows, cols, ids })
    }

    pub fn axes(&self, id: AxesId) -> &Axes {
        &self.axes[id.0]
    }

    pub fn axes_mut(&mut self, id: AxesId) -> &mut Axes {
        &mut self.axes[id.0]
    }

    pub fn axes_ids(&self) -> impl Iterator<Item = AxesId> + '_ {
        (0..self.axes.len()).map(AxesId)
    }

    pub fn all_axes(&self) -> &[Axes] {
        &self.axes
    }

    /// `(row, col)` of an axes within the grid.
    pub fn position(&self, id: AxesId) -> (usize, usize) {
        (id.0 / self.layout.cols, id.0 % self.layout.cols)
    }

    pub fn set_suptitle(&mut self, text: impl Into<String>, font: FontSpec) {
        self.suptitle = Some(FigureText {
            text: text.into(),
            font,
        });
    }

    /// Canvas size in pixels at `dpi`.
    pub fn pixel_size(&self, dpi: u32) -> (u32, u32) {
        (
            (self.width * dpi as f64).round().max(1.0) as u32,
            (self.height * dpi as f64).round().max(1.0) as u32,
        )
    }

    /// View limits after axis sharing: shared axes use the union of their limits.
    pub fn resolved_limits(&self, id: AxesId) -> ((f64, f64), (f64, f64)) {
        let own = self.axes(id).view_limits();
        if !(self.sharex || self.sharey) || self.axes[id.0].is_3d() {
            return own;
        }
        let union = |a: (f64, f64), b: (f64, f64)| {
            let (a_lo, a_hi) = (a.0.min(a.1), a.0.max(a.1));
            let (b_lo, b_hi) = (b.0.min(b.1), b.0.max(b.1));
            (a_lo.min(b_lo), a_hi.max(b_hi))
        };
        let mut x = own.0;
        let mut y = own.1;
        for (i, other) in self.axes.iter().enumerate() {
            if i == id.0 || other.is_3d() {
                continue;
            }
            let lim = other.view_limits();
            if self.sharex && self.axes[id.0].settings.x_limits.is_none() {
                x = union(x, lim.0);
            }
            if self.sharey && self.axes[id.0].settings.y_limits.is_none() {
                y = union(y, lim.1);
            }
        }
        if own.1.0 > own.1.1 {
            y = (y.1, y.0);
        }
        (x, y)
    }
}

impl Index<AxesId> for Figure {
    type Output = Axes;

    fn index(&self, id: AxesId) -> &Axes {
        self.axes(id)
    }
}

impl IndexMut<AxesId> for Figure {
    fn index_mut(&mut self, id: AxesId) -> &mut Axes {
        self.axes_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let (fig, grid) = Figure::grid(&GlobalPlotSettings::default(), 2, 3);
        assert_eq!(grid.len(), 6);
        let id = grid.get(1, 2).unwrap();
        assert_eq!(fig.position(id), (1, 2));
        assert!(grid.get(2, 0).is_none());
    }

    #[test]
    fn shared_limits_are_the_union() {
        let (mut fig, grid) = Figure::grid(&GlobalPlotSettings::default(), 1, 2);
        fig.sharey = true;
        fig[grid.first()].set_ylim(0.0, 1.0);
        let right = grid.get(0, 1).unwrap();
        fig[right].set_ylim(-5.0, 0.5);
        // explicit limits on the right stay, but the left only has explicit too
        assert_eq!(fig.resolved_limits(right).1, (-5.0, 0.5));
        fig[right].settings.y_limits = None;
        let y = fig.resolved_limits(right).1;
        assert_eq!(y.0, 0.0);
        assert_eq!(y.1, 1.0);
    }
}
