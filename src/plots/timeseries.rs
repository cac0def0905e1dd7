//! Time-series tables loaded from CSV, plotted against the row index.
//!
//! The x axis is the time-step number (0, 1, 2, …); the date column is only
//! used to find ISO week boundaries.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::color::Color;
use crate::error::{PlotError, Result};
use crate::figure::axes::plain_patch;
use crate::figure::{Artist, Axes, AxesId, Coords, Figure, FontSpec, HAlign, Stroke, TextArtist, VAlign};
use crate::series::SeriesStyle;
use crate::settings::GlobalPlotSettings;
use crate::style::{FontWeight, LineStyle};

use super::line::{LineLayout, line_plot};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse the common CSV timestamp layouts; `None` when nothing matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Numeric columns of a CSV file plus its optional date column.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesTable {
    date_column: String,
    /// One entry per row when the date column exists; unparsable cells are `None`.
    dates: Option<Vec<Option<NaiveDateTime>>>,
    names: Vec<String>,
    /// Column-major values; non-numeric cells are NaN.
    values: Vec<Vec<f64>>,
    rows: usize,
}

impl TimeSeriesTable {
    pub fn from_csv(path: impl AsRef<Path>, date_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, date_column)?;
        log::info!(
            "loaded {} rows x {} columns from {}",
            table.rows,
            table.names.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, date_column: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let date_idx = headers.iter().position(|h| h == date_column);
        let names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != date_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut values = vec![Vec::new(); names.len()];
        let mut dates = date_idx.map(|_| Vec::new());
        let mut rows = 0;
        for record in rdr.records() {
            let record = record?;
            let mut col = 0;
            for (i, cell) in record.iter().enumerate() {
                if Some(i) == date_idx {
                    if let Some(d) = dates.as_mut() {
                        d.push(parse_timestamp(cell));
                    }
                } else if col < values.len() {
                    values[col].push(cell.parse::<f64>().unwrap_or(f64::NAN));
                    col += 1;
                }
            }
            rows += 1;
        }
        if let Some(d) = &dates {
            let unparsed = d.iter().filter(|v| v.is_none()).count();
            if unparsed > 0 {
                log::warn!("{unparsed} of {rows} values in '{date_column}' are not dates");
            }
        }
        Ok(TimeSeriesTable {
            date_column: date_column.to_string(),
            dates,
            names,
            values,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Numeric column names in file order, without the date column.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn dates(&self) -> Option<&[Option<NaiveDateTime>]> {
        self.dates.as_deref()
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| {
                let available: Vec<&str> = self.names.iter().map(String::as_str).collect();
                PlotError::invalid_option("column", name, &available)
            })
    }

    /// Time-step indices `0..len`.
    pub fn steps(&self) -> Vec<f64> {
        (0..self.rows).map(|i| i as f64).collect()
    }

    /// One column as-is, or the row-wise sum of several (NaN cells skipped).
    pub fn select_columns(&self, columns: &[&str]) -> Result<Selection> {
        if columns.is_empty() {
            return Err(PlotError::Empty("no columns selected".into()));
        }
        let cols = columns.iter().map(|c| self.column(c)).collect::<Result<Vec<_>>>()?;
        let (y, label) = if let [only] = cols[..] {
            (only.to_vec(), columns[0].to_string())
        } else {
            (Aggregate::Sum.apply(&cols, self.rows), format!("Sum of {} columns", cols.len()))
        };
        Ok(Selection {
            x: self.steps(),
            y,
            label,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Combine `columns` (all numeric columns when `None`) row by row.
    pub fn aggregate_columns(&self, columns: Option<&[&str]>, op: Aggregate) -> Result<Selection> {
        let names: Vec<&str> = match columns {
            Some(c) => c.to_vec(),
            None => self.names.iter().map(String::as_str).collect(),
        };
        if names.is_empty() {
            return Err(PlotError::Empty("no columns to aggregate".into()));
        }
        let cols = names.iter().map(|c| self.column(c)).collect::<Result<Vec<_>>>()?;
        Ok(Selection {
            x: self.steps(),
            y: op.apply(&cols, self.rows),
            label: format!("{} ({} columns)", op.label(), cols.len()),
            columns: names.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Row indices where a new ISO week starts, beginning with row 0.
    ///
    /// Empty when the table has no date column. Rows without a date stay in
    /// the previous row's week.
    pub fn week_starts(&self) -> Vec<(usize, u32)> {
        let Some(dates) = &self.dates else {
            return Vec::new();
        };
        let mut starts = Vec::new();
        let mut current: Option<(i32, u32)> = None;
        for (i, d) in dates.iter().enumerate() {
            let Some(d) = d else { continue };
            let wk = d.iso_week();
            let key = (wk.year(), wk.week());
            if current != Some(key) {
                starts.push((i, key.1));
                current = Some(key);
            }
        }
        starts
    }
}

/// Values chosen from a [`TimeSeriesTable`], ready to plot.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub label: String,
    pub columns: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Mean,
    Max,
    Min,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Sum => "sum",
            Aggregate::Mean => "mean",
            Aggregate::Max => "max",
            Aggregate::Min => "min",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Aggregate::Sum => "Total",
            Aggregate::Mean => "Average",
            Aggregate::Max => "Maximum",
            Aggregate::Min => "Minimum",
        }
    }

    /// Row-wise reduction ignoring NaN; a row with no finite value gives NaN,
    /// except for `Sum`, which gives 0.
    fn apply(&self, cols: &[&[f64]], rows: usize) -> Vec<f64> {
        (0..rows)
            .map(|r| {
                let vals = cols.iter().filter_map(|c| c.get(r).copied()).filter(|v| !v.is_nan());
                match self {
                    Aggregate::Sum => vals.sum(),
                    Aggregate::Mean => {
                        let (sum, n) = vals.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                        if n == 0 { f64::NAN } else { sum / n as f64 }
                    }
                    Aggregate::Max => vals.fold(f64::NAN, f64::max),
                    Aggregate::Min => vals.fold(f64::NAN, f64::min),
                }
            })
            .collect()
    }
}

impl FromStr for Aggregate {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregate::Sum),
            "mean" => Ok(Aggregate::Mean),
            "max" => Ok(Aggregate::Max),
            "min" => Ok(Aggregate::Min),
            _ => Err(PlotError::invalid_option("aggregate", s, &["sum", "mean", "max", "min"])),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shade between `baseline` and the curve.
pub fn fill_under_curve(ax: &mut Axes, x: &[f64], y: &[f64], color: Color, alpha: f64, baseline: f64) {
    let base = vec![baseline; x.len()];
    ax.fill_between(x, &base, y, plain_patch(color, alpha, None), "", None);
}

/// Thin dashed grey lines at the first and last x, below the data.
pub fn add_boundary_lines(ax: &mut Axes, x: &[f64]) {
    let finite = x.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return;
    }
    let stroke = Stroke::solid(Color::rgb(0x88, 0x88, 0x88), 0.75)
        .styled(LineStyle::Dashed)
        .alpha(0.7);
    for value in [lo, hi] {
        ax.add_artist(
            Artist::AxLine {
                value,
                vertical: true,
                stroke: stroke.clone(),
            },
            Some(1.0),
        );
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekSeparatorOptions {
    pub line: Stroke,
    pub label_weeks: bool,
    /// Label the middle of each week instead of its first row.
    pub center_labels: bool,
    /// Also draw a line at the start of the first week.
    pub include_first: bool,
    /// Label height as a fraction of the axes.
    pub label_y: f64,
    pub label_font: FontSpec,
}

impl Default for WeekSeparatorOptions {
    fn default() -> Self {
        WeekSeparatorOptions {
            line: Stroke::solid(Color::BLACK, 2.5).alpha(0.8),
            label_weeks: true,
            center_labels: true,
            include_first: true,
            label_y: 0.1,
            label_font: FontSpec::new(8.0)
                .color(Color::rgb(0x66, 0x66, 0x66))
                .weight(FontWeight::Normal),
        }
    }
}

/// Vertical lines at ISO week boundaries with `W##` labels.
///
/// Returns the number of weeks found; zero when the table has no date column.
pub fn add_week_separators(ax: &mut Axes, table: &TimeSeriesTable, opts: &WeekSeparatorOptions) -> usize {
    let starts = table.week_starts();
    if starts.is_empty() {
        log::debug!("no '{}' dates, skipping week separators", table.date_column());
        return 0;
    }
    let skip = if opts.include_first { 0 } else { 1 };
    for (idx, _) in starts.iter().skip(skip) {
        ax.axvline(*idx as f64, opts.line.clone());
    }
    if opts.label_weeks {
        let last_row = table.len().saturating_sub(1) as f64;
        for (k, (idx, week)) in starts.iter().enumerate() {
            let (x, h) = if opts.center_labels {
                let end = starts.get(k + 1).map_or(last_row, |(next, _)| *next as f64);
                ((*idx as f64 + end) / 2.0, HAlign::Center)
            } else if k >= skip {
                (*idx as f64, HAlign::Left)
            } else {
                continue;
            };
            let text = TextArtist::new(format!("W{week}"), (x, opts.label_y), opts.label_font.clone())
                .coords(Coords::XDataYAxes)
                .align(h, VAlign::Bottom);
            ax.add_artist(Artist::Text(text), None);
        }
    }
    starts.len()
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesOptions {
    pub fill: bool,
    pub fill_alpha: f64,
    pub week_separators: bool,
    pub boundary_lines: bool,
    /// Combine the selected columns instead of summing them.
    pub aggregate: Option<Aggregate>,
    pub color: Color,
    pub line_width: f64,
}

impl Default for TimeSeriesOptions {
    fn default() -> Self {
        TimeSeriesOptions {
            fill: true,
            fill_alpha: 0.2,
            week_separators: false,
            boundary_lines: false,
            aggregate: None,
            color: Color::rgb(0x00, 0x66, 0xCC),
            line_width: 1.5,
        }
    }
}

/// Settings used when the caller brings none.
pub fn default_timeseries_settings() -> Result<GlobalPlotSettings> {
    GlobalPlotSettings::builder()
        .tick_label_size(12.0)
        .axis_label_size(14.0)
        .title_size(16.0)
        .x_label("Time Step")
        .y_label("Value")
        .show_grid(true)
        .grid_alpha(0.3)
        .build()
}

/// Plot selected columns of `table` with the optional fill, boundaries and week markers.
pub fn plot_timeseries(
    table: &TimeSeriesTable,
    columns: &[&str],
    settings: Option<&GlobalPlotSettings>,
    opts: &TimeSeriesOptions,
) -> Result<(Figure, AxesId)> {
    super::check_alpha("fill_alpha", opts.fill_alpha)?;
    let sel = match opts.aggregate {
        Some(op) => table.aggregate_columns(Some(columns), op)?,
        None => table.select_columns(columns)?,
    };
    if sel.y.is_empty() {
        return Err(PlotError::Empty("time series has no rows".into()));
    }
    let defaults;
    let settings = match settings {
        Some(s) => s,
        None => {
            defaults = default_timeseries_settings()?;
            &defaults
        }
    };
    let series = SeriesStyle::builder(sel.y.iter().copied())
        .x(sel.x.iter().copied())
        .label(sel.label.clone())
        .color(opts.color)
        .line_style(LineStyle::Solid)
        .line_width(opts.line_width)
        .build()?;
    let (mut fig, grid) = line_plot(series, settings, &LineLayout::default())?;
    let id = grid.first();
    let ax = &mut fig[id];
    if opts.fill {
        fill_under_curve(ax, &sel.x, &sel.y, opts.color, opts.fill_alpha, 0.0);
    }
    if opts.boundary_lines {
        add_boundary_lines(ax, &sel.x);
    }
    if opts.week_separators {
        add_week_separators(ax, table, &WeekSeparatorOptions::default());
    }
    Ok((fig, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "DATE,wind,solar,note\n\
        2024-01-05 00:00,1.0,0.5,x\n\
        2024-01-06 00:00,2.0,,y\n\
        2024-01-07 00:00,3.0,1.5,z\n\
        2024-01-08 00:00,4.0,2.0,w\n\
        2024-01-09 00:00,5.0,2.5,v\n";

    fn table() -> TimeSeriesTable {
        TimeSeriesTable::from_reader(CSV.as_bytes(), "DATE").unwrap()
    }

    #[test]
    fn date_column_is_kept_apart() {
        let t = table();
        assert_eq!(t.len(), 5);
        assert_eq!(t.column_names(), ["wind", "solar", "note"]);
        assert!(t.dates().unwrap().iter().all(Option::is_some));
        assert!(t.column("note").unwrap()[0].is_nan());
    }

    #[test]
    fn several_columns_are_summed() {
        let sel = table().select_columns(&["wind", "solar"]).unwrap();
        assert_eq!(sel.y, vec![1.5, 2.0, 4.5, 6.0, 7.5]);
        assert_eq!(sel.label, "Sum of 2 columns");
        assert_eq!(sel.x[4], 4.0);
    }

    #[test]
    fn aggregates_skip_missing_cells() {
        let t = table();
        let mean = t.aggregate_columns(Some(&["wind", "solar"]), Aggregate::Mean).unwrap();
        assert_eq!(mean.y[1], 2.0);
        assert_eq!(mean.label, "Average (2 columns)");
        let max = t.aggregate_columns(Some(&["wind", "solar"]), "MAX".parse().unwrap()).unwrap();
        assert_eq!(max.y, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn unknown_column_lists_the_available_ones() {
        let err = table().select_columns(&["hydro"]).unwrap_err();
        assert!(err.to_string().contains("wind"));
    }

    #[test]
    fn weeks_follow_the_iso_calendar() {
        // 2024-01-08 is a Monday
        assert_eq!(table().week_starts(), vec![(0, 1), (3, 2)]);
    }

    #[test]
    fn full_plot_draws_every_extra() {
        let opts = TimeSeriesOptions {
            week_separators: true,
            boundary_lines: true,
            ..Default::default()
        };
        let (fig, id) = plot_timeseries(&table(), &["wind"], None, &opts).unwrap();
        let ax = &fig[id];
        let axlines = ax
            .artists()
            .iter()
            .filter(|l| matches!(l.artist, Artist::AxLine { .. }))
            .count();
        // two boundaries plus two week starts
        assert_eq!(axlines, 4);
        let labels: Vec<&str> = ax
            .artists()
            .iter()
            .filter_map(|l| match &l.artist {
                Artist::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["W1", "W2"]);
        assert_eq!(ax.settings.x_label, "Time Step");
    }

    #[test]
    fn timestamps_in_several_layouts() {
        assert!(parse_timestamp("2024-03-01T12:30:00").is_some());
        assert!(parse_timestamp("01/03/2024").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
