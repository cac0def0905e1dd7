use std::fs;
use std::path::PathBuf;

use figspec::figure::Artist;
use figspec::{Aggregate, PlotError, SaveOptions, TimeSeriesOptions, TimeSeriesTable, plot_timeseries};

/// Two weeks of six-hourly rows starting on a Saturday.
fn write_csv(dir: &tempfile::TempDir) -> PathBuf {
    let mut text = String::from("DATE,wind,solar\n");
    for i in 0..56 {
        let day = 6 + i / 4;
        let hour = (i % 4) * 6;
        text.push_str(&format!("2024-01-{day:02} {hour:02}:00,{},{}\n", 10 + i % 7, i % 4));
    }
    let path = dir.path().join("generation.csv");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn csv_file_loads_with_its_date_column() {
    let dir = tempfile::tempdir().unwrap();
    let table = TimeSeriesTable::from_csv(write_csv(&dir), "DATE").unwrap();
    assert_eq!(table.len(), 56);
    assert_eq!(table.column_names(), ["wind", "solar"]);
    // Saturday, then Monday 8th and Monday 15th
    let weeks: Vec<u32> = table.week_starts().into_iter().map(|(_, w)| w).collect();
    assert_eq!(weeks, [1, 2, 3]);
}

#[test]
fn unknown_column_names_the_available_ones() {
    let dir = tempfile::tempdir().unwrap();
    let table = TimeSeriesTable::from_csv(write_csv(&dir), "DATE").unwrap();
    let err = table.select_columns(&["hydro"]).unwrap_err();
    assert!(matches!(err, PlotError::InvalidOption { .. }));
    assert!(err.to_string().contains("solar"));
}

#[test]
fn summed_columns_plot_with_weeks_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let table = TimeSeriesTable::from_csv(write_csv(&dir), "DATE").unwrap();
    let opts = TimeSeriesOptions {
        week_separators: true,
        boundary_lines: true,
        ..Default::default()
    };
    let (fig, id) = plot_timeseries(&table, &["wind", "solar"], None, &opts).unwrap();
    let ax = &fig[id];
    assert_eq!(ax.legend_entries()[0].label, "Sum of 2 columns");
    let axlines = ax
        .artists()
        .iter()
        .filter(|l| matches!(l.artist, Artist::AxLine { .. }))
        .count();
    // two boundaries plus three week starts
    assert_eq!(axlines, 5);

    let out = fig.save(dir.path().join("out/ts.png"), &SaveOptions::default().dpi(60)).unwrap();
    assert!(fs::metadata(out).unwrap().len() > 0);
}

#[test]
fn aggregate_mean_is_labelled() {
    let dir = tempfile::tempdir().unwrap();
    let table = TimeSeriesTable::from_csv(write_csv(&dir), "DATE").unwrap();
    let opts = TimeSeriesOptions {
        aggregate: Some(Aggregate::Mean),
        fill: false,
        ..Default::default()
    };
    let (fig, id) = plot_timeseries(&table, &["wind", "solar"], None, &opts).unwrap();
    assert_eq!(fig[id].legend_entries()[0].label, "Average (2 columns)");
}
