use std::path::Path;

use approx::assert_relative_eq;
use figspec::figure::Artist;
use figspec::{
    AreaMode, AreaOptions, BarMode, BarOptions, BoxData, BoxOptions, Color, ContourOptions, Figure,
    GlobalPlotSettings, Grid2, HeatmapOptions, HistogramOptions, PieOptions, PlotError, SaveOptions, SeriesStyle,
    SurfaceKind, SurfaceOptions, area_plot, bar_plot, box_plot, contour_from_fn, correlation_heatmap, heatmap,
    histogram, pie_chart, surface_from_fn,
};
use proptest::prelude::*;

fn series(y: &[f64]) -> SeriesStyle {
    SeriesStyle::builder(y.iter().copied()).build().unwrap()
}

/// Highest polygon vertex at each x position, across every polygon on the figure.
fn tops(fig: &Figure, xs: &[f64]) -> Vec<f64> {
    let polys: Vec<&Vec<(f64, f64)>> = fig.all_axes()[0]
        .artists()
        .into_iter()
        .filter_map(|l| match &l.artist {
            Artist::Polygon { points, .. } => Some(points),
            _ => None,
        })
        .collect();
    xs.iter()
        .map(|x| {
            polys
                .iter()
                .flat_map(|p| p.iter())
                .filter(|(px, _)| (px - x).abs() < 0.41)
                .map(|(_, y)| *y)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

fn assert_exports(fig: &Figure, name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let opts = SaveOptions::default().dpi(72);
    for ext in ["svg", "png"] {
        let path = dir.path().join(format!("{name}.{ext}"));
        fig.save(&path, &opts).unwrap();
        assert!(Path::new(&path).exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "{name}.{ext} is empty");
    }
}

proptest! {
    #[test]
    fn stacked_bar_tops_are_the_column_sums(
        pairs in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 1..8),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let opts = BarOptions { mode: BarMode::Stacked, ..Default::default() };
        let (fig, _) = bar_plot(&[series(&a), series(&b)], &GlobalPlotSettings::default(), &opts).unwrap();
        let xs: Vec<f64> = (0..a.len()).map(|i| i as f64).collect();
        for (top, (ya, yb)) in tops(&fig, &xs).into_iter().zip(pairs) {
            prop_assert!((top - (ya + yb)).abs() < 1e-9);
        }
    }

    #[test]
    fn stacked_area_tops_are_the_column_sums(
        pairs in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0), 2..8),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let opts = AreaOptions { mode: AreaMode::Stacked, ..Default::default() };
        let (fig, _) = area_plot(&[series(&a), series(&b)], &GlobalPlotSettings::default(), &opts).unwrap();
        let xs: Vec<f64> = (0..a.len()).map(|i| i as f64).collect();
        for (top, (ya, yb)) in tops(&fig, &xs).into_iter().zip(pairs) {
            prop_assert!((top - (ya + yb)).abs() < 1e-9);
        }
    }
}

#[test]
fn per_slice_lists_must_match_the_slice_count() {
    let s = GlobalPlotSettings::default();
    let opts = PieOptions {
        explode: Some(vec![0.1, 0.0]),
        ..Default::default()
    };
    let err = pie_chart(&["a", "b", "c"], &[1.0, 2.0, 3.0], &s, &opts).unwrap_err();
    assert!(matches!(err, PlotError::CountMismatch { expected: 3, got: 2, .. }));

    let err = pie_chart(&["a", "b"], &[1.0, 2.0, 3.0], &s, &PieOptions::default()).unwrap_err();
    assert!(matches!(err, PlotError::CountMismatch { expected: 3, got: 2, .. }));
}

#[test]
fn box_colors_must_match_the_box_count() {
    let data = BoxData::Simple(vec![vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 4.0]]);
    let opts = BoxOptions {
        colors: Some(vec![Color::BLACK]),
        ..Default::default()
    };
    let err = box_plot(&data, &["a", "b"], &GlobalPlotSettings::default(), &opts).unwrap_err();
    assert!(matches!(err, PlotError::CountMismatch { expected: 2, got: 1, .. }));
}

#[test]
fn density_histogram_integrates_to_one() {
    let sample: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64 / 10.0).collect();
    let opts = HistogramOptions {
        density: true,
        ..HistogramOptions::default().bins(12)
    };
    let (fig, _) = histogram(&[series(&sample)], &GlobalPlotSettings::default(), &opts).unwrap();
    let area: f64 = fig.all_axes()[0]
        .artists()
        .into_iter()
        .filter_map(|l| match &l.artist {
            Artist::Polygon { points, .. } => {
                let (x0, x1) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), p| (a.min(p.0), b.max(p.0)));
                let (y0, y1) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), p| (a.min(p.1), b.max(p.1)));
                Some((x1 - x0) * (y1 - y0))
            }
            _ => None,
        })
        .sum();
    assert_relative_eq!(area, 1.0, epsilon = 1e-9);
}

#[test]
fn every_chart_family_exports() {
    let s = GlobalPlotSettings::builder()
        .title("smoke")
        .x_label("x")
        .y_label("y")
        .show_legend(true)
        .build()
        .unwrap();

    let a = SeriesStyle::builder([3.0, 1.0, 4.0, 1.5]).label("a").color("blue").build().unwrap();
    let b = SeriesStyle::builder([1.0, 2.0, 0.5, 2.5])
        .label("b")
        .color("#CC3300")
        .hatch("//")
        .build()
        .unwrap();

    let (fig, _) = bar_plot(&[a.clone(), b.clone()], &s, &BarOptions::grouped().categories(["q1", "q2", "q3", "q4"])).unwrap();
    assert_exports(&fig, "bar");

    let (fig, _) = area_plot(&[a.clone(), b.clone()], &s, &AreaOptions::default()).unwrap();
    assert_exports(&fig, "area");

    let (fig, _) = histogram(&[a.clone(), b.clone()], &s, &HistogramOptions::default().bins(4)).unwrap();
    assert_exports(&fig, "histogram");

    let data = BoxData::Simple(vec![vec![1.0, 2.0, 3.0, 4.0, 9.0], vec![2.0, 2.5, 3.0, 3.5]]);
    let (fig, _) = box_plot(&data, &["a", "b"], &s, &BoxOptions::default()).unwrap();
    assert_exports(&fig, "box");

    let donut = PieOptions {
        donut: true,
        ..Default::default()
    };
    let (fig, _) = pie_chart(&["wind", "solar", "hydro"], &[40.0, 25.0, 35.0], &s, &donut).unwrap();
    assert_exports(&fig, "pie");

    let z = Grid2::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let annotated = HeatmapOptions {
        annotate: true,
        ..Default::default()
    };
    let (fig, _) = heatmap(&z, &s, &annotated).unwrap();
    assert_exports(&fig, "heatmap");

    let cols = vec![vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.1, 5.9, 8.2], vec![4.0, 3.0, 2.5, 1.0]];
    let (fig, _) = correlation_heatmap(&cols, None, &s, None).unwrap();
    assert_exports(&fig, "correlation");

    let lines = ContourOptions {
        lines: true,
        labels: true,
        ..Default::default()
    };
    let (fig, _) = contour_from_fn(|x, y| (x * x + y * y).sqrt(), (-2.0, 2.0), (-2.0, 2.0), 30, &s, &lines).unwrap();
    assert_exports(&fig, "contour");

    let both = SurfaceOptions {
        kind: SurfaceKind::Both,
        contour_projection: true,
        ..Default::default()
    };
    let (fig, _) = surface_from_fn(|x, y| x.sin() * y.cos(), (-3.0, 3.0), (-3.0, 3.0), 20, &s, &both).unwrap();
    assert_exports(&fig, "surface");
}
