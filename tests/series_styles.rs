use figspec::{
    Color, GlobalPlotSettings, LineLayout, LineStyle, Marker, PlotError, PlotType, SeriesStyle, line_plot,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn construction_fails_exactly_when_lengths_differ(
        x in prop::collection::vec(-1e6f64..1e6, 0..40),
        y in prop::collection::vec(-1e6f64..1e6, 0..40),
    ) {
        let res = SeriesStyle::builder(y.clone()).x(x.clone()).build();
        if x.len() == y.len() {
            let s = res.unwrap();
            prop_assert_eq!(s.len(), y.len());
        } else {
            match res {
                Err(PlotError::LengthMismatch { x_len, y_len }) => {
                    prop_assert_eq!(x_len, x.len());
                    prop_assert_eq!(y_len, y.len());
                }
                other => prop_assert!(false, "expected a length mismatch, got {:?}", other),
            }
        }
    }
}

#[test]
fn secondary_colors_follow_the_primary() {
    let s = SeriesStyle::builder([1.0, 2.0]).color("#0066CC").build().unwrap();
    let primary = Color::rgb(0x00, 0x66, 0xCC);
    assert_eq!(s.color, primary);
    assert_eq!(s.marker_facecolor, primary);
    assert_eq!(s.marker_edgecolor, primary);
    assert_eq!(s.fill_color, primary);
    assert_eq!(s.hatch_color, primary);
}

#[test]
fn explicit_secondary_color_is_kept() {
    let s = SeriesStyle::builder([1.0])
        .color("red")
        .marker_edgecolor("black")
        .build()
        .unwrap();
    assert_eq!(s.marker_edgecolor, Color::BLACK);
    assert_eq!(s.marker_facecolor, s.color);
}

#[test]
fn line_plot_of_four_points_renders_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let s = SeriesStyle::builder([1.0, 2.0, 3.0, 4.0])
        .x([0.0, 1.0, 2.0, 3.0])
        .color("#0066CC")
        .build()
        .unwrap();
    let (fig, grid) = line_plot(s, &GlobalPlotSettings::default(), &LineLayout::default()).unwrap();
    assert_eq!(grid.len(), 1);
    let out = fig.save(dir.path().join("line.png"), &Default::default()).unwrap();
    assert!(std::fs::metadata(out).unwrap().len() > 0);
}

#[test]
fn series_without_line_or_marker_is_rejected_by_name() {
    let s = SeriesStyle::builder([1.0, 2.0])
        .label("ghost")
        .line_style(LineStyle::None)
        .marker(Marker::None)
        .build()
        .unwrap();
    assert_eq!(s.plot_type(), PlotType::None);
    let err = line_plot(s, &GlobalPlotSettings::default(), &LineLayout::default()).unwrap_err();
    assert!(matches!(err, PlotError::InvalidSeries { ref label } if label == "ghost"));
    assert!(err.to_string().contains("neither a line nor a marker"));
}

#[test]
fn group_count_must_match_layout() {
    let s = || SeriesStyle::builder([1.0, 2.0]).build().unwrap();
    let err = line_plot(vec![vec![s()], vec![s()], vec![s()]], &GlobalPlotSettings::default(), &LineLayout::grid(2, 2))
        .unwrap_err();
    assert!(matches!(err, PlotError::CountMismatch { expected: 4, got: 3, .. }));
}
