use std::fs;

use figspec::export::{encode_png, encode_svg};
use figspec::{
    GlobalPlotSettings, LineLayout, PlotError, SaveOptions, SeriesStyle, SubplotOptions, add_subplot_labels, line_plot,
    panel_label_font, render_svg_string, save_plot, subplots,
};

fn demo_figure() -> figspec::Figure {
    let settings = GlobalPlotSettings::builder()
        .title("Export")
        .figure_width(4.0)
        .figure_height(3.0)
        .build()
        .unwrap();
    let s = SeriesStyle::builder([1.0, 4.0, 2.0, 3.0]).label("load").build().unwrap();
    line_plot(s, &settings, &LineLayout::default()).unwrap().0
}

fn png_size(bytes: &[u8]) -> (u32, u32) {
    let dec = png::Decoder::new(bytes);
    let reader = dec.read_info().unwrap();
    let info = reader.info();
    (info.width, info.height)
}

#[test]
fn png_and_svg_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let fig = demo_figure();
    for name in ["plot.png", "plot.svg", "PLOT.SVG"] {
        let path = save_plot(&fig, dir.path().join(name), &SaveOptions::default().dpi(100)).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0, "{name}");
    }
    let png = fs::read(dir.path().join("plot.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let svg = fs::read_to_string(dir.path().join("plot.svg")).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/c/figure.svg");
    save_plot(&demo_figure(), &path, &SaveOptions::default()).unwrap();
    assert!(path.exists());
}

#[test]
fn unsupported_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.pdf");
    let err = save_plot(&demo_figure(), &path, &SaveOptions::default()).unwrap_err();
    assert!(matches!(err, PlotError::UnsupportedFormat(ref ext) if ext == "pdf"));
    assert!(!path.exists());
}

#[test]
fn tight_crop_never_grows_the_canvas() {
    let fig = demo_figure();
    let loose = encode_png(&fig, &SaveOptions::default().dpi(50).tight(false)).unwrap();
    let tight = encode_png(&fig, &SaveOptions::default().dpi(50)).unwrap();
    assert_eq!(png_size(&loose), (200, 150));
    let (w, h) = png_size(&tight);
    assert!(w <= 200 && h <= 150);
}

#[test]
fn dpi_scales_the_pixel_size() {
    let fig = demo_figure();
    let small = encode_png(&fig, &SaveOptions::default().dpi(50).tight(false)).unwrap();
    let large = encode_png(&fig, &SaveOptions::default().dpi(100).tight(false)).unwrap();
    assert_eq!(png_size(&large), (400, 300));
    assert!(large.len() > small.len());
}

#[test]
fn transparent_png_has_clear_corners() {
    let fig = demo_figure();
    let bytes = encode_png(&fig, &SaveOptions::default().dpi(40).tight(false).transparent(true)).unwrap();
    let mut reader = png::Decoder::new(bytes.as_slice()).read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgba);
    // top-left pixel lies outside the axes
    assert_eq!(buf[3], 0);
}

#[test]
fn zero_dpi_is_rejected() {
    let err = encode_svg(&demo_figure(), &SaveOptions::default().dpi(0)).unwrap_err();
    assert!(matches!(err, PlotError::InvalidSetting { .. }));
}

#[test]
fn svg_string_embeds_panel_labels() {
    let (mut fig, grid) = subplots(1, 2, &GlobalPlotSettings::default(), &SubplotOptions::default()).unwrap();
    for id in grid.iter() {
        fig[id].plot(&SeriesStyle::builder([0.0, 1.0]).build().unwrap()).unwrap();
    }
    add_subplot_labels(&mut fig, None, &panel_label_font()).unwrap();
    let svg = render_svg_string(&fig, 72).unwrap();
    assert!(svg.contains("(a)"));
    assert!(svg.contains("(b)"));
}

#[test]
fn oversized_canvas_is_rejected_before_drawing() {
    let err = encode_png(&demo_figure(), &SaveOptions::default().dpi(100_000)).unwrap_err();
    assert!(matches!(err, PlotError::InvalidSetting { ref field, .. } if field == "dpi"));

    let wide = GlobalPlotSettings::builder().figure_width(5000.0).build().unwrap();
    let s = SeriesStyle::builder([1.0, 2.0]).build().unwrap();
    let (fig, _) = line_plot(s, &wide, &LineLayout::default()).unwrap();
    assert!(matches!(
        encode_svg(&fig, &SaveOptions::default()).unwrap_err(),
        PlotError::InvalidSetting { .. }
    ));
    assert!(render_svg_string(&fig, 300).is_err());
}
